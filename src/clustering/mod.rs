//! This module contains the clustering primitives used for anomaly detection.
//!
//! The `kmeans` submodule provides a deterministic two-cluster k-means over
//! one-dimensional data together with the strategy seam used by the analysis
//! layer.
pub mod kmeans;
