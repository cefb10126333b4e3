//! Heart Rate Anomaly Detection
//!
//! This crate partitions a series of heart rate readings into a "normal" and
//! an "abnormal" group using deterministic two-cluster k-means and reports
//! both cluster centers together with an advisory message.

pub mod analysis;
pub mod clustering;
pub mod error;
