//! Deterministic two-cluster k-means over one-dimensional data.
//!
//! The module includes:
//!
//! - `ClusterAlgorithm` trait: Defines the interface for two-way clustering routines.
//! - `ClusterStrategy` enum: Selects the built-in k-means or a custom algorithm.
//! - `TwoMeans` struct: Lloyd's algorithm specialized to k=2 over scalar values.
//! - `TwoClusterFit` struct: The fitted centers, per-value labels, and iteration count.
//!
//! # Example
//!
//! ```rust
//! use hr_insights::clustering::kmeans::{ClusterAlgorithm, TwoMeans};
//!
//! let data = [60.0, 62.0, 58.0, 150.0, 155.0, 148.0];
//! let fit = TwoMeans::new(None, None).cluster(&data).unwrap();
//! assert_eq!(fit.centers, [60.0, 151.0]);
//! ```

use log::debug;
use nalgebra::DVectorView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::{AnalysisError, Result};

/// A trait representing a two-way clustering routine for scalar data.
///
/// Implementors partition the given values into two groups and report the
/// group centers along with a per-value group label.
#[cfg_attr(test, mockall::automock)]
pub trait ClusterAlgorithm {
    /// Partitions `data` into two clusters.
    ///
    /// # Arguments
    ///
    /// * `data` - A slice of f64 values to partition.
    ///
    /// # Returns
    ///
    /// A `Result` containing a [`TwoClusterFit`] on success, or an error on
    /// failure.
    fn cluster(&self, data: &[f64]) -> Result<TwoClusterFit>;
}

/// Available clustering strategies for anomaly detection.
/// User provided algorithms can be passed via the `Custom` variant.
pub enum ClusterStrategy {
    /// Seeded two-cluster k-means with default parameters.
    KMeans,
    /// A custom clustering routine implementing the `ClusterAlgorithm` trait.
    /// The algorithm is wrapped in a `Box` to allow for dynamic dispatch and
    /// must also implement `Sync` and `Send` to ensure thread safety.
    Custom(Box<dyn ClusterAlgorithm + Sync + Send>),
}

impl ClusterAlgorithm for ClusterStrategy {
    fn cluster(&self, data: &[f64]) -> Result<TwoClusterFit> {
        match self {
            ClusterStrategy::KMeans => TwoMeans::new(None, None).cluster(data),
            ClusterStrategy::Custom(algorithm) => algorithm.cluster(data),
        }
    }
}

/// Result of a two-way clustering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoClusterFit {
    /// Cluster centers in ascending order for the built-in k-means.
    pub centers: [f64; 2],
    /// Index into `centers` for every input value, in input order.
    pub labels: Vec<usize>,
    /// Number of assignment passes until the labels stabilized. Zero when
    /// the input collapsed to a single distinct value.
    pub iterations: usize,
}

impl TwoClusterFit {
    /// Assigns each value to the nearer of the two fitted centers.
    ///
    /// Ties are resolved towards the first center.
    pub fn predict(&self, values: &[f64]) -> Vec<usize> {
        nearest_center(values, self.centers[0], self.centers[1])
    }
}

/// Lloyd's k-means specialized to two clusters over one-dimensional data.
///
/// Centroid initialization draws two distinct values from the sorted set of
/// distinct inputs with a seeded RNG, so the fit is reproducible for a given
/// seed and independent of the input order.
pub struct TwoMeans {
    seed: u64,
    max_iter: usize,
}

impl TwoMeans {
    /// Creates a new `TwoMeans` instance.
    ///
    /// # Arguments
    ///
    /// * `seed` - RNG seed for centroid initialization. Default is 0.
    /// * `max_iter` - Cap on assignment passes before the fit is abandoned.
    ///                Default is 300.
    pub fn new(seed: Option<u64>, max_iter: Option<usize>) -> Self {
        Self {
            seed: seed.unwrap_or(0),
            max_iter: max_iter.unwrap_or(300).max(1),
        }
    }

    /// Picks two distinct initial centers from the sorted distinct values.
    fn initial_centers(&self, distinct: &[f64]) -> (f64, f64) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let first = rng.gen_range(0..distinct.len());
        let mut second = rng.gen_range(0..distinct.len());
        while second == first {
            second = rng.gen_range(0..distinct.len());
        }
        (distinct[first.min(second)], distinct[first.max(second)])
    }
}

impl ClusterAlgorithm for TwoMeans {
    fn cluster(&self, data: &[f64]) -> Result<TwoClusterFit> {
        validate(data)?;

        let mut distinct = data.to_vec();
        // partial_cmp cannot fail, validate rejected non-finite values
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap());
        distinct.dedup();
        if distinct.len() == 1 {
            debug!(
                "all {} values equal {}, collapsing to equal centers",
                data.len(),
                distinct[0]
            );
            return Ok(TwoClusterFit {
                centers: [distinct[0]; 2],
                labels: vec![0; data.len()],
                iterations: 0,
            });
        }

        let (mut lower, mut upper) = self.initial_centers(&distinct);
        let mut labels = nearest_center(data, lower, upper);
        for iteration in 1..=self.max_iter {
            lower = group_mean(data, &labels, 0)?;
            upper = group_mean(data, &labels, 1)?;
            let next = nearest_center(data, lower, upper);
            if next == labels {
                debug!("two-means stabilized after {} iterations", iteration);
                return Ok(TwoClusterFit {
                    centers: [lower, upper],
                    labels,
                    iterations: iteration,
                });
            }
            labels = next;
        }
        Err(AnalysisError::Computation(format!(
            "two-means did not stabilize within {} iterations",
            self.max_iter
        )))
    }
}

fn validate(data: &[f64]) -> Result<()> {
    if data.len() < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "a two-way split needs at least two values, got {}",
            data.len()
        )));
    }
    if let Some(idx) = data.iter().position(|value| !value.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "value at index {} is not a finite number",
            idx
        )));
    }
    Ok(())
}

/// Labels every value with the index of the nearer center, ties towards the
/// lower center.
fn nearest_center(data: &[f64], lower: f64, upper: f64) -> Vec<usize> {
    data.par_iter()
        .map(|&value| {
            if (value - lower).abs() <= (value - upper).abs() {
                0
            } else {
                1
            }
        })
        .collect()
}

fn group_mean(data: &[f64], labels: &[usize], group: usize) -> Result<f64> {
    let members: Vec<f64> = data
        .iter()
        .zip(labels)
        .filter_map(|(&value, &label)| if label == group { Some(value) } else { None })
        .collect();
    if members.is_empty() {
        return Err(AnalysisError::Computation(format!(
            "cluster {} lost all of its members",
            group
        )));
    }
    Ok(DVectorView::from(members.as_slice()).mean())
}
