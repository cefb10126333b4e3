//! Decision helpers for heart rate alerts.
//!
//! The sensor firmware treats 60 to 100 bpm as the resting band, and the
//! surrounding system warns the user when abnormal rates are frequent. This
//! module provides the pure decision logic for both: which readings fall
//! outside the resting band, and whether an abnormal share is high enough to
//! recommend an alert. Delivering the alert is out of scope.

use crate::analysis::anomaly::{RateClass, Reading};

/// Default share of abnormal readings above which an alert is recommended.
pub const DEFAULT_ALERT_SHARE: f64 = 0.25;

/// Inclusive resting heart rate band in beats per minute.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for RateBand {
    /// The firmware's resting band of 60 to 100 bpm.
    fn default() -> Self {
        Self {
            lower: 60.0,
            upper: 100.0,
        }
    }
}

impl RateBand {
    pub fn contains(&self, rate: f64) -> bool {
        rate >= self.lower && rate <= self.upper
    }

    /// Returns the indices of all readings outside the band, in input order.
    pub fn out_of_band(&self, readings: &[Reading]) -> Vec<usize> {
        readings
            .iter()
            .enumerate()
            .filter_map(|(idx, reading)| {
                if self.contains(reading.heart_rate) {
                    None
                } else {
                    Some(idx)
                }
            })
            .collect()
    }
}

/// Fraction of readings classified as abnormal, 0.0 for an empty slice.
pub fn abnormal_share(classes: &[RateClass]) -> f64 {
    if classes.is_empty() {
        return 0.0;
    }
    let abnormal = classes.iter().filter(|class| class.is_abnormal()).count();
    abnormal as f64 / classes.len() as f64
}

/// Decides whether abnormal rates are frequent enough to warrant an alert.
///
/// # Arguments
///
/// * `classes` - Per-reading classification from the analyzer.
/// * `min_share` - Share of abnormal readings at which the alert fires.
///                 Default is [`DEFAULT_ALERT_SHARE`].
pub fn alert_recommended(classes: &[RateClass], min_share: Option<f64>) -> bool {
    abnormal_share(classes) >= min_share.unwrap_or(DEFAULT_ALERT_SHARE)
}
