//! Anomaly detection for heart rate series.
//!
//! A series of readings is split into two groups with two-cluster k-means.
//! The group with the lower center is labelled "normal" and the group with
//! the higher center "abnormal". Labelling happens after clustering, so the
//! domain policy of what counts as normal stays independent of the
//! clustering routine itself.
//!
//! # Structures
//! - `Reading`: One heart rate observation.
//! - `AnalysisResult`: Both cluster centers plus an advisory message.
//! - `HeartRateAnalyzer`: Configurable entry point for `analyze` and `classify`.
//!
//! # Example
//! ```rust
//! use hr_insights::analysis::anomaly::{analyze_heart_rate, Reading};
//!
//! let readings: Vec<Reading> = [60.0, 62.0, 58.0, 150.0, 155.0, 148.0]
//!     .iter()
//!     .map(|&bpm| Reading::new(bpm))
//!     .collect();
//! let result = analyze_heart_rate(&readings).unwrap();
//! assert!(result.normal_rate <= result.abnormal_rate);
//! println!("normal: {}, abnormal: {}", result.normal_rate, result.abnormal_rate);
//! ```

use log::warn;

use crate::clustering::kmeans::{ClusterAlgorithm, ClusterStrategy, TwoClusterFit};
use crate::error::{AnalysisError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Advisory message attached to every analysis result.
pub const INSIGHTS: &str =
    "Anomaly detection completed. Consult a doctor if abnormal rates are frequent.";

/// One heart rate observation in beats per minute.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    #[cfg_attr(feature = "serde", serde(rename = "heartRate"))]
    pub heart_rate: f64,
}

impl Reading {
    pub fn new(heart_rate: f64) -> Self {
        Self { heart_rate }
    }
}

impl From<f64> for Reading {
    fn from(heart_rate: f64) -> Self {
        Self::new(heart_rate)
    }
}

/// Result of a heart rate anomaly analysis.
///
/// `normal_rate <= abnormal_rate` holds by construction, the lower of the
/// two computed centers is always labelled normal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Center of the cluster labelled normal.
    pub normal_rate: f64,
    /// Center of the cluster labelled abnormal.
    pub abnormal_rate: f64,
    /// Fixed advisory message, see [`INSIGHTS`].
    pub insights: String,
}

/// Classification of a single reading relative to the fitted clusters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RateClass {
    /// The reading belongs to the cluster with the lower center.
    Normal,
    /// The reading belongs to the cluster with the higher center.
    Abnormal,
}

impl RateClass {
    pub fn is_abnormal(&self) -> bool {
        matches!(self, RateClass::Abnormal)
    }
}

/// Policy for input whose readings all share one value, where no two-way
/// split exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Report both centers as the shared value and classify every reading
    /// as normal. This is the default.
    CollapseCenters,
    /// Fail with [`AnalysisError::DegenerateInput`].
    Reject,
}

/// Splits heart rate readings into a normal and an abnormal group.
pub struct HeartRateAnalyzer {
    strategy: ClusterStrategy,
    policy: DegeneratePolicy,
}

impl Default for HeartRateAnalyzer {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl HeartRateAnalyzer {
    /// Creates a new `HeartRateAnalyzer` instance.
    ///
    /// # Arguments
    ///
    /// * `strategy` - The clustering routine to use. Default is the seeded
    ///                built-in k-means.
    /// * `policy` - Handling of single-valued input. Default is
    ///              [`DegeneratePolicy::CollapseCenters`].
    pub fn new(strategy: Option<ClusterStrategy>, policy: Option<DegeneratePolicy>) -> Self {
        Self {
            strategy: strategy.unwrap_or(ClusterStrategy::KMeans),
            policy: policy.unwrap_or(DegeneratePolicy::CollapseCenters),
        }
    }

    /// Splits the readings into two clusters and reports both centers.
    ///
    /// The lower center is reported as `normal_rate`, the higher as
    /// `abnormal_rate`, and the fixed advisory message is attached.
    ///
    /// # Arguments
    ///
    /// * `readings` - The heart rate observations to analyze. Order is
    ///                irrelevant to the computation.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] if fewer than two readings
    /// are given or a reading has a non-finite heart rate, and
    /// [`AnalysisError::DegenerateInput`] for single-valued input under the
    /// [`DegeneratePolicy::Reject`] policy.
    pub fn analyze(&self, readings: &[Reading]) -> Result<AnalysisResult> {
        let fit = self.fit(readings)?;
        Ok(AnalysisResult {
            normal_rate: fit.centers[0].min(fit.centers[1]),
            abnormal_rate: fit.centers[0].max(fit.centers[1]),
            insights: INSIGHTS.to_string(),
        })
    }

    /// Classifies every reading as normal or abnormal, in input order.
    ///
    /// A reading is abnormal when it was assigned to the cluster with the
    /// higher center. Accepts the same inputs and fails for the same reasons
    /// as [`HeartRateAnalyzer::analyze`].
    pub fn classify(&self, readings: &[Reading]) -> Result<Vec<RateClass>> {
        let fit = self.fit(readings)?;
        let normal_label = if fit.centers[0] <= fit.centers[1] { 0 } else { 1 };
        Ok(fit
            .labels
            .iter()
            .map(|&label| {
                if label == normal_label {
                    RateClass::Normal
                } else {
                    RateClass::Abnormal
                }
            })
            .collect())
    }

    fn fit(&self, readings: &[Reading]) -> Result<TwoClusterFit> {
        let rates = extract_rates(readings)?;
        let fit = self.strategy.cluster(&rates)?;
        if fit.centers[0] == fit.centers[1] {
            warn!(
                "readings collapse to the single value {}, no two-way split exists",
                fit.centers[0]
            );
            if self.policy == DegeneratePolicy::Reject {
                return Err(AnalysisError::DegenerateInput(format!(
                    "all {} readings share the value {}",
                    readings.len(),
                    fit.centers[0]
                )));
            }
        }
        Ok(fit)
    }
}

/// Analyzes readings with the default settings, see [`HeartRateAnalyzer`].
pub fn analyze_heart_rate(readings: &[Reading]) -> Result<AnalysisResult> {
    HeartRateAnalyzer::default().analyze(readings)
}

fn extract_rates(readings: &[Reading]) -> Result<Vec<f64>> {
    if readings.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "readings must not be empty".into(),
        ));
    }
    if readings.len() < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "at least two readings are required for a two-way split, got {}",
            readings.len()
        )));
    }
    if let Some(idx) = readings
        .iter()
        .position(|reading| !reading.heart_rate.is_finite())
    {
        return Err(AnalysisError::InvalidInput(format!(
            "reading at index {} has no finite heart rate",
            idx
        )));
    }
    Ok(readings.iter().map(|reading| reading.heart_rate).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::kmeans::MockClusterAlgorithm;

    fn readings(rates: &[f64]) -> Vec<Reading> {
        rates.iter().map(|&bpm| Reading::new(bpm)).collect()
    }

    #[test]
    fn test_analyze_bimodal_series() {
        let input = readings(&[60.0, 62.0, 58.0, 150.0, 155.0, 148.0]);
        let result = analyze_heart_rate(&input).unwrap();
        assert!((result.normal_rate - 60.0).abs() < 1e-9);
        assert!((result.abnormal_rate - 151.0).abs() < 1e-9);
        assert_eq!(result.insights, INSIGHTS);
    }

    #[test]
    fn test_analyze_orders_centers() {
        let input = readings(&[88.0, 64.0, 155.0, 70.0, 162.0, 93.0, 147.0]);
        let result = analyze_heart_rate(&input).unwrap();
        assert!(result.normal_rate <= result.abnormal_rate);
    }

    #[test]
    fn test_analyze_empty_input() {
        let result = analyze_heart_rate(&[]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_analyze_single_reading() {
        let result = analyze_heart_rate(&readings(&[75.0]));
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_analyze_non_finite_reading() {
        let result = analyze_heart_rate(&readings(&[60.0, f64::NAN, 150.0]));
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_analyze_constant_input_collapses() {
        let input = readings(&[70.0; 10]);
        let result = analyze_heart_rate(&input).unwrap();
        assert_eq!(result.normal_rate, 70.0);
        assert_eq!(result.abnormal_rate, 70.0);
    }

    #[test]
    fn test_analyze_constant_input_rejected() {
        let analyzer = HeartRateAnalyzer::new(None, Some(DegeneratePolicy::Reject));
        let result = analyzer.analyze(&readings(&[70.0; 10]));
        assert!(matches!(result, Err(AnalysisError::DegenerateInput(_))));
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let input = readings(&[66.0, 71.0, 69.0, 158.0, 142.0, 150.0, 75.0, 80.0]);
        let first = analyze_heart_rate(&input).unwrap();
        let second = analyze_heart_rate(&input).unwrap();
        assert_eq!(first.normal_rate, second.normal_rate);
        assert_eq!(first.abnormal_rate, second.abnormal_rate);
    }

    #[test]
    fn test_classify_bimodal_series() {
        let input = readings(&[60.0, 150.0, 62.0, 155.0, 58.0, 148.0]);
        let classes = HeartRateAnalyzer::default().classify(&input).unwrap();
        assert_eq!(
            classes,
            vec![
                RateClass::Normal,
                RateClass::Abnormal,
                RateClass::Normal,
                RateClass::Abnormal,
                RateClass::Normal,
                RateClass::Abnormal,
            ]
        );
    }

    #[test]
    fn test_classify_constant_input_is_normal() {
        let input = readings(&[70.0; 5]);
        let classes = HeartRateAnalyzer::default().classify(&input).unwrap();
        assert!(classes.iter().all(|class| !class.is_abnormal()));
    }

    #[test]
    fn test_labelling_with_descending_centers() {
        // The built-in k-means reports ascending centers, a custom routine
        // need not. The min/max labelling step has to hold regardless.
        let mut algorithm = MockClusterAlgorithm::new();
        algorithm.expect_cluster().returning(|_| {
            Ok(crate::clustering::kmeans::TwoClusterFit {
                centers: [151.0, 60.0],
                labels: vec![1, 1, 1, 0, 0, 0],
                iterations: 1,
            })
        });
        let analyzer = HeartRateAnalyzer::new(
            Some(ClusterStrategy::Custom(Box::new(algorithm))),
            None,
        );

        let input = readings(&[60.0, 62.0, 58.0, 150.0, 155.0, 148.0]);
        let result = analyzer.analyze(&input).unwrap();
        assert_eq!(result.normal_rate, 60.0);
        assert_eq!(result.abnormal_rate, 151.0);

        let classes = analyzer.classify(&input).unwrap();
        assert_eq!(classes[0], RateClass::Normal);
        assert_eq!(classes[3], RateClass::Abnormal);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_reading_wire_shape() {
        let input: Vec<Reading> = serde_json::from_str(
            r#"[{"heartRate":60},{"heartRate":62},{"heartRate":58},
                {"heartRate":150},{"heartRate":155},{"heartRate":148}]"#,
        )
        .unwrap();
        let result = analyze_heart_rate(&input).unwrap();
        assert!((result.normal_rate - 60.0).abs() < 1e-9);
        assert!((result.abnormal_rate - 151.0).abs() < 1e-9);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_result_wire_shape() {
        let input: Vec<Reading> = vec![60.0.into(), 62.0.into(), 150.0.into(), 155.0.into()];
        let result = analyze_heart_rate(&input).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("normal_rate").is_some());
        assert!(value.get("abnormal_rate").is_some());
        assert_eq!(value["insights"], INSIGHTS);
    }
}
