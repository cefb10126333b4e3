/// This module contains submodules for heart rate anomaly analysis.
///
/// The available submodules are:
///
/// - `anomaly`: Splits heart rate readings into normal and abnormal groups.
/// - `alerts`: Decision helpers for resting-band checks and alert recommendations.
pub mod alerts;
pub mod anomaly;
