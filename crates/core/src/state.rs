use crate::band::Band;
use serde::{Deserialize, Serialize};

/// What the engine produced for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    /// Utilisation computed from this tick's counter deltas alone (0.0 – 100.0).
    pub instant: f64,
    /// Three-sample moving average, rounded to one decimal.
    pub smoothed: f64,
    /// Band confirmed by the classifier after this tick.
    pub band: Band,
    /// `true` when this tick moved the classifier to a new band.
    pub changed: bool,
}

/// A published, point-in-time reading.
///
/// Field names match the JSON objects streamed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Reading {
    /// Smoothed total CPU usage (0.0 – 100.0, one decimal).
    pub cpu: f64,
    /// Current note band.
    pub note: Band,
    /// Per-core CPU usage, omitted when disabled in the config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_cpu: Option<Vec<f64>>,
    /// Used RAM as a percentage of total, omitted when disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f64>,
    /// Seconds since the Unix epoch when the reading was taken.
    pub timestamp: f64,
}

/// Round to one decimal place (half away from zero).
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
