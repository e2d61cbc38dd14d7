use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest tick the sampler accepts; anything faster is mostly noise.
pub const MIN_INTERVAL_MS: u64 = 10;

/// Root configuration structure parsed from `cpunote.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NoteConfig {
    /// Tick cadence.
    pub sampler: SamplerConfig,
    /// What goes into each published reading.
    pub output: OutputConfig,
}

/// Sampling cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Milliseconds between ticks.
    pub interval_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { interval_ms: 150 }
    }
}

impl SamplerConfig {
    /// Tick interval, never shorter than [`MIN_INTERVAL_MS`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }
}

/// Optional fields of a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Include per-core usage.
    pub per_cpu: bool,
    /// Include memory usage.
    pub memory: bool,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            per_cpu: true,
            memory:  true,
            pretty:  false,
        }
    }
}
