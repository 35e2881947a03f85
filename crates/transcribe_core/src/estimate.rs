use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const BYTES_PER_MEGABYTE: u64 = 1_048_576;

/// Rate used to turn an input size into a simulated processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorSettings {
    pub seconds_per_megabyte: u64,
    /// Lower bound applied after rounding; keeps empty inputs from finishing in zero seconds.
    pub minimum_seconds: u64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            seconds_per_megabyte: 5,
            minimum_seconds: 1,
        }
    }
}

impl EstimatorSettings {
    /// `ceil(size_bytes / MiB * rate)`, clamped to `minimum_seconds`.
    pub fn estimate_seconds(&self, size_bytes: u64) -> u64 {
        let scaled = u128::from(size_bytes) * u128::from(self.seconds_per_megabyte);
        let divisor = u128::from(BYTES_PER_MEGABYTE);
        let rounded_up = scaled.div_ceil(divisor);
        let seconds = u64::try_from(rounded_up).unwrap_or(u64::MAX);
        seconds.max(self.minimum_seconds)
    }

    pub fn estimate_duration(&self, size_bytes: u64) -> Duration {
        Duration::from_secs(self.estimate_seconds(size_bytes))
    }
}

/// Estimate with the default rate of 5 seconds per megabyte.
pub fn estimate_seconds(size_bytes: u64) -> u64 {
    EstimatorSettings::default().estimate_seconds(size_bytes)
}

pub fn estimate_duration(size_bytes: u64) -> Duration {
    EstimatorSettings::default().estimate_duration(size_bytes)
}
