//! Server time values.
//!
//! Jellyfin reports positions and runtimes in 100ns ticks.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TICKS_PER_SECOND: i64 = 10_000_000;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ticks(pub i64);

impl Ticks {
    pub fn from_duration(duration: Duration) -> Self {
        let ticks = duration.as_nanos() / 100;
        Ticks(i64::try_from(ticks).unwrap_or(i64::MAX))
    }

    /// Negative tick counts clamp to zero.
    pub fn to_duration(self) -> Duration {
        let ticks = self.0.max(0) as u64;
        Duration::from_nanos(ticks.saturating_mul(100))
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }
}

impl From<Duration> for Ticks {
    fn from(duration: Duration) -> Self {
        Ticks::from_duration(duration)
    }
}
