use fennec_player::CoordinatorOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seek and scrub tuning for the playback coordinator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    #[serde(with = "super::duration")]
    pub jump_forward: Duration,
    #[serde(with = "super::duration")]
    pub jump_backward: Duration,
    /// How long a directional press must be held before it turns into
    /// scrubbing instead of a jump.
    #[serde(with = "super::duration")]
    pub long_press_threshold: Duration,
    /// Scrub multipliers, slowest first.
    pub speed_ladder: Vec<f64>,
    #[serde(with = "super::duration")]
    pub scrub_tick: Duration,
    #[serde(with = "super::duration")]
    pub command_timeout: Duration,
    pub slow_scrub_damping: f64,
    #[serde(with = "super::duration")]
    pub progress_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        CoordinatorOptions::default().into()
    }
}

impl From<CoordinatorOptions> for PlayerConfig {
    fn from(options: CoordinatorOptions) -> Self {
        Self {
            jump_forward: options.jump_forward,
            jump_backward: options.jump_backward,
            long_press_threshold: options.long_press_threshold,
            speed_ladder: options.speed_ladder,
            scrub_tick: options.scrub_tick,
            command_timeout: options.command_timeout,
            slow_scrub_damping: options.slow_scrub_damping,
            progress_interval: options.progress_interval,
        }
    }
}

impl From<PlayerConfig> for CoordinatorOptions {
    fn from(config: PlayerConfig) -> Self {
        CoordinatorOptions {
            jump_forward: config.jump_forward,
            jump_backward: config.jump_backward,
            long_press_threshold: config.long_press_threshold,
            speed_ladder: config.speed_ladder,
            scrub_tick: config.scrub_tick,
            command_timeout: config.command_timeout,
            slow_scrub_damping: config.slow_scrub_damping,
            progress_interval: config.progress_interval,
        }
    }
}
