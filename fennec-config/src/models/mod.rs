pub mod duration;
pub mod paging;
pub mod player;
pub mod server;

pub use paging::PagingConfig;
pub use player::PlayerConfig;
pub use server::ServerConfig;

use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    /// `$FENNEC_CONFIG_PATH` or an explicit path.
    EnvPath(PathBuf),
    /// `$FENNEC_CONFIG_JSON`.
    EnvInline,
    File(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub paging: PagingConfig,
    pub player: PlayerConfig,
}

impl ClientConfig {
    /// Reject values the paging and playback layers cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.paging.page_size > 0, "paging.page_size must be at least 1");
        ensure!(self.paging.event_capacity > 0, "paging.event_capacity must be at least 1");

        let ladder = &self.player.speed_ladder;
        ensure!(!ladder.is_empty(), "player.speed_ladder must not be empty");
        ensure!(
            ladder.iter().all(|speed| speed.is_finite() && *speed > 0.0),
            "player.speed_ladder entries must be positive"
        );
        ensure!(
            ladder.windows(2).all(|pair| pair[0] < pair[1]),
            "player.speed_ladder must be strictly increasing"
        );
        ensure!(
            self.player.slow_scrub_damping > 0.0 && self.player.slow_scrub_damping <= 1.0,
            "player.slow_scrub_damping must be in (0, 1]"
        );
        ensure!(!self.player.scrub_tick.is_zero(), "player.scrub_tick must be non-zero");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.paging.page_size, 50);
        assert_eq!(config.paging.filter_debounce, Duration::from_millis(500));
        assert_eq!(config.player.jump_forward, Duration::from_secs(30));
        assert_eq!(config.player.speed_ladder, vec![2.0, 4.0, 8.0, 16.0, 32.0]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [paging]
            page_size = 20

            [player]
            jump_backward = "10s"
            "#,
        )
        .unwrap();

        assert_eq!(config.paging.page_size, 20);
        assert_eq!(config.paging.filter_debounce, Duration::from_millis(500));
        assert_eq!(config.player.jump_backward, Duration::from_secs(10));
        assert_eq!(config.player.jump_forward, Duration::from_secs(30));
        assert_eq!(config.server.client_name, "Fennec");
    }

    #[test]
    fn rejects_unusable_ladders() {
        let mut config = ClientConfig::default();
        config.player.speed_ladder = vec![4.0, 2.0];
        assert!(config.validate().is_err());

        config.player.speed_ladder.clear();
        assert!(config.validate().is_err());

        config.player.speed_ladder = vec![1.0, 3.0];
        config.paging.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let mut config = ClientConfig::default();
        config.server.access_token = Some("secret-token".into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
