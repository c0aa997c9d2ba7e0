use crate::error::ProxyError;
use std::time::Duration;

/// Opaque handle to the playback backend.
///
/// The coordinator only issues commands through this surface; transport
/// status and position reports flow back through the coordinator's own
/// callbacks.
pub trait PlayerProxy: Send + Sync {
    fn play(&self) -> Result<(), ProxyError>;

    fn pause(&self) -> Result<(), ProxyError>;

    fn seek(&self, to: Duration) -> Result<(), ProxyError>;

    fn set_rate(&self, rate: f32) -> Result<(), ProxyError>;

    fn set_audio_track(&self, index: i32) -> Result<(), ProxyError>;

    /// `None` disables subtitles.
    fn set_subtitle_track(&self, index: Option<i32>) -> Result<(), ProxyError>;
}
