//! Trait surfaces that describe interactions with Fennec data models.

pub mod element;
pub mod error;
pub mod fetcher;
pub mod player;
pub mod session;

/// Frequently used trait combinators for paging and playback crates.
pub mod prelude {
    pub use super::element::Element;
    pub use super::error::{FetchError, ProxyError};
    pub use super::fetcher::{PageFetcher, PageRequestContext};
    pub use super::player::PlayerProxy;
    pub use super::session::{ApiRequest, ApiResponse, AuthenticatedSession, Method};
}
