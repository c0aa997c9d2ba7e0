//! Paged library loading for the Fennec media client.
//!
//! The centrepiece is [`paging::PagingSession`]: one actor per on-screen list
//! that owns an identity keyed collection, drives a [`PageFetcher`] one page at
//! a time and publishes snapshots for the UI to render.
//!
//! [`PageFetcher`]: fennec_contracts::fetcher::PageFetcher
#![allow(missing_docs)]

pub mod api;
pub mod collection;
pub mod debounce;
pub mod error;
pub mod fetchers;
pub mod notifications;
pub mod paging;
pub mod random;

pub use collection::IdentifiedArray;
pub use error::{CoreError, LibraryError, Result};
pub use notifications::NotificationCenter;
pub use paging::{
    BackgroundState, LibraryEvent, LibraryState, PagingHandle, PagingIntent, PagingOptions,
    PagingSession, PagingSnapshot,
};
