//! HTTP access to a Jellyfin-compatible server.

mod client;

pub use client::{ClientIdentity, UserSession};
