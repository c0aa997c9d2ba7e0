//! Configuration for Fennec clients.
//!
//! A [`ClientConfig`] is assembled by [`ConfigLoader`] from a config file
//! (TOML or JSON), inline JSON, a `.env` file and `FENNEC_*` environment
//! overrides. The paging and player sections convert straight into
//! [`fennec_core::PagingOptions`] and [`fennec_player::CoordinatorOptions`].
#![allow(missing_docs)]

pub mod loader;
pub mod logging;
pub mod models;
pub mod provider;

pub use loader::{ConfigLoad, ConfigLoader};
pub use models::{ClientConfig, ConfigSource, PagingConfig, PlayerConfig, ServerConfig};
pub use provider::{ConfigProvider, StaticConfigProvider};
