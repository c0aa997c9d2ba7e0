//! Core data model definitions shared across Fennec crates.
#![allow(missing_docs)]

pub mod error;
pub mod events;
pub mod filters;
pub mod ids;
pub mod item;
pub mod prelude;
pub mod select;
pub mod ticks;
pub mod user_data;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use events::LibraryNotification;
pub use filters::{ItemFilterCollection, ItemSortBy, ItemTrait, SortOrder};
pub use ids::{ElementId, ElementKey};
pub use item::{BaseItem, ChapterInfo, CollectionType, ItemKind, NamedItem, Person};
pub use select::SelectTarget;
pub use ticks::Ticks;
pub use user_data::UserItemData;
