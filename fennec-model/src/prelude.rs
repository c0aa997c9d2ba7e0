//! Frequently used model types.

pub use crate::events::LibraryNotification;
pub use crate::filters::{ItemFilterCollection, ItemSortBy, ItemTrait, SortOrder};
pub use crate::ids::{ElementId, ElementKey};
pub use crate::item::{BaseItem, ChapterInfo, ItemKind, NamedItem, Person};
pub use crate::select::SelectTarget;
pub use crate::ticks::Ticks;
pub use crate::user_data::UserItemData;
