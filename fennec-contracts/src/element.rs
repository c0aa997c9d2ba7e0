//! What a paged list can hold.

use fennec_model::{
    BaseItem, ElementId, ItemKind, NamedItem, Person, SelectTarget, UserItemData,
};
use std::fmt::Debug;

/// A listable unit with a stable identity.
pub trait Element: Clone + Debug + Send + Sync + 'static {
    /// Server identity, if the element has one.
    fn element_id(&self) -> Option<&ElementId>;

    fn display_title(&self) -> &str;

    fn select_target(&self) -> SelectTarget;

    /// Per-user state the server attached to this element.
    fn user_data(&self) -> Option<&UserItemData> {
        None
    }

    /// Merge fresh user data into the element. Returns `true` when the
    /// element changed.
    fn apply_user_data(&mut self, _data: &UserItemData) -> bool {
        false
    }
}

impl Element for BaseItem {
    fn element_id(&self) -> Option<&ElementId> {
        self.id.as_ref()
    }

    fn display_title(&self) -> &str {
        BaseItem::display_title(self)
    }

    fn select_target(&self) -> SelectTarget {
        let Some(id) = self.id.clone() else {
            return SelectTarget::None;
        };
        let kind = self.kind();
        match kind {
            ItemKind::TvChannel => SelectTarget::Play { id },
            ItemKind::Person => SelectTarget::Person { id },
            ItemKind::Genre | ItemKind::Studio => SelectTarget::Filtered { id },
            kind if kind.is_container() => SelectTarget::Library { id, kind },
            ItemKind::Unknown => SelectTarget::None,
            kind => SelectTarget::Item { id, kind },
        }
    }

    fn user_data(&self) -> Option<&UserItemData> {
        self.user_data.as_ref()
    }

    fn apply_user_data(&mut self, data: &UserItemData) -> bool {
        if self.user_data.as_ref() == Some(data) {
            return false;
        }
        self.user_data = Some(data.clone());
        true
    }
}

impl Element for Person {
    fn element_id(&self) -> Option<&ElementId> {
        self.id.as_ref()
    }

    fn display_title(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn select_target(&self) -> SelectTarget {
        match &self.id {
            Some(id) => SelectTarget::Person { id: id.clone() },
            None => SelectTarget::None,
        }
    }
}

impl Element for NamedItem {
    fn element_id(&self) -> Option<&ElementId> {
        self.id.as_ref()
    }

    fn display_title(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn select_target(&self) -> SelectTarget {
        match &self.id {
            Some(id) => SelectTarget::Filtered { id: id.clone() },
            None => SelectTarget::None,
        }
    }
}
