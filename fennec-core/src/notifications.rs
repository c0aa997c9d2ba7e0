//! In-process fan out of server side library changes.

use fennec_model::{ElementId, LibraryNotification, UserItemData};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Cheap to clone; every clone publishes into the same channel and shares
/// the same user data cache.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    sender: broadcast::Sender<LibraryNotification>,
    user_data: Arc<Mutex<HashMap<ElementId, UserItemData>>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            user_data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LibraryNotification> {
        self.sender.subscribe()
    }

    pub fn publish(&self, notification: LibraryNotification) {
        // No subscribers is not an error.
        let _ = self.sender.send(notification);
    }

    pub fn item_deleted(&self, id: ElementId) {
        self.publish(LibraryNotification::ItemDeleted(id));
    }

    pub fn user_data_changed(&self, data: UserItemData) {
        if let Some(id) = &data.item_id {
            self.user_data.lock().insert(id.clone(), data.clone());
        }
        self.publish(LibraryNotification::UserDataChanged(data));
    }

    /// Record user data seen in a fetched page and broadcast it if it
    /// differs from what was last seen for the same item.
    ///
    /// The first sighting of an item is only cached. Returns whether a
    /// notification went out.
    pub fn share_user_data(&self, data: UserItemData) -> bool {
        let Some(id) = data.item_id.clone() else {
            return false;
        };
        let previous = self.user_data.lock().insert(id, data.clone());
        match previous {
            Some(previous) if previous != data => {
                trace!(item = ?data.item_id, "user data changed since last seen");
                self.publish(LibraryNotification::UserDataChanged(data));
                true
            }
            _ => false,
        }
    }

    pub fn cached_user_data(&self, id: &ElementId) -> Option<UserItemData> {
        self.user_data.lock().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(id: &str, played: bool) -> UserItemData {
        UserItemData {
            item_id: Some(ElementId::new(id).unwrap()),
            played,
            ..UserItemData::default()
        }
    }

    #[test]
    fn only_changed_user_data_is_rebroadcast() {
        let center = NotificationCenter::default();
        let mut receiver = center.subscribe();

        assert!(!center.share_user_data(data("a", false)));
        assert!(!center.share_user_data(data("a", false)));
        assert!(receiver.try_recv().is_err());

        assert!(center.share_user_data(data("a", true)));
        assert_eq!(
            receiver.try_recv().unwrap(),
            LibraryNotification::UserDataChanged(data("a", true))
        );
        assert!(!center.share_user_data(UserItemData::default()));
    }

    #[test]
    fn published_changes_update_the_cache() {
        let center = NotificationCenter::default();
        let clone = center.clone();
        center.user_data_changed(data("a", true));
        assert_eq!(clone.cached_user_data(&ElementId::new("a").unwrap()), Some(data("a", true)));
        assert!(!clone.share_user_data(data("a", true)));
    }
}
