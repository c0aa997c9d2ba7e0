use crate::ids::ElementId;
use crate::user_data::UserItemData;

/// Notifications broadcast to every live paging session.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryNotification {
    ItemDeleted(ElementId),
    UserDataChanged(UserItemData),
}
