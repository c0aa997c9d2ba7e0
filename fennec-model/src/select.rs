use crate::ids::ElementId;
use crate::item::ItemKind;

/// Where selecting an element in a list should lead.
///
/// Each element type declares its own target so list surfaces never need
/// to inspect concrete element types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    /// Open the detail page of an item.
    Item { id: ElementId, kind: ItemKind },
    /// Browse the contents of a container (folder, box set, user view).
    Library { id: ElementId, kind: ItemKind },
    /// Start playback directly.
    Play { id: ElementId },
    /// Items credited to a person.
    Person { id: ElementId },
    /// Items tagged with a genre, studio or tag.
    Filtered { id: ElementId },
    /// Element cannot be navigated to.
    None,
}
