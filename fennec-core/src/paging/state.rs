use crate::error::LibraryError;
use fennec_model::{ElementId, ItemFilterCollection, UserItemData};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Foreground state of a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LibraryState {
    #[default]
    Initial,
    Refreshing,
    Content,
    Error(LibraryError),
}

impl LibraryState {
    pub fn is_error(&self) -> bool {
        matches!(self, LibraryState::Error(_))
    }
}

/// Work that runs without replacing what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BackgroundState {
    GettingNextPage,
    GettingRandomElement,
}

/// One-shot outputs that are not part of the rendered state.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent<E> {
    RetrievedRandomElement(E),
}

/// Requests a caller can make of a paging session.
#[derive(Debug, Clone, PartialEq)]
pub enum PagingIntent {
    Refresh,
    GetNextPage,
    GetRandomElement,
    /// Replace the active filters. Takes effect on the next fetch; pair with
    /// `Refresh` to reload.
    SetFilters(ItemFilterCollection),
    ItemDeleted(ElementId),
    UserDataChanged(UserItemData),
}

/// Immutable view published after every change.
#[derive(Debug, Clone)]
pub struct PagingSnapshot<E> {
    pub elements: Arc<[E]>,
    pub state: LibraryState,
    pub background: BTreeSet<BackgroundState>,
    /// `None` until the first page has been requested.
    pub current_page: Option<usize>,
    pub has_next_page: bool,
    pub filters: ItemFilterCollection,
}

impl<E> PagingSnapshot<E> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_loading_more(&self) -> bool {
        self.background.contains(&BackgroundState::GettingNextPage)
    }
}
