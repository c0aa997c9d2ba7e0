use crate::debounce::DEFAULT_DEBOUNCE_WINDOW;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 50;
/// For horizontally scrolling shelves that only show a handful of posters.
pub const SMALL_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingOptions {
    pub page_size: usize,
    pub filter_debounce: Duration,
    /// Buffered `LibraryEvent`s per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter_debounce: DEFAULT_DEBOUNCE_WINDOW,
            event_capacity: 16,
        }
    }
}

impl PagingOptions {
    pub fn small() -> Self {
        Self {
            page_size: SMALL_PAGE_SIZE,
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Page size actually used for requests; never zero.
    pub(crate) fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }
}
