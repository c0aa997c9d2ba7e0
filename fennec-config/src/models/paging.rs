use fennec_core::PagingOptions;
use fennec_core::debounce::DEFAULT_DEBOUNCE_WINDOW;
use fennec_core::paging::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Paging behaviour shared by every library list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Elements requested per page. Larger pages mean fewer round trips but
    /// a slower first paint.
    pub page_size: usize,
    /// Quiet period after the last filter edit before the list refreshes.
    #[serde(with = "super::duration")]
    pub filter_debounce: Duration,
    /// Random-element events buffered per subscriber.
    pub event_capacity: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter_debounce: DEFAULT_DEBOUNCE_WINDOW,
            event_capacity: 16,
        }
    }
}

impl From<PagingConfig> for PagingOptions {
    fn from(config: PagingConfig) -> Self {
        PagingOptions {
            page_size: config.page_size,
            filter_debounce: config.filter_debounce,
            event_capacity: config.event_capacity,
        }
    }
}
