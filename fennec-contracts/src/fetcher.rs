//! Per data source page retrieval.

use crate::element::Element;
use crate::error::FetchError;
use crate::session::AuthenticatedSession;
use async_trait::async_trait;
use fennec_model::{ElementId, ItemFilterCollection};
use std::fmt::Debug;
use std::sync::Arc;

/// Everything one page request needs. Built fresh for every call.
#[derive(Debug, Clone)]
pub struct PageRequestContext {
    pub page_index: usize,
    pub offset: usize,
    pub page_size: usize,
    pub filters: ItemFilterCollection,
    /// Ids already held by the caller. Only populated when the ordering is
    /// not stable across pages (random sort); grows with every page.
    pub exclude_ids: Vec<ElementId>,
    pub session: Arc<dyn AuthenticatedSession>,
}

impl PageRequestContext {
    pub fn page(
        page_index: usize,
        page_size: usize,
        filters: ItemFilterCollection,
        session: Arc<dyn AuthenticatedSession>,
    ) -> Self {
        Self {
            page_index,
            offset: page_index.saturating_mul(page_size),
            page_size,
            filters,
            exclude_ids: Vec::new(),
            session,
        }
    }

    /// Context for a single server-side random pick: same filters, no
    /// pagination, limit one.
    pub fn random(filters: ItemFilterCollection, session: Arc<dyn AuthenticatedSession>) -> Self {
        Self {
            page_index: 0,
            offset: 0,
            page_size: 1,
            filters,
            exclude_ids: Vec::new(),
            session,
        }
    }
}

/// One remote data source (next up, continue watching, folder items, ...).
///
/// `fetch` must depend only on its context and remote state.
#[async_trait]
pub trait PageFetcher: Send + Sync + Debug + 'static {
    type Element: Element;

    async fn fetch(&self, context: &PageRequestContext) -> Result<Vec<Self::Element>, FetchError>;

    /// Whether the source has a dedicated server-side random query.
    fn supports_random(&self) -> bool {
        false
    }

    async fn fetch_random(
        &self,
        _context: &PageRequestContext,
    ) -> Result<Option<Self::Element>, FetchError> {
        Err(FetchError::Unsupported("random element"))
    }
}
