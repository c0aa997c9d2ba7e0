use super::{ITEM_FIELDS, attach_page, send_listing};
use async_trait::async_trait;
use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::{PageFetcher, PageRequestContext};
use fennec_contracts::session::ApiRequest;
use fennec_model::{BaseItem, ElementId};

/// `/Shows/NextUp`: the next unwatched episode of each series in progress.
///
/// Has no server random endpoint; random picks come from loaded pages.
#[derive(Debug, Clone, Default)]
pub struct NextUpFetcher {
    series_id: Option<ElementId>,
    /// Include series the user finished and started again.
    enable_rewatching: bool,
}

impl NextUpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_series(series_id: ElementId) -> Self {
        Self {
            series_id: Some(series_id),
            enable_rewatching: false,
        }
    }

    pub fn with_rewatching(mut self, enabled: bool) -> Self {
        self.enable_rewatching = enabled;
        self
    }
}

#[async_trait]
impl PageFetcher for NextUpFetcher {
    type Element = BaseItem;

    async fn fetch(&self, context: &PageRequestContext) -> Result<Vec<BaseItem>, FetchError> {
        let request = ApiRequest::get("/Shows/NextUp")
            .query("UserId", context.session.user_id())
            .query("EnableUserData", true)
            .query("Fields", ITEM_FIELDS)
            .query("EnableRewatching", self.enable_rewatching)
            .query_opt("SeriesId", self.series_id.as_ref());
        send_listing(context, attach_page(request, context)).await
    }
}
