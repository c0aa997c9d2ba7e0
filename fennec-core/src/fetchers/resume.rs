use super::{ITEM_FIELDS, attach_page, send_listing};
use async_trait::async_trait;
use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::{PageFetcher, PageRequestContext};
use fennec_contracts::session::ApiRequest;
use fennec_model::{BaseItem, ItemKind};

/// Continue watching: partially played videos, most recent first.
#[derive(Debug, Clone)]
pub struct ResumeFetcher {
    kinds: Vec<ItemKind>,
}

impl Default for ResumeFetcher {
    fn default() -> Self {
        Self {
            kinds: vec![ItemKind::Episode, ItemKind::Movie, ItemKind::Video],
        }
    }
}

impl ResumeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(kinds: Vec<ItemKind>) -> Self {
        Self { kinds }
    }
}

#[async_trait]
impl PageFetcher for ResumeFetcher {
    type Element = BaseItem;

    async fn fetch(&self, context: &PageRequestContext) -> Result<Vec<BaseItem>, FetchError> {
        let path = format!("/Users/{}/Items/Resume", context.session.user_id());
        let request = ApiRequest::get(path)
            .query("MediaTypes", "Video")
            .query("EnableUserData", true)
            .query("Fields", ITEM_FIELDS)
            .query_list("IncludeItemTypes", self.kinds.iter().map(ItemKind::api_name))
            .query_opt("SearchTerm", context.filters.query.as_deref());
        send_listing(context, attach_page(request, context)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::test_support::{RecordingSession, TWO_MOVIES};
    use fennec_model::ItemFilterCollection;
    use std::sync::Arc;

    #[tokio::test]
    async fn lists_resumable_videos() {
        let session = Arc::new(RecordingSession::new(TWO_MOVIES));
        let context = PageRequestContext::page(0, 20, ItemFilterCollection::default(), session.clone());
        ResumeFetcher::new().fetch(&context).await.unwrap();

        let request = session.last_request();
        assert_eq!(request.path, "/Users/user-1/Items/Resume");
        assert_eq!(request.query_value("MediaTypes"), Some("Video"));
        assert_eq!(request.query_value("IncludeItemTypes"), Some("Episode,Movie,Video"));
        assert_eq!(request.query_value("Limit"), Some("20"));
        assert_eq!(request.query_value("StartIndex"), Some("0"));
    }
}
