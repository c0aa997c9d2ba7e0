use super::{attach_page, send_listing};
use async_trait::async_trait;
use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::{PageFetcher, PageRequestContext};
use fennec_contracts::session::ApiRequest;
use fennec_model::Person;

/// `/Persons`, narrowed by the filter's search term.
#[derive(Debug, Clone, Default)]
pub struct PeopleFetcher;

impl PeopleFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageFetcher for PeopleFetcher {
    type Element = Person;

    async fn fetch(&self, context: &PageRequestContext) -> Result<Vec<Person>, FetchError> {
        let request = ApiRequest::get("/Persons")
            .query("UserId", context.session.user_id())
            .query("EnableUserData", true)
            .query_opt("SearchTerm", context.filters.query.as_deref());
        send_listing(context, attach_page(request, context)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::test_support::RecordingSession;
    use fennec_contracts::element::Element;
    use fennec_model::{ItemFilterCollection, SelectTarget};
    use std::sync::Arc;

    #[tokio::test]
    async fn people_search_decodes_persons() {
        let body = r#"{"Items":[{"Id":"p1","Name":"Sigourney Weaver","Type":"Actor"}]}"#;
        let session = Arc::new(RecordingSession::new(body));
        let filters = ItemFilterCollection::default().with_query("weaver");
        let context = PageRequestContext::page(0, 50, filters, session.clone());

        let people = PeopleFetcher::new().fetch(&context).await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].display_title(), "Sigourney Weaver");
        assert!(matches!(people[0].select_target(), SelectTarget::Person { .. }));

        let request = session.last_request();
        assert_eq!(request.path, "/Persons");
        assert_eq!(request.query_value("SearchTerm"), Some("weaver"));
    }
}
