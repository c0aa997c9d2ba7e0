use super::{ITEM_FIELDS, attach_page, send_listing};
use async_trait::async_trait;
use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::{PageFetcher, PageRequestContext};
use fennec_contracts::session::ApiRequest;
use fennec_model::{BaseItem, ElementId, ItemFilterCollection, ItemKind, ItemSortBy};

/// How a parent scopes the items beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    /// A library root or view; children are listed recursively.
    CollectionFolder,
    UserView,
    BoxSet,
    /// A plain folder; only direct children.
    Folder,
    Person,
    Studio,
}

impl ParentKind {
    pub fn from_item_kind(kind: ItemKind) -> Option<Self> {
        match kind {
            ItemKind::CollectionFolder | ItemKind::AggregateFolder => {
                Some(ParentKind::CollectionFolder)
            }
            ItemKind::UserView => Some(ParentKind::UserView),
            ItemKind::BoxSet => Some(ParentKind::BoxSet),
            ItemKind::Folder => Some(ParentKind::Folder),
            ItemKind::Person => Some(ParentKind::Person),
            ItemKind::Studio => Some(ParentKind::Studio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryParent {
    pub id: ElementId,
    pub kind: ParentKind,
}

impl LibraryParent {
    pub fn new(id: ElementId, kind: ParentKind) -> Self {
        Self { id, kind }
    }

    /// Scope for browsing into `item`, if it can have children.
    pub fn from_item(item: &BaseItem) -> Option<Self> {
        let kind = ParentKind::from_item_kind(item.kind())?;
        Some(Self {
            id: item.id.clone()?,
            kind,
        })
    }
}

/// `/Users/{id}/Items`, optionally scoped to a parent.
#[derive(Debug, Clone, Default)]
pub struct ItemsFetcher {
    parent: Option<LibraryParent>,
}

impl ItemsFetcher {
    pub fn new(parent: Option<LibraryParent>) -> Self {
        Self { parent }
    }

    pub fn parent(&self) -> Option<&LibraryParent> {
        self.parent.as_ref()
    }

    fn base_request(&self, context: &PageRequestContext) -> ApiRequest {
        let path = format!("/Users/{}/Items", context.session.user_id());
        let mut request = ApiRequest::get(path)
            .query("EnableUserData", true)
            .query("Fields", ITEM_FIELDS);

        let mut recursive = true;
        if let Some(parent) = &self.parent {
            request = match parent.kind {
                ParentKind::CollectionFolder | ParentKind::UserView | ParentKind::BoxSet => {
                    request.query("ParentId", &parent.id)
                }
                ParentKind::Folder => {
                    recursive = false;
                    request.query("ParentId", &parent.id)
                }
                ParentKind::Person => request.query("PersonIds", &parent.id),
                ParentKind::Studio => request.query("StudioIds", &parent.id),
            };
        }
        if recursive {
            request = request.query("Recursive", true);
        }
        request
    }
}

fn attach_filters(request: ApiRequest, filters: &ItemFilterCollection) -> ApiRequest {
    let kinds: Vec<ItemKind> = if filters.item_kinds.is_empty() {
        ItemKind::supported().to_vec()
    } else {
        filters.item_kinds.clone()
    };

    let request = request
        .query_list("IncludeItemTypes", kinds.iter().map(ItemKind::api_name))
        .query_list("Filters", filters.traits.iter().map(|t| t.api_name()))
        .query_list("Genres", &filters.genres)
        .query_list("Tags", &filters.tags)
        .query_list("Years", &filters.years)
        .query_opt("SearchTerm", filters.query.as_deref())
        .query_list("SortBy", filters.sort_by.iter().map(ItemSortBy::api_name))
        .query_list("SortOrder", filters.sort_order.iter().map(|o| o.api_name()));

    match filters.letter {
        Some('#') => request.query("NameLessThan", "A"),
        Some(letter) => request.query("NameStartsWith", letter),
        None => request,
    }
}

#[async_trait]
impl PageFetcher for ItemsFetcher {
    type Element = BaseItem;

    async fn fetch(&self, context: &PageRequestContext) -> Result<Vec<BaseItem>, FetchError> {
        let request = attach_filters(self.base_request(context), &context.filters);
        let request = attach_page(request, context)
            .query_list("ExcludeItemIds", &context.exclude_ids);
        send_listing(context, request).await
    }

    fn supports_random(&self) -> bool {
        true
    }

    async fn fetch_random(
        &self,
        context: &PageRequestContext,
    ) -> Result<Option<BaseItem>, FetchError> {
        let mut filters = context.filters.clone();
        filters.sort_by = vec![ItemSortBy::Random];
        filters.sort_order.clear();

        let request = attach_filters(self.base_request(context), &filters).query("Limit", 1);
        let items: Vec<BaseItem> = send_listing(context, request).await?;
        Ok(items.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::test_support::{RecordingSession, TWO_MOVIES};
    use fennec_contracts::element::Element;
    use fennec_model::{ItemTrait, SortOrder};
    use std::sync::Arc;

    fn id(raw: &str) -> ElementId {
        ElementId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn page_requests_carry_filters_and_offset() {
        let session = Arc::new(RecordingSession::new(TWO_MOVIES));
        let fetcher = ItemsFetcher::new(Some(LibraryParent::new(
            id("lib"),
            ParentKind::CollectionFolder,
        )));

        let mut filters = ItemFilterCollection::default()
            .with_query("ali")
            .with_sort(ItemSortBy::ProductionYear, SortOrder::Descending);
        filters.genres = vec!["Horror".into(), "Sci-Fi".into()];
        filters.traits = vec![ItemTrait::IsUnplayed];
        filters.years = vec![1979, 1986];

        let context = PageRequestContext::page(2, 50, filters, session.clone());
        let items = fetcher.fetch(&context).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].display_title(), "Aliens");

        let request = session.last_request();
        assert_eq!(request.path, "/Users/user-1/Items");
        assert_eq!(request.query_value("ParentId"), Some("lib"));
        assert_eq!(request.query_value("Recursive"), Some("true"));
        assert_eq!(request.query_value("StartIndex"), Some("100"));
        assert_eq!(request.query_value("Limit"), Some("50"));
        assert_eq!(request.query_value("SearchTerm"), Some("ali"));
        assert_eq!(request.query_value("Genres"), Some("Horror,Sci-Fi"));
        assert_eq!(request.query_value("Years"), Some("1979,1986"));
        assert_eq!(request.query_value("Filters"), Some("IsUnplayed"));
        assert_eq!(request.query_value("SortBy"), Some("ProductionYear"));
        assert_eq!(request.query_value("SortOrder"), Some("Descending"));
        assert_eq!(
            request.query_value("IncludeItemTypes"),
            Some("BoxSet,Episode,Movie,MusicVideo,Series,Video")
        );
        assert_eq!(request.query_value("ExcludeItemIds"), None);
    }

    #[tokio::test]
    async fn folders_are_not_recursive_and_people_scope_by_person() {
        let session = Arc::new(RecordingSession::new(TWO_MOVIES));
        let context = PageRequestContext::page(0, 10, ItemFilterCollection::default(), session.clone());

        ItemsFetcher::new(Some(LibraryParent::new(id("dir"), ParentKind::Folder)))
            .fetch(&context)
            .await
            .unwrap();
        let request = session.last_request();
        assert_eq!(request.query_value("ParentId"), Some("dir"));
        assert_eq!(request.query_value("Recursive"), None);

        ItemsFetcher::new(Some(LibraryParent::new(id("p1"), ParentKind::Person)))
            .fetch(&context)
            .await
            .unwrap();
        let request = session.last_request();
        assert_eq!(request.query_value("PersonIds"), Some("p1"));
        assert_eq!(request.query_value("ParentId"), None);
    }

    #[tokio::test]
    async fn letter_hash_selects_names_before_a() {
        let session = Arc::new(RecordingSession::new(TWO_MOVIES));
        let mut filters = ItemFilterCollection::default();
        filters.letter = Some('#');
        let context = PageRequestContext::page(0, 10, filters.clone(), session.clone());
        ItemsFetcher::default().fetch(&context).await.unwrap();
        assert_eq!(session.last_request().query_value("NameLessThan"), Some("A"));

        filters.letter = Some('K');
        let context = PageRequestContext::page(0, 10, filters, session.clone());
        ItemsFetcher::default().fetch(&context).await.unwrap();
        let request = session.last_request();
        assert_eq!(request.query_value("NameStartsWith"), Some("K"));
        assert_eq!(request.query_value("NameLessThan"), None);
    }

    #[tokio::test]
    async fn random_pick_asks_for_one_randomly_sorted_item() {
        let session = Arc::new(RecordingSession::new(TWO_MOVIES));
        let fetcher = ItemsFetcher::default();
        assert!(fetcher.supports_random());

        let context = PageRequestContext::random(ItemFilterCollection::default(), session.clone());
        let picked = fetcher.fetch_random(&context).await.unwrap().unwrap();
        assert_eq!(picked.element_id(), Some(&id("m1")));

        let request = session.last_request();
        assert_eq!(request.query_value("Limit"), Some("1"));
        assert_eq!(request.query_value("SortBy"), Some("Random"));
        assert_eq!(request.query_value("StartIndex"), None);
    }

    #[tokio::test]
    async fn exclusions_are_sent_for_random_paging() {
        let session = Arc::new(RecordingSession::new(TWO_MOVIES));
        let mut context = PageRequestContext::page(1, 2, ItemFilterCollection::default(), session.clone());
        context.exclude_ids = vec![id("a"), id("b")];
        ItemsFetcher::default().fetch(&context).await.unwrap();
        assert_eq!(session.last_request().query_value("ExcludeItemIds"), Some("a,b"));
    }

    #[test]
    fn parents_are_derived_from_browsable_items() {
        let mut folder = BaseItem::new(Some(id("f")), "Movies", ItemKind::CollectionFolder);
        assert_eq!(
            LibraryParent::from_item(&folder),
            Some(LibraryParent::new(id("f"), ParentKind::CollectionFolder))
        );
        folder.kind = Some(ItemKind::Movie);
        assert_eq!(LibraryParent::from_item(&folder), None);
    }
}
