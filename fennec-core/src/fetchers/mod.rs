//! Page fetchers backed by the Jellyfin HTTP API.
//!
//! Each fetcher is one data source a library surface can page through.

mod items;
mod next_up;
mod people;
mod resume;

pub use items::{ItemsFetcher, LibraryParent, ParentKind};
pub use next_up::NextUpFetcher;
pub use people::PeopleFetcher;
pub use resume::ResumeFetcher;

use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::PageRequestContext;
use fennec_contracts::session::ApiRequest;
use serde::Deserialize;

/// Fields requested alongside every listing.
const ITEM_FIELDS: &str = "Overview,ParentId,Chapters";

/// Envelope of every paged listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_record_count: Option<u64>,
    #[serde(default)]
    pub start_index: Option<u64>,
}

fn attach_page(request: ApiRequest, context: &PageRequestContext) -> ApiRequest {
    request
        .query("Limit", context.page_size)
        .query("StartIndex", context.offset)
}

async fn send_listing<T>(
    context: &PageRequestContext,
    request: ApiRequest,
) -> Result<Vec<T>, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let response = context.session.send(request).await?;
    let listing: ItemsResponse<T> = response.json()?;
    Ok(listing.items)
}
