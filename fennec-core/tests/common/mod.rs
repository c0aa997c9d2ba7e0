#![allow(dead_code)]

use async_trait::async_trait;
use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::{PageFetcher, PageRequestContext};
use fennec_contracts::session::{ApiRequest, ApiResponse, AuthenticatedSession};
use fennec_core::paging::{PagingHandle, PagingOptions, PagingSession};
use fennec_model::{BaseItem, ElementId, ItemKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use url::Url;

pub const WAIT: Duration = Duration::from_secs(5);

/// Session that never reaches a server; fetchers under test do not use it.
#[derive(Debug)]
pub struct DetachedSession {
    url: Url,
}

impl DetachedSession {
    pub fn shared() -> Arc<dyn AuthenticatedSession> {
        Arc::new(Self {
            url: Url::parse("http://localhost:8096/").unwrap(),
        })
    }
}

#[async_trait]
impl AuthenticatedSession for DetachedSession {
    fn user_id(&self) -> &str {
        "test-user"
    }

    fn server_url(&self) -> &Url {
        &self.url
    }

    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, FetchError> {
        Err(FetchError::Transport("detached session".into()))
    }
}

/// A fetch parked until the test answers it.
pub struct Pending<T> {
    pub context: PageRequestContext,
    reply: oneshot::Sender<Result<T, FetchError>>,
}

impl<T> Pending<T> {
    pub fn respond(self, result: Result<T, FetchError>) -> bool {
        self.reply.send(result).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.reply.is_closed()
    }

    /// Resolves once the session dropped the fetch future.
    pub async fn cancelled(&mut self) {
        self.reply.closed().await
    }
}

/// Fetcher whose every call is handed to the test through a channel.
#[derive(Debug)]
pub struct ControlledFetcher {
    pages: mpsc::UnboundedSender<Pending<Vec<BaseItem>>>,
    randoms: Option<mpsc::UnboundedSender<Pending<Option<BaseItem>>>>,
}

#[async_trait]
impl PageFetcher for ControlledFetcher {
    type Element = BaseItem;

    async fn fetch(&self, context: &PageRequestContext) -> Result<Vec<BaseItem>, FetchError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.pages.send(Pending {
            context: context.clone(),
            reply,
        });
        rx.await.unwrap_or(Err(FetchError::Cancelled))
    }

    fn supports_random(&self) -> bool {
        self.randoms.is_some()
    }

    async fn fetch_random(
        &self,
        context: &PageRequestContext,
    ) -> Result<Option<BaseItem>, FetchError> {
        let Some(randoms) = &self.randoms else {
            return Err(FetchError::Unsupported("random element"));
        };
        let (reply, rx) = oneshot::channel();
        let _ = randoms.send(Pending {
            context: context.clone(),
            reply,
        });
        rx.await.unwrap_or(Err(FetchError::Cancelled))
    }
}

pub struct Harness {
    pub handle: PagingHandle<BaseItem>,
    pub pages: mpsc::UnboundedReceiver<Pending<Vec<BaseItem>>>,
    pub randoms: mpsc::UnboundedReceiver<Pending<Option<BaseItem>>>,
}

impl Harness {
    pub fn spawn(options: PagingOptions, remote_random: bool) -> Self {
        Self::spawn_with(options, remote_random, |session| session)
    }

    pub fn spawn_with(
        options: PagingOptions,
        remote_random: bool,
        configure: impl FnOnce(PagingSession<BaseItem>) -> PagingSession<BaseItem>,
    ) -> Self {
        let (page_tx, pages) = mpsc::unbounded_channel();
        let (random_tx, randoms) = mpsc::unbounded_channel();
        let fetcher = ControlledFetcher {
            pages: page_tx,
            randoms: remote_random.then_some(random_tx),
        };
        let session = PagingSession::new(Arc::new(fetcher), DetachedSession::shared(), options);
        Self {
            handle: configure(session).spawn(),
            pages,
            randoms,
        }
    }

    pub async fn next_page_request(&mut self) -> Pending<Vec<BaseItem>> {
        tokio::time::timeout(WAIT, self.pages.recv())
            .await
            .expect("timed out waiting for a page fetch")
            .expect("fetcher dropped")
    }

    pub async fn next_random_request(&mut self) -> Pending<Option<BaseItem>> {
        tokio::time::timeout(WAIT, self.randoms.recv())
            .await
            .expect("timed out waiting for a random fetch")
            .expect("fetcher dropped")
    }
}

pub fn item(id: &str) -> BaseItem {
    BaseItem::new(Some(ElementId::new(id).unwrap()), id, ItemKind::Movie)
}

pub fn items(range: std::ops::Range<usize>) -> Vec<BaseItem> {
    range.map(|n| item(&format!("item-{n}"))).collect()
}
