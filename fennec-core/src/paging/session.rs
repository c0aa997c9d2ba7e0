use super::machine::{FetchSlot, FetchTicket, PageRequest, PagingEffect, PagingMachine, PagingMessage};
use super::options::PagingOptions;
use super::state::{LibraryEvent, PagingIntent, PagingSnapshot};
use crate::notifications::NotificationCenter;
use crate::random::RandomStrategy;
use fennec_contracts::element::Element;
use fennec_contracts::error::FetchError;
use fennec_contracts::fetcher::{PageFetcher, PageRequestContext};
use fennec_contracts::session::AuthenticatedSession;
use fennec_model::{ItemFilterCollection, LibraryNotification};
use futures::{Stream, StreamExt, future};
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// The session task has ended; the handle can no longer issue intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("paging session closed")]
pub struct SessionClosed;

struct Source<E> {
    fetcher: Arc<dyn PageFetcher<Element = E>>,
    session: Arc<dyn AuthenticatedSession>,
}

/// A paging session before it is started.
///
/// ```ignore
/// let handle = PagingSession::new(fetcher, session, PagingOptions::default())
///     .with_notifications(&center)
///     .spawn();
/// handle.refresh()?;
/// ```
pub struct PagingSession<E: Element> {
    source: Option<Source<E>>,
    machine: PagingMachine<E>,
    options: PagingOptions,
    notifications: Option<broadcast::Receiver<LibraryNotification>>,
    center: Option<NotificationCenter>,
}

impl<E: Element> fmt::Debug for PagingSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingSession")
            .field("fetcher", &self.source.as_ref().map(|source| &source.fetcher))
            .field("options", &self.options)
            .field("state", self.machine.state())
            .finish()
    }
}

impl<E: Element> PagingSession<E> {
    pub fn new(
        fetcher: Arc<dyn PageFetcher<Element = E>>,
        session: Arc<dyn AuthenticatedSession>,
        options: PagingOptions,
    ) -> Self {
        let strategy = RandomStrategy::for_fetcher(fetcher.supports_random());
        let machine = PagingMachine::new(&options, strategy, ItemFilterCollection::default());
        Self {
            source: Some(Source { fetcher, session }),
            machine,
            options,
            notifications: None,
            center: None,
        }
    }

    /// A session over a fixed list. It never fetches.
    pub fn with_static_elements(elements: impl IntoIterator<Item = E>, options: PagingOptions) -> Self {
        Self {
            source: None,
            machine: PagingMachine::new_static(&options, elements),
            options,
            notifications: None,
            center: None,
        }
    }

    pub fn with_filters(mut self, filters: ItemFilterCollection) -> Self {
        let _ = self.machine.update(PagingIntent::SetFilters(filters));
        self
    }

    /// Keep the list in sync with deletions and watched-state changes, and
    /// share the user data of fetched pages with other lists.
    pub fn with_notifications(mut self, center: &NotificationCenter) -> Self {
        self.notifications = Some(center.subscribe());
        self.center = Some(center.clone());
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.machine = self.machine.with_rng(rng);
        self
    }

    /// Start the session task. Must be called within a tokio runtime.
    pub fn spawn(self) -> PagingHandle<E> {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(self.machine.snapshot());
        let (event_tx, _) = broadcast::channel(self.options.event_capacity.max(1));
        let shutdown = CancellationToken::new();

        let actor = SessionActor {
            source: self.source,
            machine: self.machine,
            intents: intent_rx,
            completions: completion_rx,
            completion_tx,
            notifications: self.notifications,
            center: self.center,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
            shutdown: shutdown.clone(),
            page_task: None,
            random_task: None,
        };
        let task = tokio::spawn(actor.run());

        PagingHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
            events: event_tx,
            shutdown,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }
}

/// Cloneable front door of a running paging session.
///
/// Dropping every handle stops the session and cancels its outstanding
/// fetches.
#[derive(Clone)]
pub struct PagingHandle<E> {
    intents: mpsc::UnboundedSender<PagingIntent>,
    snapshots: watch::Receiver<PagingSnapshot<E>>,
    events: broadcast::Sender<LibraryEvent<E>>,
    shutdown: CancellationToken,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<E> fmt::Debug for PagingHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingHandle")
            .field("closed", &self.intents.is_closed())
            .finish()
    }
}

impl<E: Element> PagingHandle<E> {
    pub fn send(&self, intent: PagingIntent) -> Result<(), SessionClosed> {
        self.intents.send(intent).map_err(|_| SessionClosed)
    }

    pub fn refresh(&self) -> Result<(), SessionClosed> {
        self.send(PagingIntent::Refresh)
    }

    pub fn get_next_page(&self) -> Result<(), SessionClosed> {
        self.send(PagingIntent::GetNextPage)
    }

    pub fn get_random_element(&self) -> Result<(), SessionClosed> {
        self.send(PagingIntent::GetRandomElement)
    }

    pub fn set_filters(&self, filters: ItemFilterCollection) -> Result<(), SessionClosed> {
        self.send(PagingIntent::SetFilters(filters))
    }

    /// Latest published state.
    pub fn snapshot(&self) -> PagingSnapshot<E> {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<PagingSnapshot<E>> {
        self.snapshots.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<LibraryEvent<E>> {
        self.events.subscribe()
    }

    /// Every published snapshot, starting with the current one.
    pub fn snapshot_stream(&self) -> WatchStream<PagingSnapshot<E>> {
        WatchStream::new(self.snapshots.clone())
    }

    /// Events from now on. Events missed by a lagging consumer are skipped.
    pub fn event_stream(&self) -> impl Stream<Item = LibraryEvent<E>> + Send + 'static {
        BroadcastStream::new(self.events.subscribe())
            .filter_map(|event| future::ready(event.ok()))
    }

    /// Wait until the published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&PagingSnapshot<E>) -> bool,
    ) -> Result<PagingSnapshot<E>, SessionClosed> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.intents.is_closed()
    }

    /// Resolves once the session task has stopped accepting intents.
    pub async fn closed(&self) {
        self.intents.closed().await
    }

    /// Stop the session, cancel outstanding fetches and wait for the task.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.lock().await.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "paging session task ended abnormally");
        }
    }
}

struct SessionActor<E: Element> {
    source: Option<Source<E>>,
    machine: PagingMachine<E>,
    intents: mpsc::UnboundedReceiver<PagingIntent>,
    completions: mpsc::UnboundedReceiver<PagingMessage<E>>,
    completion_tx: mpsc::UnboundedSender<PagingMessage<E>>,
    notifications: Option<broadcast::Receiver<LibraryNotification>>,
    center: Option<NotificationCenter>,
    snapshots: watch::Sender<PagingSnapshot<E>>,
    events: broadcast::Sender<LibraryEvent<E>>,
    shutdown: CancellationToken,
    page_task: Option<CancellationToken>,
    random_task: Option<CancellationToken>,
}

enum Inbound<E> {
    Message(PagingMessage<E>),
    Notification(Result<LibraryNotification, RecvError>),
    Stop,
}

impl<E: Element> SessionActor<E> {
    async fn run(mut self) {
        debug!(is_static = self.machine.is_static(), "paging session started");

        loop {
            let inbound = tokio::select! {
                _ = self.shutdown.cancelled() => Inbound::Stop,
                intent = self.intents.recv() => match intent {
                    Some(intent) => Inbound::Message(PagingMessage::Intent(intent)),
                    None => Inbound::Stop,
                },
                Some(completion) = self.completions.recv() => Inbound::Message(completion),
                notification = recv_notification(&mut self.notifications) => {
                    Inbound::Notification(notification)
                }
            };

            match inbound {
                Inbound::Stop => break,
                Inbound::Message(message) => self.handle(message),
                Inbound::Notification(Ok(notification)) => {
                    let intent = match notification {
                        LibraryNotification::ItemDeleted(id) => PagingIntent::ItemDeleted(id),
                        LibraryNotification::UserDataChanged(data) => {
                            PagingIntent::UserDataChanged(data)
                        }
                    };
                    self.handle(PagingMessage::Intent(intent));
                }
                Inbound::Notification(Err(RecvError::Lagged(skipped))) => {
                    warn!(skipped, "paging session missed library notifications");
                }
                Inbound::Notification(Err(RecvError::Closed)) => {
                    self.notifications = None;
                }
            }
        }

        self.cancel(FetchSlot::Page);
        self.cancel(FetchSlot::Random);
        self.shutdown.cancel();
        self.intents.close();
        info!("paging session stopped");
    }

    fn handle(&mut self, message: PagingMessage<E>) {
        if let PagingMessage::Intent(intent) = &message {
            debug!(?intent, "paging intent");
        }

        let update = self.machine.update(message);
        for effect in update.effects {
            self.apply(effect);
        }
        if update.changed {
            self.snapshots.send_replace(self.machine.snapshot());
        }
    }

    fn apply(&mut self, effect: PagingEffect<E>) {
        match effect {
            PagingEffect::FetchPage { ticket, request } => self.dispatch_page(ticket, request),
            PagingEffect::FetchRandom { ticket, filters } => self.dispatch_random(ticket, filters),
            PagingEffect::Cancel(slot) => self.cancel(slot),
            PagingEffect::Emit(event) => {
                // Nobody listening is fine.
                let _ = self.events.send(event);
            }
            PagingEffect::Report(error) => warn!(%error, "paging fetch failed"),
            PagingEffect::ShareUserData(batch) => {
                if let Some(center) = &self.center {
                    let shared = batch.into_iter().filter(|data| center.share_user_data(data.clone())).count();
                    if shared > 0 {
                        debug!(shared, "rebroadcast changed user data");
                    }
                }
            }
        }
    }

    fn dispatch_page(&mut self, ticket: FetchTicket, request: PageRequest) {
        let Some(source) = &self.source else {
            let _ = self.completion_tx.send(PagingMessage::PageLoaded {
                ticket,
                result: Err(FetchError::Unsupported("fetching pages of a static list")),
            });
            return;
        };

        let mut context = PageRequestContext::page(
            request.page_index,
            request.page_size,
            request.filters,
            Arc::clone(&source.session),
        );
        context.exclude_ids = request.exclude_ids;

        let fetcher = Arc::clone(&source.fetcher);
        let completions = self.completion_tx.clone();
        let token = self.replace_task(FetchSlot::Page);

        trace!(page = context.page_index, offset = context.offset, "dispatching page fetch");
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = fetcher.fetch(&context) => {
                    let _ = completions.send(PagingMessage::PageLoaded { ticket, result });
                }
            }
        });
    }

    fn dispatch_random(&mut self, ticket: FetchTicket, filters: ItemFilterCollection) {
        let Some(source) = &self.source else {
            let _ = self.completion_tx.send(PagingMessage::RandomLoaded {
                ticket,
                result: Ok(None),
            });
            return;
        };

        let context = PageRequestContext::random(filters, Arc::clone(&source.session));
        let fetcher = Arc::clone(&source.fetcher);
        let completions = self.completion_tx.clone();
        let token = self.replace_task(FetchSlot::Random);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = fetcher.fetch_random(&context) => {
                    let _ = completions.send(PagingMessage::RandomLoaded { ticket, result });
                }
            }
        });
    }

    fn replace_task(&mut self, slot: FetchSlot) -> CancellationToken {
        self.cancel(slot);
        let token = self.shutdown.child_token();
        match slot {
            FetchSlot::Page => self.page_task = Some(token.clone()),
            FetchSlot::Random => self.random_task = Some(token.clone()),
        }
        token
    }

    fn cancel(&mut self, slot: FetchSlot) {
        let task = match slot {
            FetchSlot::Page => self.page_task.take(),
            FetchSlot::Random => self.random_task.take(),
        };
        if let Some(token) = task {
            token.cancel();
        }
    }
}

async fn recv_notification(
    notifications: &mut Option<broadcast::Receiver<LibraryNotification>>,
) -> Result<LibraryNotification, RecvError> {
    match notifications {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
