use super::options::PagingOptions;
use super::state::{BackgroundState, LibraryEvent, LibraryState, PagingIntent, PagingSnapshot};
use crate::collection::IdentifiedArray;
use crate::error::LibraryError;
use crate::random::{RandomStrategy, pick_local};
use fennec_contracts::element::Element;
use fennec_contracts::error::FetchError;
use fennec_model::{ElementId, ItemFilterCollection, UserItemData};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use tracing::trace;

/// Identifies one dispatched fetch. Completions carrying any other ticket
/// than the outstanding one belong to superseded work and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchSlot {
    Page,
    Random,
}

/// What the session needs to build a `PageRequestContext`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
    pub filters: ItemFilterCollection,
    pub exclude_ids: Vec<ElementId>,
}

#[derive(Debug, Clone)]
pub enum PagingMessage<E> {
    Intent(PagingIntent),
    PageLoaded {
        ticket: FetchTicket,
        result: Result<Vec<E>, FetchError>,
    },
    RandomLoaded {
        ticket: FetchTicket,
        result: Result<Option<E>, FetchError>,
    },
}

impl<E> From<PagingIntent> for PagingMessage<E> {
    fn from(intent: PagingIntent) -> Self {
        PagingMessage::Intent(intent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PagingEffect<E> {
    FetchPage {
        ticket: FetchTicket,
        request: PageRequest,
    },
    FetchRandom {
        ticket: FetchTicket,
        filters: ItemFilterCollection,
    },
    Cancel(FetchSlot),
    Emit(LibraryEvent<E>),
    /// A fetch failed in a way the user does not see as a state change.
    Report(LibraryError),
    /// User data carried by a freshly loaded page, keyed by item id, for
    /// other lists showing the same items.
    ShareUserData(Vec<UserItemData>),
}

/// Result of feeding one message to the machine.
#[derive(Debug)]
pub struct PagingUpdate<E> {
    pub effects: Vec<PagingEffect<E>>,
    /// Whether the published snapshot is now out of date.
    pub changed: bool,
}

impl<E> PagingUpdate<E> {
    fn none() -> Self {
        Self {
            effects: Vec::new(),
            changed: false,
        }
    }

    fn changed(effects: Vec<PagingEffect<E>>) -> Self {
        Self {
            effects,
            changed: true,
        }
    }
}

/// All paging state for one list plus the transition rules between states.
///
/// Pure: no I/O, no clocks. Every fetch is requested through an effect and
/// answered with a message.
#[derive(Debug)]
pub struct PagingMachine<E: Element> {
    page_size: usize,
    is_static: bool,
    strategy: RandomStrategy,
    filters: ItemFilterCollection,
    elements: IdentifiedArray<E>,
    current_page: Option<usize>,
    has_next_page: bool,
    state: LibraryState,
    background: BTreeSet<BackgroundState>,
    page_ticket: Option<FetchTicket>,
    random_ticket: Option<FetchTicket>,
    next_ticket: u64,
    rng: StdRng,
}

impl<E: Element> PagingMachine<E> {
    pub fn new(
        options: &PagingOptions,
        strategy: RandomStrategy,
        filters: ItemFilterCollection,
    ) -> Self {
        Self {
            page_size: options.effective_page_size(),
            is_static: false,
            strategy,
            filters,
            elements: IdentifiedArray::new(),
            current_page: None,
            has_next_page: true,
            state: LibraryState::Initial,
            background: BTreeSet::new(),
            page_ticket: None,
            random_ticket: None,
            next_ticket: 0,
            rng: StdRng::from_os_rng(),
        }
    }

    /// A list whose contents are known up front. Never fetches; random
    /// picks come from the given elements.
    pub fn new_static(options: &PagingOptions, elements: impl IntoIterator<Item = E>) -> Self {
        let mut machine = Self::new(options, RandomStrategy::Local, ItemFilterCollection::default());
        machine.is_static = true;
        machine.elements.append(elements);
        machine.has_next_page = false;
        machine.state = LibraryState::Content;
        machine
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn background(&self) -> &BTreeSet<BackgroundState> {
        &self.background
    }

    pub fn elements(&self) -> &IdentifiedArray<E> {
        &self.elements
    }

    pub fn current_page(&self) -> Option<usize> {
        self.current_page
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn filters(&self) -> &ItemFilterCollection {
        &self.filters
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn strategy(&self) -> RandomStrategy {
        self.strategy
    }

    pub fn snapshot(&self) -> PagingSnapshot<E> {
        PagingSnapshot {
            elements: self.elements.iter().cloned().collect(),
            state: self.state.clone(),
            background: self.background.clone(),
            current_page: self.current_page,
            has_next_page: self.has_next_page,
            filters: self.filters.clone(),
        }
    }

    pub fn update(&mut self, message: impl Into<PagingMessage<E>>) -> PagingUpdate<E> {
        match message.into() {
            PagingMessage::Intent(intent) => self.handle_intent(intent),
            PagingMessage::PageLoaded { ticket, result } => self.page_loaded(ticket, result),
            PagingMessage::RandomLoaded { ticket, result } => self.random_loaded(ticket, result),
        }
    }

    fn handle_intent(&mut self, intent: PagingIntent) -> PagingUpdate<E> {
        match intent {
            PagingIntent::Refresh => self.refresh(),
            PagingIntent::GetNextPage => self.get_next_page(),
            PagingIntent::GetRandomElement => self.get_random_element(),
            PagingIntent::SetFilters(filters) => {
                if self.filters == filters {
                    return PagingUpdate::none();
                }
                self.filters = filters;
                PagingUpdate::changed(Vec::new())
            }
            PagingIntent::ItemDeleted(id) => {
                if self.elements.remove(&id).is_some() {
                    PagingUpdate::changed(Vec::new())
                } else {
                    PagingUpdate::none()
                }
            }
            PagingIntent::UserDataChanged(data) => {
                let Some(id) = data.item_id.clone() else {
                    return PagingUpdate::none();
                };
                match self.elements.update(&id, |element| element.apply_user_data(&data)) {
                    Some(true) => PagingUpdate::changed(Vec::new()),
                    _ => PagingUpdate::none(),
                }
            }
        }
    }

    fn refresh(&mut self) -> PagingUpdate<E> {
        if self.is_static {
            self.state = LibraryState::Content;
            self.has_next_page = false;
            return PagingUpdate::changed(Vec::new());
        }

        let mut effects = self.cancel_all();
        self.background.clear();
        self.elements.remove_all();
        self.current_page = None;
        self.has_next_page = true;
        self.state = LibraryState::Refreshing;

        effects.push(self.dispatch_next_page());
        PagingUpdate::changed(effects)
    }

    fn get_next_page(&mut self) -> PagingUpdate<E> {
        if !self.has_next_page || self.page_ticket.is_some() {
            return PagingUpdate::none();
        }
        self.background.insert(BackgroundState::GettingNextPage);
        let effect = self.dispatch_next_page();
        PagingUpdate::changed(vec![effect])
    }

    fn get_random_element(&mut self) -> PagingUpdate<E> {
        match self.strategy {
            RandomStrategy::Local => {
                let effects = pick_local(&self.elements, &mut self.rng)
                    .map(|element| vec![PagingEffect::Emit(LibraryEvent::RetrievedRandomElement(element))])
                    .unwrap_or_default();
                PagingUpdate {
                    effects,
                    changed: false,
                }
            }
            RandomStrategy::Remote => {
                // A newer pick supersedes the outstanding one.
                let mut effects = Vec::with_capacity(2);
                if self.random_ticket.take().is_some() {
                    effects.push(PagingEffect::Cancel(FetchSlot::Random));
                }
                let ticket = self.issue_ticket();
                self.random_ticket = Some(ticket);
                self.background.insert(BackgroundState::GettingRandomElement);
                effects.push(PagingEffect::FetchRandom {
                    ticket,
                    filters: self.filters.clone(),
                });
                PagingUpdate::changed(effects)
            }
        }
    }

    fn page_loaded(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<E>, FetchError>,
    ) -> PagingUpdate<E> {
        if self.page_ticket != Some(ticket) {
            trace!(?ticket, "discarding stale page result");
            return PagingUpdate::none();
        }
        self.page_ticket = None;
        self.background.remove(&BackgroundState::GettingNextPage);

        match result {
            Ok(batch) => {
                let fresh = fresh_user_data(&batch);
                self.has_next_page = batch.len() >= self.page_size;
                self.elements.append(batch);
                self.state = LibraryState::Content;

                let effects = if fresh.is_empty() {
                    Vec::new()
                } else {
                    vec![PagingEffect::ShareUserData(fresh)]
                };
                PagingUpdate::changed(effects)
            }
            Err(FetchError::Cancelled) => {
                if self.state == LibraryState::Refreshing {
                    self.state = LibraryState::Content;
                }
                PagingUpdate::changed(Vec::new())
            }
            Err(err) => {
                let error = LibraryError::UnableToGetPage(err.to_string());
                self.state = LibraryState::Error(error.clone());
                PagingUpdate::changed(vec![PagingEffect::Report(error)])
            }
        }
    }

    fn random_loaded(
        &mut self,
        ticket: FetchTicket,
        result: Result<Option<E>, FetchError>,
    ) -> PagingUpdate<E> {
        if self.random_ticket != Some(ticket) {
            trace!(?ticket, "discarding stale random result");
            return PagingUpdate::none();
        }
        self.random_ticket = None;
        self.background.remove(&BackgroundState::GettingRandomElement);

        let effects = match result {
            Ok(Some(element)) => vec![PagingEffect::Emit(LibraryEvent::RetrievedRandomElement(element))],
            Ok(None) | Err(FetchError::Cancelled) => Vec::new(),
            Err(err) => vec![PagingEffect::Report(LibraryError::UnableToGetRandomElement(
                err.to_string(),
            ))],
        };
        PagingUpdate::changed(effects)
    }

    /// Advances the cursor and requests the page it now points at. The
    /// cursor is not rolled back if the fetch fails.
    fn dispatch_next_page(&mut self) -> PagingEffect<E> {
        let page_index = self.current_page.map_or(0, |page| page + 1);
        self.current_page = Some(page_index);

        let ticket = self.issue_ticket();
        self.page_ticket = Some(ticket);

        let exclude_ids = if self.filters.is_random_sort() {
            self.elements.ids()
        } else {
            Vec::new()
        };

        PagingEffect::FetchPage {
            ticket,
            request: PageRequest {
                page_index,
                page_size: self.page_size,
                filters: self.filters.clone(),
                exclude_ids,
            },
        }
    }

    fn cancel_all(&mut self) -> Vec<PagingEffect<E>> {
        let mut effects = Vec::new();
        if self.page_ticket.take().is_some() {
            effects.push(PagingEffect::Cancel(FetchSlot::Page));
        }
        if self.random_ticket.take().is_some() {
            effects.push(PagingEffect::Cancel(FetchSlot::Random));
        }
        effects
    }

    fn issue_ticket(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        FetchTicket(self.next_ticket)
    }
}

fn fresh_user_data<E: Element>(batch: &[E]) -> Vec<UserItemData> {
    batch
        .iter()
        .filter_map(|element| {
            let id = element.element_id()?;
            let mut data = element.user_data()?.clone();
            data.item_id = Some(id.clone());
            Some(data)
        })
        .collect()
}
