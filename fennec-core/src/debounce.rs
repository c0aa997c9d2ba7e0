//! Collapses bursts of filter edits into one refresh.
//!
//! [`Debouncer`] is a plain timer state machine so it can be driven by any
//! clock; [`spawn_filter_debouncer`] wires it to a `watch` channel and a
//! paging session.

use crate::paging::PagingHandle;
use fennec_contracts::element::Element;
use fennec_model::ItemFilterCollection;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Trailing edge debouncer.
///
/// The first observed value is the baseline and never fires. Afterwards the
/// most recent value fires once no new value arrived for `window`, unless it
/// equals the last value that fired (or the baseline).
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    baseline_seen: bool,
    last_fired: Option<T>,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            baseline_seen: false,
            last_fired: None,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a new value. Restarts the quiet period.
    pub fn observe(&mut self, value: T, now: Instant) {
        if !self.baseline_seen {
            self.baseline_seen = true;
            self.last_fired = Some(value);
            return;
        }
        self.pending = Some((value, now + self.window));
    }

    /// When the pending value is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Release the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if self.last_fired.as_ref() == Some(&value) {
            return None;
        }
        self.last_fired = Some(value.clone());
        Some(value)
    }
}

/// Forward settled filter edits to a paging session as `SetFilters` followed
/// by `Refresh`.
///
/// The value held by `filters` at spawn time is treated as already applied.
/// The task ends when the filter sender is dropped or the session closes.
pub fn spawn_filter_debouncer<E: Element>(
    mut filters: watch::Receiver<ItemFilterCollection>,
    handle: PagingHandle<E>,
    window: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(window);
        debouncer.observe(filters.borrow_and_update().clone(), Instant::now());

        loop {
            let changed = match debouncer.deadline() {
                Some(deadline) => tokio::select! {
                    _ = handle.closed() => break,
                    changed = filters.changed() => Some(changed),
                    _ = sleep_until(deadline) => None,
                },
                None => tokio::select! {
                    _ = handle.closed() => break,
                    changed = filters.changed() => Some(changed),
                },
            };

            match changed {
                Some(Ok(())) => {
                    let value = filters.borrow_and_update().clone();
                    trace!("filter edit observed");
                    debouncer.observe(value, Instant::now());
                }
                Some(Err(_)) => break,
                None => {
                    let Some(settled) = debouncer.poll(Instant::now()) else {
                        continue;
                    };
                    debug!(random = settled.is_random_sort(), "filters settled, refreshing");
                    if handle.set_filters(settled).is_err() || handle.refresh().is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn initial_value_never_fires() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.observe(1, start);
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(start + ms(10_000)), None);
    }

    #[test]
    fn rapid_edits_collapse_into_the_last_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.observe(0, start);

        debouncer.observe(1, start + ms(100));
        debouncer.observe(2, start + ms(200));
        debouncer.observe(3, start + ms(300));

        assert_eq!(debouncer.poll(start + ms(700)), None);
        assert_eq!(debouncer.deadline(), Some(start + ms(800)));
        assert_eq!(debouncer.poll(start + ms(800)), Some(3));
        assert_eq!(debouncer.poll(start + ms(2_000)), None);
    }

    #[test]
    fn unchanged_values_are_suppressed() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.observe("a", start);

        // Edit away and back within the window: nothing changed.
        debouncer.observe("b", start + ms(10));
        debouncer.observe("a", start + ms(20));
        assert_eq!(debouncer.poll(start + ms(600)), None);

        debouncer.observe("b", start + ms(700));
        assert_eq!(debouncer.poll(start + ms(1_200)), Some("b"));

        debouncer.observe("b", start + ms(1_300));
        assert_eq!(debouncer.poll(start + ms(1_800)), None);
    }
}
