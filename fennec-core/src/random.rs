//! Where a "surprise me" pick comes from.

use crate::collection::IdentifiedArray;
use fennec_contracts::element::Element;
use rand::Rng;

/// Chosen once per session from the fetcher's capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomStrategy {
    /// Pick uniformly from what is already loaded.
    Local,
    /// Ask the server for one element with the current filters.
    Remote,
}

impl RandomStrategy {
    pub fn for_fetcher(supports_random: bool) -> Self {
        if supports_random {
            RandomStrategy::Remote
        } else {
            RandomStrategy::Local
        }
    }

    pub fn is_remote(self) -> bool {
        matches!(self, RandomStrategy::Remote)
    }
}

pub fn pick_local<E: Element, R: Rng + ?Sized>(
    elements: &IdentifiedArray<E>,
    rng: &mut R,
) -> Option<E> {
    elements.random_element(rng).cloned()
}
