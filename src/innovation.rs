//! Innovation numbering.
//!
//! Every structural mutation performed by the engine draws a fresh innovation
//! number from a single counter. All genes created by the same mutation (the
//! direct connection, or both sides of a bridge) share that number, which is
//! what crossover and compatibility distance later align on.

use serde::{Deserialize, Serialize};

/// Monotonically increasing source of innovation numbers.
///
/// The first issued number is `1`; `0` is left to hand-built seed genomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnovationCounter {
    last: u64,
}

impl InnovationCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume numbering after `last`, e.g. above the markers of seed genomes.
    #[must_use]
    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }

    /// Issue the next innovation number.
    #[inline]
    pub fn next_innovation(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// The most recently issued number, `0` if none.
    #[inline]
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last
    }
}
