//! Roulette-wheel selection with geometric rank decay.
//!
//! Items added without an explicit weight receive geometrically decreasing
//! weights (`1, d, d², ...`), so inserting candidates sorted by fitness yields
//! rank-based selection pressure controlled by a single decay coefficient.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cumulative-weight sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedSelector<T> {
    /// Factor applied to the implicit weight after each insertion.
    decay: f64,
    /// Weight multiplier for the next insertion.
    increment: f64,
    /// Sum of all effective weights.
    total: f64,
    items: Vec<T>,
    /// Running totals, parallel to `items`.
    cumulative: Vec<f64>,
}

impl<T> Default for WeightedSelector<T> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<T> WeightedSelector<T> {
    /// Create an empty selector with the given decay coefficient.
    #[must_use]
    pub fn new(decay: f64) -> Self {
        Self {
            decay,
            increment: 1.0,
            total: 0.0,
            items: Vec::new(),
            cumulative: Vec::new(),
        }
    }

    /// Add an item with unit weight, scaled by the current decay.
    pub fn add(&mut self, item: T) {
        self.add_weighted(item, 1.0);
    }

    /// Add an item with an explicit weight, scaled by the current decay.
    pub fn add_weighted(&mut self, item: T, weight: f64) {
        self.total += self.increment * weight;
        self.increment *= self.decay;
        self.items.push(item);
        self.cumulative.push(self.total);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Sum of all effective weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Draw an item, or `None` if the selector is empty.
    ///
    /// Samples `r` in `[0, total)` and returns the first item whose cumulative
    /// weight exceeds it, falling back to the last item.
    pub fn try_draw<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        let last = self.items.len().checked_sub(1)?;
        let r = rng.random::<f64>() * self.total;
        let index = self.cumulative.partition_point(|&sum| sum <= r).min(last);
        self.items.get(index)
    }

    /// Draw an item.
    ///
    /// # Panics
    ///
    /// Panics if the selector is empty. Callers must only draw from populated
    /// selectors.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> &T {
        self.try_draw(rng)
            .expect("cannot draw from an empty WeightedSelector")
    }
}
