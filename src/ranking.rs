//! Human-supplied rankings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::genome::ShaderGenome;

/// A scalar score given to a genome snapshot.
///
/// The snapshot is shared and read-only: the engine keeps a handle to it for
/// as long as the ranking exists, independently of where copies of the genome
/// travel in the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    genome: Arc<ShaderGenome>,
    fitness: f64,
}

impl Ranking {
    #[must_use]
    pub fn new(genome: impl Into<Arc<ShaderGenome>>, fitness: f64) -> Self {
        Self {
            genome: genome.into(),
            fitness,
        }
    }

    /// The ranked genome snapshot.
    #[must_use]
    pub fn genome(&self) -> &ShaderGenome {
        &self.genome
    }

    /// Shared handle to the snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ShaderGenome> {
        Arc::clone(&self.genome)
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}
