//! Connection genes for shader genomes.
//!
//! A [`ConnectionGene`] is one historical-marker edge of the expression graph:
//! it feeds the output of a source node into one input slot of a target node.

use serde::{Deserialize, Serialize};

/// A weighted edge between two nodes of a [`ShaderGenome`](crate::ShaderGenome).
///
/// Genes are identified by their innovation number, which is used to align
/// genes across independently evolved genomes during crossover and
/// compatibility measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    /// Historical marker assigned when the structural mutation happened.
    pub innovation: u64,
    /// Index of the node whose output feeds this connection.
    pub source: usize,
    /// Index of the node receiving the value.
    pub target: usize,
    /// Input slot of the target node.
    pub slot: usize,
    /// Scale applied to the source expression.
    pub weight: f64,
    /// Whether this connection is expressed.
    /// Disabled connections are kept for alignment and still count for cycle checks.
    pub enabled: bool,
}

impl ConnectionGene {
    /// Create a new enabled connection.
    #[must_use]
    pub fn new(innovation: u64, source: usize, target: usize, slot: usize, weight: f64) -> Self {
        Self {
            innovation,
            source,
            target,
            slot,
            weight,
            enabled: true,
        }
    }

    /// Whether this gene joins the same endpoints and slot as another.
    #[inline]
    #[must_use]
    pub fn joins(&self, source: usize, target: usize, slot: usize) -> bool {
        self.source == source && self.target == target && self.slot == slot
    }
}
