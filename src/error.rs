//! Error types.

/// Why a genome is not a compilable expression graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenomeError {
    #[error("connection {innovation} references missing node {node}")]
    MissingNode { innovation: u64, node: usize },
    #[error("connection {innovation} targets missing slot {slot} of node {node}")]
    MissingSlot {
        innovation: u64,
        node: usize,
        slot: usize,
    },
    #[error("connection {innovation} feeds {output_type} into a {input_type} slot")]
    TypeMismatch {
        innovation: u64,
        output_type: String,
        input_type: String,
    },
    #[error("connection graph contains a cycle")]
    Cyclic,
}

/// Why a structural mutation could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("no acceptable connection found after {attempts} attempts")]
    ExhaustedAttempts { attempts: usize },
    #[error("no enabled connection found after {attempts} attempts")]
    NoEnabledConnection { attempts: usize },
    #[error("genome has no connections to split")]
    NoConnections,
    #[error("genome has no nodes")]
    NoNodes,
    #[error("template library is empty")]
    EmptyTemplateLibrary,
    #[error("no template bridges {from_type} to {to_type}")]
    NoBridgingTemplate { from_type: String, to_type: String },
    #[error("node {node} does not exist")]
    MissingNode { node: usize },
    #[error("node {node} has no input slot {slot}")]
    InvalidSlot { node: usize, slot: usize },
}

/// Why a generation could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvolveError {
    #[error("breeding stalled after {attempts} attempts with {admitted} offspring admitted")]
    BreedingStalled { attempts: usize, admitted: usize },
}
