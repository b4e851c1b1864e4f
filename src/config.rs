//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::distance::CompatibilityConfig;
use crate::genome::WeightMutation;

/// Coefficients driving one [`EvolutionEngine`](crate::EvolutionEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of genomes bred each generation.
    pub population_size: usize,
    /// Probability of inheriting the fitter parent's gene for matching genes.
    pub best_connection_probability: f64,
    /// Probability of drawing the second parent from another species.
    pub interspecies_mate_probability: f64,
    /// Maximum number of unevaluated genomes kept in the backlog; oldest are evicted.
    pub max_backlog: usize,
    /// Probability of an add-connection mutation per offspring.
    pub new_connection_probability: f64,
    /// Probability of an add-node mutation per offspring.
    pub new_node_probability: f64,
    /// Rank decay of the selectors: the n-th fittest genome gets weight `decay^n`.
    pub selection_decay: f64,
    /// Distance and sharing coefficients.
    pub compatibility: CompatibilityConfig,
    /// Weight perturbation applied to every admitted offspring.
    pub weight_mutation: WeightMutation,
    /// Upper bound on breeding attempts per generation. `None` retries forever.
    pub max_breeding_attempts: Option<usize>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 16,
            best_connection_probability: 0.5,
            interspecies_mate_probability: 0.05,
            max_backlog: 100,
            new_connection_probability: 0.1,
            new_node_probability: 0.05,
            selection_decay: 0.9,
            compatibility: CompatibilityConfig::default(),
            weight_mutation: WeightMutation {
                probability: 0.8,
                add_scale: 0.1,
                multiply_scale: 0.2,
                limit: None,
            },
            max_breeding_attempts: None,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("max_breeding_attempts must be at least 1")]
    ZeroAttemptBound,
}

impl EvolutionConfig {
    /// Preset for small, exploratory populations with frequent structural change.
    #[must_use]
    pub fn exploratory(population_size: usize) -> Self {
        Self {
            population_size,
            interspecies_mate_probability: 0.2,
            new_connection_probability: 0.3,
            new_node_probability: 0.2,
            ..Self::default()
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("best_connection_probability", self.best_connection_probability),
            ("interspecies_mate_probability", self.interspecies_mate_probability),
            ("new_connection_probability", self.new_connection_probability),
            ("new_node_probability", self.new_node_probability),
            ("weight_mutation.probability", self.weight_mutation.probability),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        let positives = [
            ("selection_decay", self.selection_decay),
            ("compatibility.threshold", self.compatibility.threshold),
            ("compatibility.exponent", self.compatibility.exponent),
        ];
        for (name, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negatives = [
            ("compatibility.disjoint", self.compatibility.disjoint),
            ("compatibility.excess", self.compatibility.excess),
            ("compatibility.weight", self.compatibility.weight),
            ("weight_mutation.add_scale", self.weight_mutation.add_scale),
            ("weight_mutation.multiply_scale", self.weight_mutation.multiply_scale),
        ];
        for (name, value) in non_negatives {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        if let Some(limit) = self.weight_mutation.limit {
            if !(limit > 0.0) {
                return Err(ConfigError::NotPositive {
                    name: "weight_mutation.limit",
                    value: limit,
                });
            }
        }

        if self.max_breeding_attempts == Some(0) {
            return Err(ConfigError::ZeroAttemptBound);
        }
        Ok(())
    }
}
