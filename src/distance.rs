//! Compatibility distance and fitness sharing.
//!
//! Genes are aligned positionally: the matched prefix runs while innovation
//! numbers agree, then a walk from both tails counts excess genes while one
//! side's trailing innovation strictly exceeds the other's. Everything left
//! over is disjoint.

use serde::{Deserialize, Serialize};

use crate::gene::ConnectionGene;
use crate::genome::ShaderGenome;

/// How gene counts and weight differences are scaled in the distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceNormalization {
    /// `c_d * D + c_e * E + c_w * W`.
    #[default]
    Raw,
    /// `c_d * D / N + c_e * E / N + c_w * W / M`, N the longer gene count.
    Normalized,
}

/// Result of aligning two gene sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneAlignment {
    /// Length of the matched prefix.
    pub matching: usize,
    /// Sum of absolute weight differences over the matched prefix.
    pub weight_difference: f64,
    /// Trailing genes found by the tail walk.
    pub excess: usize,
    /// Remaining unmatched genes. Signed: non-monotonic innovation orders can
    /// drive the tail walk into the matched prefix.
    pub disjoint: i64,
    /// Gene count of the longer sequence.
    pub longest: usize,
}

impl GeneAlignment {
    /// Align two gene sequences in creation order.
    #[must_use]
    pub fn align(a: &[ConnectionGene], b: &[ConnectionGene]) -> Self {
        let mut matching = 0;
        let mut weight_difference = 0.0;
        for (ga, gb) in a.iter().zip(b) {
            if ga.innovation != gb.innovation {
                break;
            }
            weight_difference += (ga.weight - gb.weight).abs();
            matching += 1;
        }

        let longest = a.len().max(b.len());
        let mut excess = 0;
        if matching < longest {
            if let (Some(last_a), Some(last_b)) = (a.last(), b.last()) {
                if last_a.innovation > last_b.innovation {
                    excess = count_exceeding(a, last_b.innovation);
                } else {
                    excess = count_exceeding(b, last_a.innovation);
                }
            }
        }

        let disjoint = (a.len() + b.len()) as i64 - 2 * matching as i64 - excess as i64;

        Self {
            matching,
            weight_difference,
            excess,
            disjoint,
            longest,
        }
    }
}

/// Walk `genes` from the tail while innovations exceed `bound`.
fn count_exceeding(genes: &[ConnectionGene], bound: u64) -> usize {
    genes
        .iter()
        .rev()
        .take_while(|g| g.innovation > bound)
        .count()
}

/// Coefficients of the compatibility distance and the sharing kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityConfig {
    /// Coefficient for disjoint genes.
    pub disjoint: f64,
    /// Coefficient for excess genes.
    pub excess: f64,
    /// Coefficient for matched weight differences.
    pub weight: f64,
    /// Distance at which sharing drops to zero.
    pub threshold: f64,
    /// Exponent of the sharing kernel.
    pub exponent: f64,
    pub normalization: DistanceNormalization,
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            disjoint: 200.0,
            excess: 20.0,
            weight: 1.0,
            threshold: 1.0,
            exponent: 1.0,
            normalization: DistanceNormalization::Raw,
        }
    }
}

impl CompatibilityConfig {
    /// Compatibility distance between two genomes.
    #[must_use]
    pub fn distance(&self, a: &ShaderGenome, b: &ShaderGenome) -> f64 {
        let alignment = GeneAlignment::align(&a.connections, &b.connections);
        self.distance_from(&alignment)
    }

    /// Distance from a precomputed alignment.
    #[must_use]
    pub fn distance_from(&self, alignment: &GeneAlignment) -> f64 {
        let disjoint = alignment.disjoint as f64;
        let excess = alignment.excess as f64;
        let weight = alignment.weight_difference;

        match self.normalization {
            DistanceNormalization::Raw => {
                self.disjoint * disjoint + self.excess * excess + self.weight * weight
            }
            DistanceNormalization::Normalized => {
                let per_gene = |count: f64, n: usize| if n == 0 { 0.0 } else { count / n as f64 };
                self.disjoint * per_gene(disjoint, alignment.longest)
                    + self.excess * per_gene(excess, alignment.longest)
                    + self.weight * per_gene(weight, alignment.matching)
            }
        }
    }

    /// Sharing kernel: 1 at distance 0, 0 at or beyond the threshold.
    #[must_use]
    pub fn sharing_from_distance(&self, distance: f64) -> f64 {
        let sharing = 1.0 - (distance / self.threshold).powf(self.exponent);
        if sharing.is_nan() {
            0.0
        } else {
            sharing.max(0.0)
        }
    }

    /// Sharing between two genomes.
    #[must_use]
    pub fn sharing(&self, a: &ShaderGenome, b: &ShaderGenome) -> f64 {
        self.sharing_from_distance(self.distance(a, b))
    }

    /// Whether two genomes share any fitness niche.
    #[must_use]
    pub fn compatible(&self, a: &ShaderGenome, b: &ShaderGenome) -> bool {
        self.sharing(a, b) > 0.0
    }
}
