//! Shader genome: a typed expression graph encoded as NEAT-style genes.
//!
//! A [`ShaderGenome`] stores nodes in a flat `Vec` whose indices never change
//! (connection genes and emitted variable names refer to them) and connection
//! genes in creation order. Creation order doubles as the alignment order for
//! crossover and compatibility distance, so genes are never re-sorted.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::gene::ConnectionGene;
use crate::node::Node;
use crate::topology::GraphTopology;

/// Parameters of the heavy-tailed weight perturbation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightMutation {
    /// Probability that a given gene's weight is perturbed.
    pub probability: f64,
    /// Scale of the exponentially distributed additive jump.
    pub add_scale: f64,
    /// Spread of the multiplicative factor: `1 + U * multiply_scale` or its inverse.
    pub multiply_scale: f64,
    /// Clamp weights to `[-limit, limit]` after perturbation. `None` leaves them unbounded.
    pub limit: Option<f64>,
}

impl Default for WeightMutation {
    fn default() -> Self {
        Self {
            probability: 1.0,
            add_scale: 1.0,
            multiply_scale: 1.0,
            limit: None,
        }
    }
}

/// A typed shader expression graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderGenome {
    /// Expression nodes, addressed by stable index.
    pub nodes: Vec<Node>,
    /// Connection genes in creation order.
    pub connections: Vec<ConnectionGene>,
    /// Shared fitness from the latest evaluation.
    #[serde(default)]
    pub fitness: f64,
    /// Whether at least one ranking overlapped this genome during the latest evaluation.
    #[serde(default)]
    pub evaluated: bool,
}

impl ShaderGenome {
    /// Create an empty genome.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index.
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a connection gene. Duplicates are not checked here.
    pub fn add_connection(&mut self, connection: ConnectionGene) {
        self.connections.push(connection);
    }

    /// Whether a path of at least one connection leads from `source` to `target`.
    ///
    /// Follows disabled connections too.
    #[must_use]
    pub fn reaches(&self, source: usize, target: usize) -> bool {
        GraphTopology::from_genome(self).reaches(source, target)
    }

    /// Whether a gene already joins `source` to `slot` of `target`.
    #[must_use]
    pub fn has_connection(&self, source: usize, target: usize, slot: usize) -> bool {
        self.connections.iter().any(|c| c.joins(source, target, slot))
    }

    /// Node indices in dependency order, or `None` if the genes form a cycle.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        GraphTopology::from_genome(self).topological_order()
    }

    /// Check endpoints, slot types and acyclicity, reporting the first violation.
    ///
    /// # Errors
    ///
    /// Returns the [`GenomeError`] describing why the graph cannot be compiled.
    pub fn check(&self) -> Result<(), GenomeError> {
        for conn in &self.connections {
            let source = self.nodes.get(conn.source).ok_or(GenomeError::MissingNode {
                innovation: conn.innovation,
                node: conn.source,
            })?;
            let target = self.nodes.get(conn.target).ok_or(GenomeError::MissingNode {
                innovation: conn.innovation,
                node: conn.target,
            })?;
            let input_type = target
                .input_types()
                .get(conn.slot)
                .ok_or(GenomeError::MissingSlot {
                    innovation: conn.innovation,
                    node: conn.target,
                    slot: conn.slot,
                })?;
            if source.output_type() != input_type.as_str() {
                return Err(GenomeError::TypeMismatch {
                    innovation: conn.innovation,
                    output_type: source.output_type().to_string(),
                    input_type: input_type.clone(),
                });
            }
        }

        if self.topological_order().is_none() {
            return Err(GenomeError::Cyclic);
        }
        Ok(())
    }

    /// Whether the genome is a well-typed acyclic graph.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Perturb connection weights.
    ///
    /// Each selected weight becomes `(w + L) * M` where `L` is a signed,
    /// exponentially distributed jump and `M` scales up or down with equal odds.
    pub fn mutate_weights<R: Rng>(&mut self, rng: &mut R, params: &WeightMutation) {
        for conn in &mut self.connections {
            if rng.random::<f64>() >= params.probability {
                continue;
            }

            let sign = if rng.random::<f64>() < 0.5 { 1.0 } else { -1.0 };
            let jump = sign * -(1.0 - rng.random::<f64>()).ln() * params.add_scale;

            let x = 1.0 + rng.random::<f64>() * params.multiply_scale;
            let factor = if rng.random::<f64>() < 0.5 { x } else { 1.0 / x };

            conn.weight = (conn.weight + jump) * factor;
            if let Some(limit) = params.limit {
                conn.weight = conn.weight.clamp(-limit, limit);
            }
        }
    }

    /// Get the number of enabled connections.
    #[must_use]
    pub fn num_enabled_connections(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn passthrough(value_type: &str) -> ShaderGenome {
        let mut genome = ShaderGenome::new();
        genome.add_node(Node::output(value_type));
        genome.add_node(Node::input("in", value_type));
        genome.add_connection(ConnectionGene::new(0, 1, 0, 0, 2.0));
        genome
    }

    #[test]
    fn test_add_node_returns_stable_index() {
        let mut genome = ShaderGenome::new();
        assert_eq!(genome.add_node(Node::output("vec3")), 0);
        assert_eq!(genome.add_node(Node::input("1.0", "float")), 1);
        assert_eq!(genome.nodes.len(), 2);
    }

    #[test]
    fn test_reaches() {
        let mut genome = ShaderGenome::new();
        genome.add_connection(ConnectionGene::new(0, 3, 5, 2, 0.1));
        genome.add_connection(ConnectionGene::new(0, 5, 7, 1, 0.1));

        assert!(genome.reaches(3, 5));
        assert!(genome.reaches(5, 7));
        assert!(genome.reaches(3, 7));
        assert!(!genome.reaches(7, 3));
        assert!(!genome.reaches(7, 5));
        assert!(!genome.reaches(5, 3));
        assert!(!genome.reaches(2, 3));
        assert!(!genome.reaches(3, 2));
        assert!(!genome.reaches(2, 5));
        assert!(!genome.reaches(5, 2));
    }

    #[test]
    fn test_reaches_follows_disabled_connections() {
        let mut genome = passthrough("vec3");
        genome.connections[0].enabled = false;
        assert!(genome.reaches(1, 0));
    }

    #[test]
    fn test_has_connection() {
        let mut genome = ShaderGenome::new();
        genome.add_connection(ConnectionGene::new(0, 3, 5, 2, 0.1));

        assert!(genome.has_connection(3, 5, 2));
        assert!(!genome.has_connection(3, 5, 1));
        assert!(!genome.has_connection(5, 3, 2));
    }

    #[test]
    fn test_validate_accepts_typed_acyclic_graph() {
        let genome = passthrough("vec3");
        assert!(genome.validate());
        assert_eq!(genome.check(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_type_mismatch() {
        let mut genome = ShaderGenome::new();
        genome.add_node(Node::output("vec3"));
        genome.add_node(Node::input("1.0", "float"));
        genome.add_connection(ConnectionGene::new(4, 1, 0, 0, 1.0));

        assert!(!genome.validate());
        assert!(matches!(
            genome.check(),
            Err(GenomeError::TypeMismatch { innovation: 4, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_node_and_slot() {
        let mut genome = passthrough("vec3");
        genome.add_connection(ConnectionGene::new(1, 1, 8, 0, 1.0));
        assert!(matches!(
            genome.check(),
            Err(GenomeError::MissingNode { node: 8, .. })
        ));

        let mut genome = passthrough("vec3");
        genome.add_connection(ConnectionGene::new(1, 1, 0, 3, 1.0));
        assert!(matches!(
            genome.check(),
            Err(GenomeError::MissingSlot { slot: 3, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_cycle_through_disabled_connection() {
        let mut genome = ShaderGenome::new();
        genome.add_node(Node::function_call("sin", "float", ["float"]));
        genome.add_node(Node::function_call("cos", "float", ["float"]));
        genome.add_connection(ConnectionGene::new(0, 0, 1, 0, 1.0));
        let mut back = ConnectionGene::new(1, 1, 0, 0, 1.0);
        back.enabled = false;
        genome.add_connection(back);

        assert!(!genome.validate());
        assert_eq!(genome.check(), Err(GenomeError::Cyclic));
    }

    #[test]
    fn test_mutate_weights_probability_zero_keeps_weights() {
        let mut genome = ShaderGenome::new();
        genome.add_connection(ConnectionGene::new(0, 3, 5, 2, 0.1));
        let mut rng = test_rng();

        genome.mutate_weights(
            &mut rng,
            &WeightMutation {
                probability: 0.0,
                ..WeightMutation::default()
            },
        );
        assert_eq!(genome.connections[0].weight, 0.1);

        genome.mutate_weights(&mut rng, &WeightMutation::default());
        assert_ne!(genome.connections[0].weight, 0.1);
    }

    #[test]
    fn test_mutate_weights_respects_limit() {
        let mut genome = ShaderGenome::new();
        for i in 0..32 {
            genome.add_connection(ConnectionGene::new(i, 0, 1, 0, 0.5));
        }
        let params = WeightMutation {
            add_scale: 50.0,
            multiply_scale: 4.0,
            limit: Some(2.0),
            ..WeightMutation::default()
        };
        let mut rng = test_rng();

        for _ in 0..10 {
            genome.mutate_weights(&mut rng, &params);
        }
        assert!(genome.connections.iter().all(|c| c.weight.abs() <= 2.0));
    }

    #[test]
    fn test_num_enabled_connections() {
        let mut genome = passthrough("vec3");
        genome.add_connection(ConnectionGene::new(1, 1, 0, 0, 1.0));
        genome.connections[0].enabled = false;

        assert_eq!(genome.num_enabled_connections(), 1);
    }
}
