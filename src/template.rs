//! Typed bridging templates.
//!
//! When a structural mutation joins two nodes whose types differ, a
//! [`Template`] inserts an adapter subgraph (for example `length(vec3)` to go
//! from `vec3` to `float`). The content of the template library is supplied by
//! the caller; this module only defines the contract and the weighted lookup.

use std::fmt;

use rand::Rng;

use crate::genome::ShaderGenome;
use crate::node::Node;
use crate::selection::WeightedSelector;

/// Attachment points of a subgraph inserted by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bridge {
    /// Node receiving the bridged value.
    pub entry: usize,
    /// Input slot of `entry`.
    pub entry_slot: usize,
    /// Node producing the converted value.
    pub exit: usize,
}

/// Generator of adapter subgraphs from `source_type` to `target_type`.
pub trait Template: Send + Sync {
    /// Relative selection weight among templates bridging the same types.
    fn weight(&self) -> f64;

    /// Type accepted at the bridge entry.
    fn source_type(&self) -> &str;

    /// Type produced at the bridge exit.
    fn target_type(&self) -> &str;

    /// Insert the adapter nodes (and any internal connections, tagged with
    /// `innovation`) into `genome`, returning where to attach them.
    fn generate(&self, genome: &mut ShaderGenome, innovation: u64) -> Bridge;
}

/// A [`Template`] backed by a closure.
pub struct FnTemplate<F> {
    weight: f64,
    source_type: String,
    target_type: String,
    generate: F,
}

impl<F> FnTemplate<F>
where
    F: Fn(&mut ShaderGenome, u64) -> Bridge + Send + Sync,
{
    #[must_use]
    pub fn new(
        weight: f64,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        generate: F,
    ) -> Self {
        Self {
            weight,
            source_type: source_type.into(),
            target_type: target_type.into(),
            generate,
        }
    }
}

impl<F> Template for FnTemplate<F>
where
    F: Fn(&mut ShaderGenome, u64) -> Bridge + Send + Sync,
{
    fn weight(&self) -> f64 {
        self.weight
    }

    fn source_type(&self) -> &str {
        &self.source_type
    }

    fn target_type(&self) -> &str {
        &self.target_type
    }

    fn generate(&self, genome: &mut ShaderGenome, innovation: u64) -> Bridge {
        (self.generate)(genome, innovation)
    }
}

impl<F> fmt::Debug for FnTemplate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTemplate")
            .field("weight", &self.weight)
            .field("source_type", &self.source_type)
            .field("target_type", &self.target_type)
            .finish_non_exhaustive()
    }
}

/// Template inserting a single one-argument function call,
/// e.g. `conversion(1.0, "length", "vec3", "float")`.
#[must_use]
pub fn conversion(
    weight: f64,
    function: impl Into<String>,
    source_type: impl Into<String>,
    target_type: impl Into<String>,
) -> impl Template {
    let function = function.into();
    let source_type = source_type.into();
    let target_type = target_type.into();
    let node = Node::function_call(function, target_type.clone(), [source_type.clone()]);

    FnTemplate::new(weight, source_type, target_type, move |genome: &mut ShaderGenome, _| {
        let index = genome.add_node(node.clone());
        Bridge {
            entry: index,
            entry_slot: 0,
            exit: index,
        }
    })
}

/// The catalog of bridging templates available to structural mutation.
#[derive(Default)]
pub struct TemplateLibrary {
    templates: Vec<Box<dyn Template>>,
}

impl TemplateLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, template: impl Template + 'static) -> Self {
        self.push(template);
        self
    }

    pub fn push(&mut self, template: impl Template + 'static) {
        self.templates.push(Box::new(template));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Template> + '_ {
        self.templates.iter().map(|t| t.as_ref())
    }

    /// Weighted draw among templates converting `source_type` into `target_type`.
    pub fn pick_bridging<R: Rng>(
        &self,
        source_type: &str,
        target_type: &str,
        rng: &mut R,
    ) -> Option<&dyn Template> {
        let mut candidates = WeightedSelector::default();
        for template in self.iter() {
            if template.source_type() == source_type && template.target_type() == target_type {
                candidates.add_weighted(template, template.weight());
            }
        }
        candidates.try_draw(rng).copied()
    }

    /// Uniform draw over the whole library, ignoring types and weights.
    pub fn pick_any<R: Rng>(&self, rng: &mut R) -> Option<&dyn Template> {
        if self.templates.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.templates.len());
        Some(self.templates[index].as_ref())
    }
}

impl fmt::Debug for TemplateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.iter()
                    .map(|t| (t.source_type().to_string(), t.target_type().to_string(), t.weight())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn library() -> TemplateLibrary {
        TemplateLibrary::new()
            .with(conversion(1.0, "length", "vec3", "float"))
            .with(conversion(2.0, "vec3", "float", "vec3"))
    }

    #[test]
    fn test_conversion_inserts_function_call() {
        let template = conversion(1.0, "length", "vec3", "float");
        let mut genome = ShaderGenome::new();
        genome.add_node(Node::output("float"));

        let bridge = template.generate(&mut genome, 5);
        assert_eq!(
            bridge,
            Bridge {
                entry: 1,
                entry_slot: 0,
                exit: 1
            }
        );
        assert_eq!(
            genome.nodes[1],
            Node::function_call("length", "float", ["vec3"])
        );
    }

    #[test]
    fn test_pick_bridging_filters_types() {
        let library = library();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..20 {
            let template = library.pick_bridging("float", "vec3", &mut rng).unwrap();
            assert_eq!(template.source_type(), "float");
            assert_eq!(template.target_type(), "vec3");
        }
        assert!(library.pick_bridging("vec2", "vec3", &mut rng).is_none());
    }

    #[test]
    fn test_pick_any_covers_library() {
        let library = library();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let mut seen = [false; 2];
        for _ in 0..100 {
            let template = library.pick_any(&mut rng).unwrap();
            seen[usize::from(template.source_type() == "float")] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert!(TemplateLibrary::new().pick_any(&mut rng).is_none());
    }

    #[test]
    fn test_fn_template_receives_innovation() {
        let template = FnTemplate::new(1.0, "vec2", "float", |genome: &mut ShaderGenome, innovation| {
            let member = genome.add_node(Node::member("x", "float", "vec2"));
            let scale = genome.add_node(Node::unary_operator("-", "float", "float"));
            genome.add_connection(crate::gene::ConnectionGene::new(innovation, member, scale, 0, 1.0));
            Bridge {
                entry: member,
                entry_slot: 0,
                exit: scale,
            }
        });

        let mut genome = ShaderGenome::new();
        let bridge = template.generate(&mut genome, 11);
        assert_eq!(bridge.exit, 1);
        assert_eq!(genome.connections[0].innovation, 11);
        assert!(genome.validate());
    }
}
