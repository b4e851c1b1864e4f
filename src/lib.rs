//! # Symbios Shader
//!
//! Interactive evolution of typed shader expression graphs, guided by sparse
//! human rankings and protected by NEAT-style speciation.
//!
//! ## Features
//!
//! - **Typed Expression Graphs**: Genomes are connection genes over a flat node
//!   list (inputs, operators, member access, function calls, array indexing)
//!   whose type tags must agree on every edge
//! - **Template Bridging**: Structural mutations that join mismatched types
//!   insert adapter subgraphs drawn from a caller-supplied [`TemplateLibrary`]
//! - **Explicit Fitness Sharing**: A handful of rankings spread their fitness
//!   over every genome within the compatibility threshold
//! - **Deterministic**: All randomness comes from an injected RNG, so a seeded
//!   `ChaCha8Rng` reproduces a run exactly
//!
//! ## Quick Start
//!
//! ```rust
//! use symbios_shader::{
//!     conversion, ConnectionGene, EvolutionConfig, EvolutionEngine, Node, ShaderGenome,
//!     TemplateLibrary,
//! };
//!
//! let templates = TemplateLibrary::new()
//!     .with(conversion(1.0, "length", "vec3", "float"))
//!     .with(conversion(2.0, "vec3", "float", "vec3"));
//!
//! let mut seed = ShaderGenome::new();
//! let out = seed.add_node(Node::output("vec3"));
//! let coord = seed.add_node(Node::input("gl_FragCoord.xyz", "vec3"));
//! seed.add_connection(ConnectionGene::new(0, coord, out, 0, 1.0));
//!
//! let mut engine = EvolutionEngine::seeded(EvolutionConfig::exploratory(8), templates, 42)
//!     .unwrap()
//!     .with_innovations_after(0);
//!
//! // A human liked the seed.
//! engine.add_ranking(seed, 1.0);
//! let report = engine.evolve().unwrap();
//! assert_eq!(report.admitted, 8);
//!
//! for genome in engine.population() {
//!     let body = genome.emit_code();
//!     assert!(!body.is_empty());
//! }
//! ```
//!
//! ## Architecture
//!
//! ### Genes in creation order
//!
//! Connection genes are never re-sorted. Crossover and compatibility distance
//! align two genomes position by position while their innovation numbers
//! agree, so the order genes were created in is part of the genome.
//!
//! ### Backlog
//!
//! Genomes that no ranking overlaps cannot be given a fitness. They wait in a
//! bounded backlog and rejoin the population once a new ranking lands close
//! enough to them.

pub mod config;
pub mod distance;
pub mod emit;
pub mod engine;
pub mod error;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod node;
pub mod ranking;
pub mod selection;
pub mod species;
pub mod template;
pub mod topology;

// Re-exports for convenience
pub use config::{ConfigError, EvolutionConfig};
pub use distance::{CompatibilityConfig, DistanceNormalization, GeneAlignment};
pub use emit::weighted_term;
pub use engine::{EvolutionEngine, GenerationReport};
pub use error::{EvolveError, GenomeError, MutationError};
pub use gene::ConnectionGene;
pub use genome::{ShaderGenome, WeightMutation};
pub use innovation::InnovationCounter;
pub use node::Node;
pub use ranking::Ranking;
pub use selection::WeightedSelector;
pub use species::{Speciation, Species, SpeciesId};
pub use template::{conversion, Bridge, FnTemplate, Template, TemplateLibrary};
pub use topology::GraphTopology;
