//! Interactive breeding with a scripted "user".
//!
//! A real front end renders every genome and lets a person score the ones
//! they like. Here the person is replaced by a function that prefers shaders
//! which use many distinct nodes, ranking a few candidates per generation.
//!
//! Run with: `cargo run --example breed`

use symbios_shader::{
    conversion, Bridge, ConnectionGene, EvolutionConfig, EvolutionEngine, FnTemplate, Node,
    ShaderGenome, TemplateLibrary,
};

fn templates() -> TemplateLibrary {
    TemplateLibrary::new()
        .with(conversion(1.0, "length", "vec2", "float"))
        .with(conversion(1.0, "length", "vec3", "float"))
        .with(conversion(2.0, "vec3", "float", "vec3"))
        .with(conversion(1.0, "sin", "float", "float"))
        .with(conversion(1.0, "fract", "vec3", "vec3"))
        .with(FnTemplate::new(
            1.0,
            "vec3",
            "float",
            |genome: &mut ShaderGenome, _| {
                let channel = genome.add_node(Node::member("x", "float", "vec3"));
                Bridge {
                    entry: channel,
                    entry_slot: 0,
                    exit: channel,
                }
            },
        ))
}

fn seed() -> ShaderGenome {
    let mut genome = ShaderGenome::new();
    let out = genome.add_node(Node::output("vec3"));
    let uv = genome.add_node(Node::input("vUv", "vec2"));
    let time = genome.add_node(Node::input("uTime", "float"));
    let color = genome.add_node(Node::function_call("vec3", "vec3", ["vec2", "float"]));
    genome.add_connection(ConnectionGene::new(0, uv, color, 0, 1.0));
    genome.add_connection(ConnectionGene::new(1, time, color, 1, 1.0));
    genome.add_connection(ConnectionGene::new(2, color, out, 0, 1.0));
    genome
}

/// Stand-in for a human judgement.
fn taste(genome: &ShaderGenome) -> f64 {
    genome.num_enabled_connections() as f64 + 0.1 * genome.nodes.len() as f64
}

fn main() {
    println!("Shader Breeding Example");
    println!("=======================\n");

    let config = EvolutionConfig {
        max_breeding_attempts: Some(50_000),
        ..EvolutionConfig::exploratory(12)
    };
    let mut engine = match EvolutionEngine::seeded(config, templates(), 2024) {
        Ok(engine) => engine.with_innovations_after(2),
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return;
        }
    };

    engine.add_ranking(seed(), taste(&seed()));

    for _ in 0..15 {
        let report = match engine.evolve() {
            Ok(report) => report,
            Err(err) => {
                eprintln!("{err}");
                return;
            }
        };
        println!(
            "Generation {:2}: evaluated {:2}, species {:2}, discarded {:3}, backlog {:2}",
            report.generation, report.evaluated, report.species, report.discarded, report.backlog
        );

        let mut candidates: Vec<ShaderGenome> = engine.population().to_vec();
        candidates.sort_by(|a, b| taste(b).total_cmp(&taste(a)));
        for favourite in candidates.into_iter().take(2) {
            let score = taste(&favourite);
            engine.add_ranking(favourite, score);
        }
    }

    if let Some(best) = engine
        .population()
        .iter()
        .max_by(|a, b| taste(a).total_cmp(&taste(b)))
    {
        println!("\nFavourite shader ({} nodes):", best.nodes.len());
        for line in best.emit_code() {
            println!("    {line}");
        }
    }
}
