//! Benchmarks for symbios-shader.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use symbios_shader::{
    conversion, CompatibilityConfig, ConnectionGene, EvolutionConfig, EvolutionEngine, Node,
    ShaderGenome, TemplateLibrary, WeightMutation,
};

fn library() -> TemplateLibrary {
    TemplateLibrary::new()
        .with(conversion(1.0, "length", "vec3", "float"))
        .with(conversion(2.0, "vec3", "float", "vec3"))
        .with(conversion(1.0, "sin", "float", "float"))
}

fn seed() -> ShaderGenome {
    let mut genome = ShaderGenome::new();
    let out = genome.add_node(Node::output("vec3"));
    let pos = genome.add_node(Node::input("vPosition", "vec3"));
    genome.add_connection(ConnectionGene::new(0, pos, out, 0, 1.0));
    genome
}

/// A genome grown by a few generations of breeding.
fn grown(seed_value: u64) -> ShaderGenome {
    let mut engine =
        EvolutionEngine::seeded(EvolutionConfig::exploratory(8), library(), seed_value).unwrap();
    engine.add_ranking(seed(), 1.0);
    for _ in 0..10 {
        engine.evolve().unwrap();
        let best = engine
            .population()
            .iter()
            .max_by_key(|g| g.connections.len())
            .cloned()
            .unwrap();
        engine.add_ranking(best, 1.0);
    }
    engine
        .population()
        .iter()
        .max_by_key(|g| g.connections.len())
        .cloned()
        .unwrap()
}

fn bench_evolve(c: &mut Criterion) {
    c.bench_function("evolve_generation_32", |b| {
        let mut engine =
            EvolutionEngine::seeded(EvolutionConfig::exploratory(32), library(), 42).unwrap();
        engine.add_ranking(seed(), 1.0);
        b.iter(|| {
            black_box(engine.evolve().unwrap());
        });
    });
}

fn bench_crossover(c: &mut Criterion) {
    let parent1 = grown(1);
    let parent2 = grown(2);
    let mut engine = EvolutionEngine::seeded(EvolutionConfig::default(), library(), 42).unwrap();

    c.bench_function("genome_crossover", |b| {
        b.iter(|| {
            black_box(engine.crossover(&parent1, &parent2));
        });
    });
}

fn bench_weight_mutation(c: &mut Criterion) {
    let mut genome = grown(3);
    let params = WeightMutation {
        limit: Some(8.0),
        ..WeightMutation::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("genome_weight_mutation", |b| {
        b.iter(|| {
            genome.mutate_weights(&mut rng, &params);
            black_box(&genome);
        });
    });
}

fn bench_emit(c: &mut Criterion) {
    let genome = grown(4);

    c.bench_function("emit_code", |b| {
        b.iter(|| {
            black_box(genome.emit_code());
        });
    });
}

fn bench_compatibility_distance(c: &mut Criterion) {
    let genome1 = grown(5);
    let genome2 = grown(6);
    let config = CompatibilityConfig::default();

    c.bench_function("compatibility_distance", |b| {
        b.iter(|| {
            black_box(config.distance(&genome1, &genome2));
        });
    });
}

criterion_group!(
    benches,
    bench_evolve,
    bench_crossover,
    bench_weight_mutation,
    bench_emit,
    bench_compatibility_distance,
);
criterion_main!(benches);
