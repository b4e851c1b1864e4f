//! The interactive evolution loop.
//!
//! [`EvolutionEngine`] owns the current population, the human-supplied
//! [`Ranking`]s and a bounded backlog of genomes that no ranking covers yet.
//! Each call to [`EvolutionEngine::evolve`] turns rankings into shared fitness,
//! partitions the evaluated genomes into species and breeds a fresh population
//! from them.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{ConfigError, EvolutionConfig};
use crate::distance::CompatibilityConfig;
use crate::error::{EvolveError, MutationError};
use crate::gene::ConnectionGene;
use crate::genome::ShaderGenome;
use crate::innovation::InnovationCounter;
use crate::ranking::Ranking;
use crate::species::Speciation;
use crate::template::TemplateLibrary;

/// Random (source, target) pairs tried by [`EvolutionEngine::add_random_connection`].
const CONNECTION_ATTEMPTS: usize = 10;

/// Random gene picks tried by [`EvolutionEngine::add_random_node`].
const SPLIT_ATTEMPTS: usize = 5;

/// Summary of one [`EvolutionEngine::evolve`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation number, starting at 1.
    pub generation: u64,
    /// Genomes covered by at least one ranking.
    pub evaluated: usize,
    /// Species found among the evaluated genomes.
    pub species: usize,
    /// Offspring admitted into the new population.
    pub admitted: usize,
    /// Offspring thrown away by failed mutations or validation.
    pub discarded: usize,
    /// Oldest backlog genomes evicted to respect `max_backlog`.
    pub evicted: usize,
    /// Backlog size after the generation.
    pub backlog: usize,
}

/// Population-level genetic algorithm driven by human rankings.
pub struct EvolutionEngine<R = ChaCha8Rng> {
    config: EvolutionConfig,
    templates: TemplateLibrary,
    population: Vec<ShaderGenome>,
    rankings: Vec<Ranking>,
    backlog: Vec<ShaderGenome>,
    innovations: InnovationCounter,
    rng: R,
    generation: u64,
}

impl EvolutionEngine<ChaCha8Rng> {
    /// Create an engine with a deterministic `ChaCha8Rng`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn seeded(
        config: EvolutionConfig,
        templates: TemplateLibrary,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(config, templates, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> EvolutionEngine<R> {
    /// Create an engine drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn new(
        config: EvolutionConfig,
        templates: TemplateLibrary,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            templates,
            population: Vec::new(),
            rankings: Vec::new(),
            backlog: Vec::new(),
            innovations: InnovationCounter::new(),
            rng,
            generation: 0,
        })
    }

    /// Continue innovation numbering after `last`, typically the highest
    /// marker used by hand-built seed genomes.
    #[must_use]
    pub fn with_innovations_after(mut self, last: u64) -> Self {
        self.innovations = InnovationCounter::starting_after(last);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// The current population, e.g. for rendering.
    #[must_use]
    pub fn population(&self) -> &[ShaderGenome] {
        &self.population
    }

    /// Genomes waiting for a ranking that overlaps them, fittest first.
    #[must_use]
    pub fn backlog(&self) -> &[ShaderGenome] {
        &self.backlog
    }

    #[must_use]
    pub fn rankings(&self) -> &[Ranking] {
        &self.rankings
    }

    /// Number of completed [`evolve`](Self::evolve) calls.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn innovations(&self) -> &InnovationCounter {
        &self.innovations
    }

    /// Add a genome to the current population.
    pub fn add_genome(&mut self, genome: ShaderGenome) {
        self.population.push(genome);
    }

    /// Record a human ranking.
    ///
    /// Backlog genomes that share fitness with the ranked genome rejoin the
    /// population, and a copy of the ranked genome joins it too.
    pub fn add_ranking(&mut self, genome: impl Into<Arc<ShaderGenome>>, fitness: f64) {
        let ranking = Ranking::new(genome, fitness);

        let compatibility = &self.config.compatibility;
        let (returning, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.backlog)
            .into_iter()
            .partition(|g| compatibility.sharing(g, ranking.genome()) > 0.0);
        log::trace!(
            "ranking {fitness} pulled {} genomes out of the backlog",
            returning.len()
        );
        self.backlog = waiting;
        self.population.extend(returning);
        self.population.push(ranking.genome().clone());

        self.rankings.push(ranking);
    }

    /// Compatibility distance under the configured coefficients.
    #[must_use]
    pub fn distance(&self, a: &ShaderGenome, b: &ShaderGenome) -> f64 {
        self.config.compatibility.distance(a, b)
    }

    /// Fitness sharing under the configured coefficients.
    #[must_use]
    pub fn sharing(&self, a: &ShaderGenome, b: &ShaderGenome) -> f64 {
        self.config.compatibility.sharing(a, b)
    }

    /// Average fitness of the rankings overlapping `genome`, `None` if there are none.
    #[must_use]
    pub fn compute_fitness(&self, genome: &ShaderGenome) -> Option<f64> {
        ranked_fitness(genome, &self.rankings, &self.config.compatibility)
    }

    /// Assign shared fitness to every population genome.
    ///
    /// Every genome's fitness is divided by its niche size, `1 + Σ sharing`
    /// with every other population genome. Evaluated genomes start from their
    /// ranked fitness; genomes no ranking overlaps are flagged unevaluated and
    /// start from their previous fitness, which then orders the backlog.
    pub fn compute_fitnesses(&mut self) {
        let niches =
            niche_fitnesses(&self.population, &self.rankings, &self.config.compatibility);
        for (genome, (ranked, niche)) in self.population.iter_mut().zip(niches) {
            genome.evaluated = ranked.is_some();
            genome.fitness = ranked.unwrap_or(genome.fitness) / niche;
        }
    }

    /// Empty the population: unevaluated genomes go to the backlog, evaluated
    /// ones are returned sorted by descending fitness.
    pub fn split_evaluated(&mut self) -> Vec<ShaderGenome> {
        let (mut evaluated, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.population)
            .into_iter()
            .partition(|g| g.evaluated);
        self.backlog.extend(waiting);
        sort_by_fitness(&mut evaluated);
        evaluated
    }

    /// Partition a fitness-sorted pool into species.
    #[must_use]
    pub fn speciate(&self, pool: &[ShaderGenome]) -> Speciation {
        let compatibility = &self.config.compatibility;
        Speciation::build(pool, self.config.selection_decay, |a, b| {
            compatibility.compatible(a, b)
        })
    }

    /// Recombine two parents, `a` being the fitter one.
    ///
    /// The offspring takes all of `a`'s nodes. Genes are aligned by position
    /// while innovation numbers agree; each matched pair contributes `a`'s gene
    /// with `best_connection_probability`, otherwise `b`'s. From the first
    /// mismatch on, only `a`'s genes are copied.
    pub fn crossover(&mut self, a: &ShaderGenome, b: &ShaderGenome) -> ShaderGenome {
        let mut offspring = ShaderGenome {
            nodes: a.nodes.clone(),
            connections: Vec::with_capacity(a.connections.len()),
            fitness: (a.fitness + b.fitness) * 0.5,
            evaluated: false,
        };

        let matched = a
            .connections
            .iter()
            .zip(&b.connections)
            .take_while(|(ca, cb)| ca.innovation == cb.innovation)
            .count();

        for (ca, cb) in a.connections.iter().zip(&b.connections).take(matched) {
            let inherited = if self.rng.random::<f64>() < self.config.best_connection_probability {
                ca
            } else {
                cb
            };
            offspring.add_connection(inherited.clone());
        }
        offspring
            .connections
            .extend(a.connections[matched..].iter().cloned());

        offspring
    }

    /// Connect `source` to `slot` of `target`, inserting an adapter from the
    /// template library when the types differ.
    ///
    /// A bridge produces two genes sharing `innovation`: `source → entry` with
    /// weight 1 and `exit → target` with `weight`.
    ///
    /// # Errors
    ///
    /// Fails without touching `genome` if an endpoint or slot does not exist
    /// or no template converts between the two types.
    pub fn bridging_connect(
        &mut self,
        genome: &mut ShaderGenome,
        innovation: u64,
        source: usize,
        target: usize,
        slot: usize,
        weight: f64,
    ) -> Result<(), MutationError> {
        let from_type = genome
            .nodes
            .get(source)
            .ok_or(MutationError::MissingNode { node: source })?
            .output_type();
        let to_type = genome
            .nodes
            .get(target)
            .ok_or(MutationError::MissingNode { node: target })?
            .input_types()
            .get(slot)
            .map(String::as_str)
            .ok_or(MutationError::InvalidSlot { node: target, slot })?;

        if from_type == to_type {
            genome.add_connection(ConnectionGene::new(innovation, source, target, slot, weight));
            return Ok(());
        }

        let template = self
            .templates
            .pick_bridging(from_type, to_type, &mut self.rng)
            .ok_or_else(|| MutationError::NoBridgingTemplate {
                from_type: from_type.to_string(),
                to_type: to_type.to_string(),
            })?;

        let bridge = template.generate(genome, innovation);
        genome.add_connection(ConnectionGene::new(
            innovation,
            source,
            bridge.entry,
            bridge.entry_slot,
            1.0,
        ));
        genome.add_connection(ConnectionGene::new(innovation, bridge.exit, target, slot, weight));
        Ok(())
    }

    /// Structural mutation: connect two random nodes.
    ///
    /// Candidate pairs are rejected when they would loop back on themselves,
    /// start at an output node, close a cycle, target a node without inputs,
    /// or duplicate an existing gene.
    ///
    /// # Errors
    ///
    /// [`MutationError::ExhaustedAttempts`] if no candidate is accepted, or the
    /// bridging error for the accepted candidate.
    pub fn add_random_connection(&mut self, genome: &mut ShaderGenome) -> Result<(), MutationError> {
        let node_count = genome.nodes.len();
        if node_count == 0 {
            return Err(MutationError::NoNodes);
        }

        for _ in 0..CONNECTION_ATTEMPTS {
            let source = self.rng.random_range(0..node_count);
            let target = self.rng.random_range(0..node_count);

            if source == target || genome.nodes[source].is_output() {
                continue;
            }
            if genome.reaches(target, source) {
                continue;
            }

            let arity = genome.nodes[target].arity();
            if arity == 0 {
                continue;
            }
            let slot = self.rng.random_range(0..arity);
            if genome.has_connection(source, target, slot) {
                continue;
            }

            let innovation = self.innovations.next_innovation();
            let weight = self.rng.random_range(-1.0..1.0);
            return self.bridging_connect(genome, innovation, source, target, slot, weight);
        }

        Err(MutationError::ExhaustedAttempts {
            attempts: CONNECTION_ATTEMPTS,
        })
    }

    /// Structural mutation: split a random enabled gene with a template.
    ///
    /// The gene is disabled and a template drawn uniformly from the whole
    /// library is spliced between its endpoints; the incoming side gets
    /// weight 1 and the outgoing side keeps the original weight.
    ///
    /// # Errors
    ///
    /// Fails if the genome has no enabled gene to split, the library is empty,
    /// or either side of the splice cannot be bridged.
    pub fn add_random_node(&mut self, genome: &mut ShaderGenome) -> Result<(), MutationError> {
        if genome.connections.is_empty() {
            return Err(MutationError::NoConnections);
        }
        if self.templates.is_empty() {
            return Err(MutationError::EmptyTemplateLibrary);
        }

        let split = (0..SPLIT_ATTEMPTS)
            .map(|_| self.rng.random_range(0..genome.connections.len()))
            .find(|&i| genome.connections[i].enabled)
            .ok_or(MutationError::NoEnabledConnection {
                attempts: SPLIT_ATTEMPTS,
            })?;

        genome.connections[split].enabled = false;
        let ConnectionGene {
            source,
            target,
            slot,
            weight,
            ..
        } = genome.connections[split].clone();

        let innovation = self.innovations.next_innovation();
        let bridge = self
            .templates
            .pick_any(&mut self.rng)
            .ok_or(MutationError::EmptyTemplateLibrary)?
            .generate(genome, innovation);

        self.bridging_connect(genome, innovation, source, bridge.entry, bridge.entry_slot, 1.0)?;
        self.bridging_connect(genome, innovation, bridge.exit, target, slot, weight)
    }

    /// Run one generation.
    ///
    /// Computes shared fitness, moves unevaluated genomes to the backlog and,
    /// if anything was evaluated, breeds a new population of
    /// `population_size` genomes from the evaluated ones.
    ///
    /// # Errors
    ///
    /// [`EvolveError::BreedingStalled`] when `max_breeding_attempts` is set and
    /// breeding exhausts it. Offspring admitted so far stay in the population.
    pub fn evolve(&mut self) -> Result<GenerationReport, EvolveError> {
        self.generation += 1;
        self.compute_fitnesses();

        let pool = self.split_evaluated();
        let evicted = self.trim_backlog();

        let mut report = GenerationReport {
            generation: self.generation,
            evaluated: pool.len(),
            species: 0,
            admitted: 0,
            discarded: 0,
            evicted,
            backlog: self.backlog.len(),
        };

        if pool.is_empty() {
            log::debug!(
                "generation {}: no evaluated genomes, {} waiting in backlog",
                report.generation,
                report.backlog
            );
            return Ok(report);
        }

        let speciation = self.speciate(&pool);
        report.species = speciation.len();

        let mut attempts = 0;
        while self.population.len() < self.config.population_size {
            if let Some(bound) = self.config.max_breeding_attempts {
                if attempts >= bound {
                    log::warn!(
                        "generation {}: breeding stalled after {attempts} attempts ({} admitted)",
                        report.generation,
                        report.admitted
                    );
                    return Err(EvolveError::BreedingStalled {
                        attempts,
                        admitted: report.admitted,
                    });
                }
            }
            attempts += 1;

            match self.breed(&pool, &speciation) {
                Some(offspring) => {
                    self.population.push(offspring);
                    report.admitted += 1;
                }
                None => report.discarded += 1,
            }
        }

        log::debug!(
            "generation {}: {} evaluated in {} species, {} admitted, {} discarded, backlog {}",
            report.generation,
            report.evaluated,
            report.species,
            report.admitted,
            report.discarded,
            report.backlog
        );
        Ok(report)
    }

    /// One breeding attempt; `None` if the offspring had to be discarded.
    fn breed(&mut self, pool: &[ShaderGenome], speciation: &Speciation) -> Option<ShaderGenome> {
        let (first, second) = self.draw_parents(speciation);

        let (fitter, weaker) = if pool[second].fitness > pool[first].fitness {
            (second, first)
        } else {
            (first, second)
        };
        let mut offspring = self.crossover(&pool[fitter], &pool[weaker]);

        if self.rng.random::<f64>() < self.config.new_connection_probability {
            if let Err(err) = self.add_random_connection(&mut offspring) {
                log::trace!("discarding offspring: {err}");
                return None;
            }
        }
        if self.rng.random::<f64>() < self.config.new_node_probability {
            if let Err(err) = self.add_random_node(&mut offspring) {
                log::trace!("discarding offspring: {err}");
                return None;
            }
        }
        if let Err(err) = offspring.check() {
            log::trace!("discarding offspring: {err}");
            return None;
        }

        offspring.mutate_weights(&mut self.rng, &self.config.weight_mutation);
        Some(offspring)
    }

    /// Draw a parent from the whole pool and a mate from its species, or from
    /// a different species with `interspecies_mate_probability`.
    fn draw_parents(&mut self, speciation: &Speciation) -> (usize, usize) {
        let first = *speciation.global.draw(&mut self.rng);
        let own = speciation.species_of(first);

        let mate_species = if speciation.len() > 1
            && self.rng.random::<f64>() < self.config.interspecies_mate_probability
        {
            let other = self.rng.random_range(0..speciation.len() - 1);
            if other >= own {
                other + 1
            } else {
                other
            }
        } else {
            own
        };
        let second = speciation.species[mate_species].draw(&mut self.rng);
        (first, second)
    }

    /// Evict the oldest backlog genomes beyond `max_backlog`, then sort the
    /// rest by descending fitness. Returns the number evicted.
    fn trim_backlog(&mut self) -> usize {
        let excess = self.backlog.len().saturating_sub(self.config.max_backlog);
        self.backlog.drain(..excess);
        sort_by_fitness(&mut self.backlog);
        excess
    }
}

/// Stable sort, fittest first.
fn sort_by_fitness(genomes: &mut [ShaderGenome]) {
    genomes.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

fn ranked_fitness(
    genome: &ShaderGenome,
    rankings: &[Ranking],
    compatibility: &CompatibilityConfig,
) -> Option<f64> {
    let (sum, count) = rankings
        .iter()
        .filter(|r| compatibility.sharing(genome, r.genome()) > 0.0)
        .fold((0.0, 0usize), |(sum, count), r| (sum + r.fitness(), count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Computed against an unmodified population. Per genome: the ranked fitness, if any ranking overlaps it, and its niche
/// size `1 + Σ sharing` over every other population genome.
fn niche_fitnesses(
    population: &[ShaderGenome],
    rankings: &[Ranking],
    compatibility: &CompatibilityConfig,
) -> Vec<(Option<f64>, f64)> {
    let niche = |i: usize| {
        let genome = &population[i];
        let shared: f64 = population
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, other)| compatibility.sharing(genome, other))
            .sum();
        (ranked_fitness(genome, rankings, compatibility), 1.0 + shared)
    };

    #[cfg(feature = "parallel")]
    {
        (0..population.len()).into_par_iter().map(niche).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..population.len()).map(niche).collect()
    }
}
