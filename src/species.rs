//! Species partition for niche-protected mating.
//!
//! Genomes are identified by their index in the fitness-sorted breeding pool.
//! Membership is recorded as an explicit pool-index → species-id mapping, so
//! species never hold back-references into genomes.

use rand::Rng;

use crate::genome::ShaderGenome;
use crate::selection::WeightedSelector;

/// Identifier of a species within one [`Speciation`].
pub type SpeciesId = usize;

/// A niche: a representative plus a private selector over its members.
#[derive(Debug, Clone)]
pub struct Species {
    representative: usize,
    selector: WeightedSelector<usize>,
}

impl Species {
    /// Found a species; the representative becomes its first member.
    #[must_use]
    pub fn new(representative: usize, decay: f64) -> Self {
        let mut selector = WeightedSelector::new(decay);
        selector.add(representative);
        Self {
            representative,
            selector,
        }
    }

    /// Pool index of the genome that founded this species.
    #[must_use]
    pub fn representative(&self) -> usize {
        self.representative
    }

    pub fn add(&mut self, member: usize) {
        self.selector.add(member);
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        self.selector.items()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selector.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selector.is_empty()
    }

    /// Draw a member, biased towards earlier (fitter) insertions.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        *self.selector.draw(rng)
    }
}

/// The species set of one generation together with the global selector.
#[derive(Debug, Clone)]
pub struct Speciation {
    /// Species in discovery order.
    pub species: Vec<Species>,
    /// Species of each pool genome, indexed by pool position.
    pub assignment: Vec<SpeciesId>,
    /// Selector over every pool genome.
    pub global: WeightedSelector<usize>,
}

impl Speciation {
    /// Partition a pool sorted by descending fitness.
    ///
    /// Each genome joins the first species (in discovery order) whose
    /// representative is `compatible` with it, otherwise it founds a new one.
    pub fn build<F>(pool: &[ShaderGenome], decay: f64, mut compatible: F) -> Self
    where
        F: FnMut(&ShaderGenome, &ShaderGenome) -> bool,
    {
        let mut species: Vec<Species> = Vec::new();
        let mut assignment = Vec::with_capacity(pool.len());
        let mut global = WeightedSelector::new(decay);

        for (index, genome) in pool.iter().enumerate() {
            global.add(index);

            let found = species
                .iter()
                .position(|s| compatible(genome, &pool[s.representative]));
            let id = match found {
                Some(id) => {
                    species[id].add(index);
                    id
                }
                None => {
                    species.push(Species::new(index, decay));
                    species.len() - 1
                }
            };
            assignment.push(id);
        }

        Self {
            species,
            assignment,
            global,
        }
    }

    /// Species of a pool genome.
    #[must_use]
    pub fn species_of(&self, member: usize) -> SpeciesId {
        self.assignment[member]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
