use super::{Breeding, SpeciesID};
use crate::{Genome, GenomeKey};

use rand::prelude::{Rng, SliceRandom};

use std::collections::BTreeMap;

/// The members of a species eligible for elitism
/// and mating, best first.
pub(super) struct ParentPool<'a, G> {
    pub(super) species: SpeciesID,
    pub(super) ranked: Vec<&'a G>,
}

/// Auxiliary type for offspring generation.
/// Handles all the tasks of generating a population's
/// offspring according to the specified configs
/// and allotted offspring.
pub(super) struct OffspringFactory<'a, 'b, G: Genome> {
    pools: &'a [ParentPool<'a, G>],
    breeding: &'a mut Breeding<'b, G::Config, G::InnovationHistory>,
    next_key: &'a mut GenomeKey,
}

impl<'a, 'b, G> OffspringFactory<'a, 'b, G>
where
    G: Genome + Clone,
{
    pub(super) fn new(
        pools: &'a [ParentPool<'a, G>],
        breeding: &'a mut Breeding<'b, G::Config, G::InnovationHistory>,
        next_key: &'a mut GenomeKey,
    ) -> OffspringFactory<'a, 'b, G> {
        OffspringFactory {
            pools,
            breeding,
            next_key,
        }
    }

    /// Generate the alloted offspring, one count per pool.
    pub(super) fn generate_offspring(
        &mut self,
        allotted_offspring: &[usize],
    ) -> BTreeMap<GenomeKey, G> {
        let pools = self.pools;
        let mut offspring = BTreeMap::new();
        for (pool_index, allotted) in allotted_offspring.iter().copied().enumerate() {
            let pool = &pools[pool_index];
            let elite = pool
                .ranked
                .len()
                .min(self.breeding.config.elitism)
                .min(allotted);

            Self::add_species_elite(&mut offspring, pool, elite);
            self.add_mated_offspring(&mut offspring, pool_index, allotted - elite);
        }
        offspring
    }

    /// Add the top "elite" members of the species
    /// to the offspring, unchanged.
    fn add_species_elite(
        offspring: &mut BTreeMap<GenomeKey, G>,
        pool: &ParentPool<'_, G>,
        elite: usize,
    ) {
        for genome in &pool.ranked[..elite] {
            offspring.insert(genome.key(), (*genome).clone());
        }
    }

    /// Choose parents from the species' survivors or
    /// from other species and mate them.
    fn add_mated_offspring(
        &mut self,
        offspring: &mut BTreeMap<GenomeKey, G>,
        pool_index: usize,
        count: usize,
    ) {
        let pools = self.pools;
        let pool = &pools[pool_index];
        let survivors = ((pool.ranked.len() as f32 * self.breeding.config.survival_threshold).ceil()
            as usize)
            .max(2)
            .min(pool.ranked.len());
        let eligible_parents = &pool.ranked[..survivors];

        for _ in 0..count {
            let parent1 = *eligible_parents
                .choose(&mut *self.breeding.rng)
                .unwrap_or_else(|| panic!("no eligible parents in species {}", pool.species));
            let parent2 = self.choose_second_parent(pool_index, eligible_parents);
            let key = *self.next_key;
            *self.next_key += 1;
            let child = G::mate(
                key,
                parent1,
                parent2,
                self.breeding.history,
                self.breeding.genetic_config,
                &mut *self.breeding.rng,
            );
            offspring.insert(key, child);
        }
    }

    /// Choose a parent from the current species' survivors,
    /// or from another randomly selected species.
    fn choose_second_parent(&mut self, pool_index: usize, eligible_parents: &[&'a G]) -> &'a G {
        let pools = self.pools;
        let rng = &mut *self.breeding.rng;
        if pools.len() > 1
            && rng.gen::<f32>() < self.breeding.config.interspecies_mating_chance
        {
            let other = loop {
                let candidate = rng.gen_range(0..pools.len());
                if candidate != pool_index {
                    break &pools[candidate];
                }
            };
            if let Some(parent) = other.ranked.choose(rng) {
                return *parent;
            }
        }
        *eligible_parents
            .choose(rng)
            .unwrap_or_else(|| panic!("no eligible parents in species {}", pools[pool_index].species))
    }
}
