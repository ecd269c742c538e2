use super::offspring_factory::{OffspringFactory, ParentPool};
use super::{PopulationConfig, SpeciesID, SpeciesSet};
use crate::{EvolutionRng, Genome, GenomeKey};

use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};

/// Everything reproduction may read or advance
/// besides the species and their genomes.
pub struct Breeding<'a, C, H> {
    pub config: &'a PopulationConfig,
    pub genetic_config: &'a C,
    pub history: &'a mut H,
    pub rng: &'a mut EvolutionRng,
}

/// The reproduction subsystem of a population.
///
/// Implementations decide which species survive a generation
/// and produce the genomes of the next one.
pub trait Reproduction<G: Genome> {
    /// Returns `count` brand-new randomized genomes.
    fn create_new(
        &mut self,
        breeding: &mut Breeding<'_, G::Config, G::InnovationHistory>,
        count: usize,
    ) -> BTreeMap<GenomeKey, G>;

    /// Derives the next generation from the evaluated `genomes`
    /// and their partition into `species`.
    ///
    /// Species that don't survive must be removed from `species`;
    /// leaving it empty signals complete extinction. Surviving
    /// species keep their identity; their members are reassigned
    /// by the next speciation.
    fn reproduce(
        &mut self,
        breeding: &mut Breeding<'_, G::Config, G::InnovationHistory>,
        species: &mut SpeciesSet<G>,
        genomes: &BTreeMap<GenomeKey, G>,
        generation: usize,
    ) -> BTreeMap<GenomeKey, G>;
}

/// Stagnation culling, adjusted-fitness proportional offspring
/// allotment, elitism and survival-threshold mating.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DefaultReproduction {
    next_key: GenomeKey,
}

impl DefaultReproduction {
    /// Updates every species' fitness record and removes the
    /// stagnated ones, except for the `species_elitism` best.
    fn cull_stagnated<G: Genome + Clone>(
        species: &mut SpeciesSet<G>,
        genomes: &BTreeMap<GenomeKey, G>,
        config: &PopulationConfig,
        generation: usize,
    ) {
        for s in species.iter_mut() {
            let fitness = s
                .members()
                .map(|key| member_fitness(genomes, key))
                .fold(f32::NEG_INFINITY, f32::max);
            s.record_fitness(fitness, generation);
        }

        let mut ranked: Vec<(SpeciesID, f32, usize)> = species
            .iter()
            .map(|s| {
                (
                    s.id(),
                    s.fitness().unwrap_or(f32::NEG_INFINITY),
                    s.time_stagnated(generation),
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let stagnated: BTreeSet<SpeciesID> = ranked
            .iter()
            .skip(config.species_elitism)
            .filter(|(_, _, stagnation)| *stagnation >= config.stagnation_threshold.get())
            .map(|(id, ..)| *id)
            .collect();
        for id in &stagnated {
            log::info!("species {} removed after stagnating", id);
        }
        species.retain(|s| !stagnated.contains(&s.id()));
    }

    /// Sets each species' adjusted fitness: its mean member
    /// fitness, normalized to the population's fitness range.
    fn adjust_fitness<G: Genome + Clone>(species: &mut SpeciesSet<G>, genomes: &BTreeMap<GenomeKey, G>) -> Vec<f32> {
        let all: Vec<f32> = species
            .iter()
            .flat_map(|s| s.members())
            .map(|key| member_fitness(genomes, key))
            .collect();
        let min = all.iter().copied().fold(f32::INFINITY, f32::min);
        let max = all.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = (max - min).max(1.0);

        species
            .iter_mut()
            .map(|s| {
                let mean = s.members().map(|key| member_fitness(genomes, key)).sum::<f32>()
                    / s.size().max(1) as f32;
                let adjusted = (mean - min) / range;
                s.adjusted_fitness = Some(adjusted);
                adjusted
            })
            .collect()
    }
}

impl<G> Reproduction<G> for DefaultReproduction
where
    G: Genome + Clone,
{
    fn create_new(
        &mut self,
        breeding: &mut Breeding<'_, G::Config, G::InnovationHistory>,
        count: usize,
    ) -> BTreeMap<GenomeKey, G> {
        (0..count)
            .map(|_| {
                let key = self.next_key;
                self.next_key += 1;
                let genome = G::new(key, breeding.genetic_config, breeding.history, breeding.rng);
                (key, genome)
            })
            .collect()
    }

    fn reproduce(
        &mut self,
        breeding: &mut Breeding<'_, G::Config, G::InnovationHistory>,
        species: &mut SpeciesSet<G>,
        genomes: &BTreeMap<GenomeKey, G>,
        generation: usize,
    ) -> BTreeMap<GenomeKey, G> {
        Self::cull_stagnated(species, genomes, breeding.config, generation);
        if species.is_empty() {
            return BTreeMap::new();
        }

        let adjusted_fitnesses = Self::adjust_fitness(species, genomes);
        let allotted = allot_offspring(&adjusted_fitnesses, breeding.config);

        let pools: Vec<ParentPool<'_, G>> = species
            .iter()
            .map(|s| {
                let mut ranked: Vec<&G> = s.members().filter_map(|key| genomes.get(&key)).collect();
                ranked.sort_by(|g1, g2| fitness_of(*g2).total_cmp(&fitness_of(*g1)));
                ParentPool {
                    species: s.id(),
                    ranked,
                }
            })
            .collect();

        OffspringFactory::new(&pools, breeding, &mut self.next_key).generate_offspring(&allotted)
    }
}

fn fitness_of<G: Genome>(genome: &G) -> f32 {
    genome.fitness().unwrap_or(f32::NEG_INFINITY)
}

fn member_fitness<G: Genome>(genomes: &BTreeMap<GenomeKey, G>, key: GenomeKey) -> f32 {
    genomes.get(&key).and_then(Genome::fitness).unwrap_or(0.0)
}

/// Splits the population size among species proportionally
/// to their adjusted fitnesses (equally if all are 0), with
/// every species receiving at least `min_species_size` and
/// enough room for its elite.
///
/// Allotments always sum to the population size: whatever
/// the minimums add is taken back from the largest allotments,
/// and only once all are at the minimum does any fall below it.
fn allot_offspring(adjusted_fitnesses: &[f32], config: &PopulationConfig) -> Vec<usize> {
    let size = config.size.get() as f32;
    let fitness_sum: f32 = adjusted_fitnesses.iter().sum();
    let shares: Vec<f32> = if fitness_sum > 0.0 {
        adjusted_fitnesses
            .iter()
            .map(|f| f / fitness_sum * size)
            .collect()
    } else {
        vec![size / adjusted_fitnesses.len() as f32; adjusted_fitnesses.len()]
    };
    let floor = config.min_species_size.max(config.elitism);
    let mut allotted: Vec<usize> = round_retain_sum(&shares)
        .into_iter()
        .map(|n| n.max(floor))
        .collect();

    let mut surplus = allotted
        .iter()
        .sum::<usize>()
        .saturating_sub(config.size.get());
    while surplus > 0 {
        let largest = |above: usize| {
            allotted
                .iter()
                .enumerate()
                .filter(|(_, n)| **n > above)
                .max_by_key(|(_, n)| **n)
                .map(|(i, _)| i)
        };
        match largest(floor).or_else(|| largest(0)) {
            Some(i) => {
                allotted[i] -= 1;
                surplus -= 1;
            }
            None => break,
        }
    }
    allotted
}

/// Rounds all values to positive whole numbers
/// while preserving their order and sum, assuming it is also whole.
/// Rounding is done in the manner that minimizes
/// the average error to the original set of values.
fn round_retain_sum(values: &[f32]) -> Vec<usize> {
    let total_sum = values.iter().sum::<f32>().round() as usize;
    let mut truncated: Vec<(usize, usize, f32)> = values
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let u = f.floor();
            let e = f - u;
            (i, u as usize, e)
        })
        .collect();
    let truncated_sum: usize = truncated.iter().map(|(_, u, _)| *u).sum();
    let remainder = total_sum.saturating_sub(truncated_sum).min(truncated.len());
    // Sort in decreasing order of error
    truncated.sort_by(|a, b| b.2.total_cmp(&a.2));
    for (_, u, _) in &mut truncated[..remainder] {
        *u += 1;
    }
    truncated.sort_by_key(|(i, ..)| *i);
    truncated.iter().map(|(_, u, _)| *u).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{evaluated, NoHistory, ScalarGenome};
    use crate::seeded_rng;

    use std::num::NonZeroUsize;

    #[test]
    fn round_retain_sum() {
        let v = [5.2, 9.5, 2.8, 1.3, 2.2, 2.7, 6.3, 1.0000000000001, 0.9999999999999];
        let w = super::round_retain_sum(&v);
        assert_eq!(v.iter().sum::<f32>(), w.iter().sum::<usize>() as f32);
        assert_eq!(w, [5, 10, 3, 1, 2, 3, 6, 1, 1]);
    }

    #[test]
    fn allot_offspring_falls_back_to_equal_shares() {
        let config = PopulationConfig {
            size: NonZeroUsize::new(9).unwrap(),
            ..PopulationConfig::zero()
        };
        assert_eq!(allot_offspring(&[0.0, 0.0, 0.0], &config), [3, 3, 3]);
        assert_eq!(allot_offspring(&[1.0, 2.0], &config), [3, 6]);
    }

    #[test]
    fn allot_offspring_minimums_keep_size() {
        let config = PopulationConfig {
            size: NonZeroUsize::new(10).unwrap(),
            min_species_size: 2,
            elitism: 1,
            ..PopulationConfig::zero()
        };
        // The minimums are taken back from the best species.
        assert_eq!(allot_offspring(&[0.0, 0.0, 1.0], &config), [2, 2, 6]);
        assert_eq!(allot_offspring(&[0.1, 0.0, 0.9], &config), [2, 2, 6]);

        // More species than the minimums leave room for.
        let config = PopulationConfig {
            size: NonZeroUsize::new(4).unwrap(),
            ..config
        };
        let allotted = allot_offspring(&[1.0; 6], &config);
        assert_eq!(allotted.iter().sum::<usize>(), 4);
        assert!(allotted.iter().all(|n| *n <= 2));
    }

    fn population_of(fitnesses: &[f32]) -> BTreeMap<GenomeKey, ScalarGenome> {
        evaluated(fitnesses).into_iter().map(|g| (g.key, g)).collect()
    }

    #[test]
    fn reproduce_keeps_size_and_elite() {
        let config = PopulationConfig {
            size: NonZeroUsize::new(6).unwrap(),
            distance_threshold: 10.0,
            elitism: 1,
            survival_threshold: 0.5,
            stagnation_threshold: NonZeroUsize::new(5).unwrap(),
            ..PopulationConfig::zero()
        };
        let genomes = population_of(&[1.0, 5.0, 3.0, 2.0, 0.0, 4.0]);
        let mut species = SpeciesSet::new();
        species.speciate(&genomes, config.distance_threshold, &(), 1);

        let mut rng = seeded_rng(3);
        let mut history = NoHistory;
        let mut breeding = Breeding {
            config: &config,
            genetic_config: &(),
            history: &mut history,
            rng: &mut rng,
        };
        let mut reproduction = DefaultReproduction { next_key: 6 };
        let next = reproduction.reproduce(&mut breeding, &mut species, &genomes, 1);

        assert_eq!(next.len(), 6);
        // The champion survives unchanged, under its own key.
        assert_eq!(next[&1], genomes[&1]);
        assert!(next.keys().filter(|k| **k != 1).all(|k| *k >= 6));
        assert_eq!(species.len(), 1);
        let survivor = species.iter().next().unwrap();
        assert_eq!(survivor.fitness(), Some(5.0));
        // Normalized to the population's fitness range.
        assert_eq!(survivor.adjusted_fitness(), Some(0.5));
    }

    #[test]
    fn reproduce_removes_stagnated_species() {
        let config = PopulationConfig {
            size: NonZeroUsize::new(2).unwrap(),
            distance_threshold: 0.5,
            stagnation_threshold: NonZeroUsize::new(1).unwrap(),
            species_elitism: 0,
            ..PopulationConfig::zero()
        };
        let genomes = population_of(&[1.0, 1.0]);
        let mut species = SpeciesSet::new();
        species.speciate(&genomes, config.distance_threshold, &(), 1);

        let mut rng = seeded_rng(3);
        let mut history = NoHistory;
        let mut breeding = Breeding {
            config: &config,
            genetic_config: &(),
            history: &mut history,
            rng: &mut rng,
        };
        let mut reproduction = DefaultReproduction::default();
        // First record sets the species' best; the second doesn't improve on it.
        let _ = Reproduction::<ScalarGenome>::reproduce(&mut reproduction, &mut breeding, &mut species, &genomes, 1);
        species.speciate(&genomes, config.distance_threshold, &(), 2);
        let next = reproduction.reproduce(&mut breeding, &mut species, &genomes, 2);

        assert!(next.is_empty());
        assert!(species.is_empty());
    }
}
