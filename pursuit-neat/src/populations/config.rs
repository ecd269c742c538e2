use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Parameters of speciation, reproduction and stagnation.
///
/// Fractions and chances are expected within `[0.0, 1.0]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Genomes per generation.
    pub size: NonZeroUsize,
    /// Seeds the population's random number generator.
    pub seed: u64,
    /// Genomes further apart than this from every species
    /// representative found a new species.
    pub distance_threshold: f32,
    /// Best genomes of each species carried unchanged
    /// into the next generation.
    pub elitism: usize,
    /// Fraction of each species, best first, allowed to parent.
    pub survival_threshold: f32,
    /// Fewest offspring a surviving species is allotted.
    pub min_species_size: usize,
    /// Chance that the second parent comes from another species.
    pub interspecies_mating_chance: f32,
    /// Generations a species may go without improving
    /// its best fitness before being dropped.
    pub stagnation_threshold: NonZeroUsize,
    /// The fittest species exempt from stagnation.
    pub species_elitism: usize,
}

impl PopulationConfig {
    /// Returns a configuration with every number at 0 (1 for
    /// the size and stagnation threshold), to be completed
    /// with struct update syntax.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::PopulationConfig;
    ///
    /// let config = PopulationConfig {
    ///     elitism: 2,
    ///     ..PopulationConfig::zero()
    /// };
    /// assert_eq!(config.size.get(), 1);
    /// assert_eq!(config.seed, 0);
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::MIN,
            seed: 0,
            distance_threshold: 0.0,
            elitism: 0,
            survival_threshold: 0.0,
            min_species_size: 0,
            interspecies_mating_chance: 0.0,
            stagnation_threshold: NonZeroUsize::MIN,
            species_elitism: 0,
        }
    }
}

/// Working values for the pursuit arena; the seed is fixed
/// so that fresh runs repeat.
impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            size: NonZeroUsize::new(50).unwrap_or(NonZeroUsize::MIN),
            seed: 10,
            distance_threshold: 3.0,
            elitism: 2,
            survival_threshold: 0.2,
            min_species_size: 2,
            interspecies_mating_chance: 0.001,
            stagnation_threshold: NonZeroUsize::new(15).unwrap_or(NonZeroUsize::MIN),
            species_elitism: 2,
        }
    }
}
