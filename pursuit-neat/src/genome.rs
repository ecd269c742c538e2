use rand::Rng;

/// Unique identifier of a genome within a population's history.
pub type GenomeKey = usize;

/// An interface for genomes that can be used by NEAT.
///
/// The genetic payload (and how it mutates or recombines)
/// is opaque to the population, which only ever reaches it
/// through this trait.
pub trait Genome {
    type Config;
    type InnovationHistory: InnovationHistory<Config = Self::Config>;

    /// Returns a randomized genome identified by `key`.
    fn new<R: Rng + ?Sized>(
        key: GenomeKey,
        config: &Self::Config,
        history: &mut Self::InnovationHistory,
        rng: &mut R,
    ) -> Self;

    /// Returns the genome's identifier.
    fn key(&self) -> GenomeKey;

    /// Returns the genetic distance between two genomes.
    fn genetic_distance(first: &Self, second: &Self, config: &Self::Config) -> f32;

    /// Combines two genomes and returns a "child" genome
    /// identified by `key`.
    fn mate<R: Rng + ?Sized>(
        key: GenomeKey,
        parent1: &Self,
        parent2: &Self,
        history: &mut Self::InnovationHistory,
        config: &Self::Config,
        rng: &mut R,
    ) -> Self;

    /// Returns the genome's fitness value, or `None`
    /// if it hasn't been evaluated yet.
    fn fitness(&self) -> Option<f32>;

    /// Sets the genome's fitness value.
    fn set_fitness(&mut self, fitness: f32);

    /// Marks the genome as not yet evaluated.
    fn clear_fitness(&mut self);

    /// Adds `delta` to the genome's fitness, treating
    /// an unset fitness as 0.
    fn add_fitness(&mut self, delta: f32) {
        let fitness = self.fitness().unwrap_or(0.0);
        self.set_fitness(fitness + delta);
    }
}

/// An Innovation History is used to keep track
/// of genetic innovations throught successive
/// generations of genomes.
///
/// The exact function and utility of the
/// InnovationHistory is left to the implementor.
pub trait InnovationHistory {
    type Config;

    fn new(config: &Self::Config) -> Self;
}
