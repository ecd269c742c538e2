//! A resumable implementation of NeuroEvolution of Augmenting Topologies,
//! built for training agents in episodic simulations.
//!
//! Genomes are evaluated over several episodes per generation. The
//! [`FitnessReporter`](reporting::FitnessReporter) records what every genome
//! earned in each episode, so evaluation can stop as soon as the fitness
//! ranking settles. Populations, including their random number generator,
//! are periodically saved as compressed checkpoints and can be resumed
//! after a restart.
//!
//! Genomic structure is user-defined via the [`Genome`] trait. A neural
//! network-based genome representation is supplied by the `pursuit-neat-nn`
//! crate.
//!
//! # Example usage: multi-episode evaluation, using `pursuit-neat-nn`
//! ```
//! use pursuit_neat::{
//!     Controller, EpisodeOutcome, EpisodeRunner, EpisodeSchedule, Genome, Population,
//!     PopulationConfig,
//! };
//! use pursuit_neat_nn::{
//!     genomics::{GeneticConfig, NNGenome},
//!     networks::RealTimeNetwork,
//! };
//! use std::num::NonZeroUsize;
//!
//! /// Rewards networks for steering a point towards 0.
//! struct Steering;
//!
//! impl EpisodeRunner<NNGenome> for Steering {
//!     type Controller = RealTimeNetwork;
//!
//!     fn controller_for(&self, genome: &NNGenome) -> RealTimeNetwork {
//!         RealTimeNetwork::from(genome)
//!     }
//!
//!     fn run_episode(
//!         &mut self,
//!         episode: usize,
//!         controllers: &mut [RealTimeNetwork],
//!         genomes: &mut [&mut NNGenome],
//!     ) -> EpisodeOutcome {
//!         for (network, genome) in controllers.iter_mut().zip(genomes.iter_mut()) {
//!             let mut position = episode as f32;
//!             for _ in 0..10 {
//!                 let output = network.activate(&[position])[0];
//!                 position -= output - 0.5;
//!                 genome.add_fitness(1.0 / (1.0 + position.abs()));
//!             }
//!         }
//!         EpisodeOutcome {
//!             steps: 10,
//!             survivors: controllers.len(),
//!         }
//!     }
//! }
//!
//! fn main() {
//!     let genetic_config = GeneticConfig {
//!         input_count: NonZeroUsize::new(1).unwrap(),
//!         output_count: NonZeroUsize::new(1).unwrap(),
//!         weight_bound: 5.0,
//!         weight_nudge_chance: 0.9,
//!         weight_mutation_power: 2.5,
//!         node_addition_mutation_chance: 0.03,
//!         gene_addition_mutation_chance: 0.05,
//!         excess_gene_factor: 1.0,
//!         disjoint_gene_factor: 1.0,
//!         common_weight_factor: 0.4,
//!         ..GeneticConfig::zero()
//!     };
//!     let population_config = PopulationConfig {
//!         size: NonZeroUsize::new(30).unwrap(),
//!         ..PopulationConfig::default()
//!     };
//!
//!     let mut population = <Population<_, _, NNGenome>>::new(population_config, genetic_config);
//!     let schedule = EpisodeSchedule::default();
//!     population
//!         .run(
//!             |population| {
//!                 population.evaluate_episodes(&mut Steering, &schedule);
//!             },
//!             5,
//!         )
//!         .unwrap();
//!
//!     let best = population.reporter().best_genomes(1, true);
//!     println!("Best fitness: {:?}", best[0].fitness());
//! }
//! ```
pub mod checkpoint;
pub mod episodes;
mod genome;
mod populations;
pub mod reporting;
mod rng;
#[cfg(test)]
mod testing;

pub use checkpoint::{CheckpointError, Checkpointer};
pub use episodes::{
    Controller, EarlyStop, EpisodeOutcome, EpisodeRunner, EpisodeSchedule, EvaluationSummary,
    StopReason,
};
pub use genome::*;
pub use populations::*;
pub use rng::*;
