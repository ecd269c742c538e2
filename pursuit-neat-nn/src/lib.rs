//! # pursuit-neat-nn
//! A neural network-based implementation of the `pursuit-neat` crate's `Genome` trait.
//!
//! Provides an [`NNGenome`] type usable in `pursuit-neat` `Population`s, and the
//! [`RealTimeNetwork`] phenotype generated from it, which acts as an episode
//! [`Controller`](pursuit_neat::Controller).
//!
//! [`NNGenome`]: crate::genomics::NNGenome
//! [`RealTimeNetwork`]: crate::networks::RealTimeNetwork
//!
//! # Example usage
//! ```
//! use pursuit_neat::{Controller, Genome, InnovationHistory, seeded_rng};
//! use pursuit_neat_nn::{
//!     genomics::{GeneticConfig, History, NNGenome},
//!     networks::RealTimeNetwork,
//! };
//! use std::num::NonZeroUsize;
//!
//! let config = GeneticConfig {
//!     input_count: NonZeroUsize::new(3).unwrap(),
//!     output_count: NonZeroUsize::new(2).unwrap(),
//!     initial_expression_chance: 1.0,
//!     weight_bound: 5.0,
//!     child_mutation_chance: 1.0,
//!     weight_nudge_chance: 0.9,
//!     weight_mutation_power: 2.5,
//!     node_addition_mutation_chance: 0.5,
//!     gene_addition_mutation_chance: 0.5,
//!     max_gene_addition_mutation_attempts: 20,
//!     ..GeneticConfig::zero()
//! };
//! let mut history = History::new(&config);
//! let mut rng = seeded_rng(10);
//!
//! let mut mother = NNGenome::new(0, &config, &mut history, &mut rng);
//! let father = NNGenome::new(1, &config, &mut history, &mut rng);
//! mother.set_fitness(1.0);
//! let child = NNGenome::mate(2, &mother, &father, &mut history, &config, &mut rng);
//!
//! let mut network = RealTimeNetwork::from(&child);
//! let outputs = network.activate(&[0.5, -1.0, 1.0]);
//! assert_eq!(outputs.len(), 2);
//! ```

pub mod genomics;
pub mod networks;

/// Identifier type used to designate historically
/// identical mutations for the purposes of
/// genome comparison and genetic tracking.
pub type Innovation = usize;
