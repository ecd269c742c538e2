use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Parameters of genome creation, mutation, mating
/// and comparison, shared by a whole population.
///
/// Fields named `*_chance` are probabilities and are
/// expected to lie within `[0.0, 1.0]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Sensor nodes of every genome.
    pub input_count: NonZeroUsize,
    /// Actuator nodes of every genome.
    pub output_count: NonZeroUsize,
    /// Activations hidden nodes draw from when created.
    /// Hidden nodes are [`Sigmoid`] when this is empty.
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType::Sigmoid
    pub activation_types: Vec<ActivationType>,
    /// Activation of each actuator node, by position.
    /// Actuators past the end of the list are [`Sigmoid`].
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType::Sigmoid
    pub output_activation_types: Vec<ActivationType>,
    /// Probability that a newly mated child is mutated.
    pub child_mutation_chance: f32,
    /// Probability that a child takes the mean of its
    /// parents' weights for a shared gene, rather than
    /// one parent's weight picked at random.
    pub mate_by_averaging_chance: f32,
    /// Probability that a child re-expresses a suppressed gene.
    pub suppression_reset_chance: f32,
    /// Probability that each sensor-actuator pair is
    /// connected in a newly created genome.
    pub initial_expression_chance: f32,
    /// Weights are kept within `[-weight_bound, weight_bound]`.
    pub weight_bound: f32,
    /// Probability that a weight mutation draws a new weight.
    pub weight_reset_chance: f32,
    /// Probability that a weight not redrawn is perturbed.
    pub weight_nudge_chance: f32,
    /// Largest perturbation applied by a nudge; should be
    /// smaller than [`weight_bound`](GeneticConfig::weight_bound).
    pub weight_mutation_power: f32,
    /// Probability that a mutating child splits a gene with a new node.
    pub node_addition_mutation_chance: f32,
    /// Probability that a mutating child connects two nodes.
    pub gene_addition_mutation_chance: f32,
    /// Node pairs tried by a gene addition before giving up.
    pub max_gene_addition_mutation_attempts: usize,
    /// Probability that a gene addition may close a loop,
    /// when the genome allows one.
    pub recursion_chance: f32,
    /// Coefficient of excess genes in genetic distance.
    pub excess_gene_factor: f32,
    /// Coefficient of disjoint genes in genetic distance.
    pub disjoint_gene_factor: f32,
    /// Coefficient of the mean weight difference of
    /// shared genes in genetic distance.
    pub common_weight_factor: f32,
}

impl GeneticConfig {
    /// Returns a configuration with every number at 0 (1 for
    /// node counts) and no activation types. Useless to evolve
    /// with on its own; meant as the `..` base of a literal.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat_nn::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     recursion_chance: 1.0,
    ///     child_mutation_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// assert_eq!(config.input_count.get(), 1);
    /// assert_eq!(config.weight_bound, 0.0);
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::MIN,
            output_count: NonZeroUsize::MIN,
            activation_types: vec![],
            output_activation_types: vec![],
            child_mutation_chance: 0.0,
            mate_by_averaging_chance: 0.0,
            suppression_reset_chance: 0.0,
            initial_expression_chance: 0.0,
            weight_bound: 0.0,
            weight_reset_chance: 0.0,
            weight_nudge_chance: 0.0,
            weight_mutation_power: 0.0,
            node_addition_mutation_chance: 0.0,
            gene_addition_mutation_chance: 0.0,
            max_gene_addition_mutation_attempts: 0,
            recursion_chance: 0.0,
            excess_gene_factor: 0.0,
            disjoint_gene_factor: 0.0,
            common_weight_factor: 0.0,
        }
    }
}
