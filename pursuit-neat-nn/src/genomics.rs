//! Genomes are the focus of evolution in NEAT.
//! They are a collection of genes and nodes that can be instantiated
//! as a phenotype (a neural network). Genomes can be progressively mutated,
//! thus adding complexity and functionality.

mod config;
mod errors;
mod genes;
mod history;
mod nodes;

pub use config::GeneticConfig;
pub use errors::{
    GeneAdditionMutationError, GeneValidityError, NodeAdditionMutationError, NodeValidityError,
};
pub use genes::Gene;
pub use history::History;
pub use nodes::{ActivationType, Node, NodeType};

use crate::Innovation;

use pursuit_neat::{Genome, GenomeKey};
use rand::prelude::{IteratorRandom, Rng, SliceRandom};
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A neural network genome: a mutable collection
/// of genes and nodes.
///
/// Genes and nodes are kept in innovation order, so that
/// a given random number generator state always produces
/// the same mutations and offspring.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NNGenome {
    key: GenomeKey,
    genes: BTreeMap<Innovation, Gene>,
    nodes: BTreeMap<Innovation, Node>,
    node_pairings: BTreeSet<(Innovation, Innovation)>,
    fitness: Option<f32>,
}

impl Genome for NNGenome {
    type Config = GeneticConfig;
    type InnovationHistory = History;

    /// Creates a new genome with the specified configuration.
    ///
    /// Initially generated genes are given the innovation number
    /// `o + i ⨯ output_count`, where `i` is the innovation number
    /// of their input node and `o` is the index of their output node.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::genomics::{GeneticConfig, History, NNGenome, NodeType};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let genome = NNGenome::new(7, &config, &mut History::new(&config), &mut seeded_rng(10));
    ///
    /// assert_eq!(genome.key(), 7);
    /// assert_eq!(genome.fitness(), None);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Sensor).count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Actuator).count(), 2);
    ///
    /// // With an initial_expression_chance of 1, every sensor is connected to every actuator.
    /// assert_eq!(genome.genes().count(), 3 * 2);
    /// assert!(genome.genes().all(|g| g.weight().abs() <= config.weight_bound));
    /// assert!(genome.genes().all(|g| (0..3 * 2).contains(&g.innovation())));
    /// ```
    fn new<R: Rng + ?Sized>(
        key: GenomeKey,
        config: &GeneticConfig,
        _history: &mut History,
        rng: &mut R,
    ) -> NNGenome {
        let mut genome = NNGenome {
            key,
            genes: BTreeMap::new(),
            nodes: Self::generate_nodes(config),
            node_pairings: BTreeSet::new(),
            fitness: None,
        };
        genome.generate_initial_genes(config, rng);
        genome
    }

    fn key(&self) -> GenomeKey {
        self.key
    }

    /// Calculates the _genetic distance_ between two genomes,
    /// weighting disjoint genes, excess genes and the average
    /// weight difference of common genes as specified in `config`.
    ///
    /// Genes missing from one genome are _disjoint_ if their
    /// innovation number is below the highest common innovation,
    /// and _excess_ otherwise.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::genomics::{ActivationType, GeneticConfig, History, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// const EXCESS_FACTOR: f32 = 1.5;
    /// const DISJOINT_FACTOR: f32 = 0.5;
    /// const WEIGHT_FACTOR: f32 = 0.25;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(2).unwrap(),
    ///     output_count: NonZeroUsize::new(1).unwrap(),
    ///     excess_gene_factor: EXCESS_FACTOR,
    ///     disjoint_gene_factor: DISJOINT_FACTOR,
    ///     common_weight_factor: WEIGHT_FACTOR,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut rng = seeded_rng(10);
    ///
    /// let mut genome1 = NNGenome::new(0, &config, &mut history, &mut rng);
    /// let mut genome2 = NNGenome::new(1, &config, &mut history, &mut rng);
    /// genome1.add_node(3, ActivationType::Sigmoid).unwrap();
    /// genome2.add_node(3, ActivationType::Sigmoid).unwrap();
    ///
    /// // Common gene, weight difference of 2.0.
    /// genome1.add_gene(0, 0, 2, 1.0).unwrap();
    /// genome2.add_gene(0, 0, 2, -1.0).unwrap();
    /// // Disjoint genes.
    /// genome1.add_gene(1, 1, 2, 3.0).unwrap();
    /// genome2.add_gene(2, 1, 3, 1.0).unwrap();
    /// // Common gene, weight difference of 0.0.
    /// genome1.add_gene(3, 2, 3, 1.0).unwrap();
    /// genome2.add_gene(3, 2, 3, 1.0).unwrap();
    /// // Excess gene.
    /// genome1.add_gene(4, 2, 2, 3.0).unwrap();
    ///
    /// assert_eq!(
    ///     NNGenome::genetic_distance(&genome1, &genome2, &config),
    ///     DISJOINT_FACTOR * 2.0 + EXCESS_FACTOR * 1.0 + WEIGHT_FACTOR * (2.0 + 0.0) / 2.0
    /// );
    /// ```
    fn genetic_distance(first: &NNGenome, second: &NNGenome, config: &GeneticConfig) -> f32 {
        let common_weight_pairs: Vec<(f32, f32)> = first
            .genes
            .iter()
            .filter_map(|(id, gene)| second.genes.get(id).map(|other| (gene.weight(), other.weight())))
            .collect();
        let common_innovation_max = first
            .genes
            .keys()
            .filter(|id| second.genes.contains_key(*id))
            .max()
            .copied();

        let disjoint_count = first.count_disjoint_genes(second, common_innovation_max)
            + second.count_disjoint_genes(first, common_innovation_max);
        let noncommon_count =
            first.genes.len() + second.genes.len() - 2 * common_weight_pairs.len();
        let excess_count = noncommon_count - disjoint_count;

        config.disjoint_gene_factor * disjoint_count as f32
            + config.excess_gene_factor * excess_count as f32
            + config.common_weight_factor * Self::weight_diff_average(&common_weight_pairs)
    }

    /// Combines two genomes and returns their _child_ genome.
    ///
    /// The child inherits the structure of the fitter parent, and
    /// common genes take their weights from either parent. Parents
    /// of equal fitness both contribute their structure. Depending
    /// on [`child_mutation_chance`], the child may then undergo
    /// mutations.
    ///
    /// [`child_mutation_chance`]: GeneticConfig::child_mutation_chance
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::genomics::{GeneticConfig, History, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut rng = seeded_rng(10);
    ///
    /// let parent = NNGenome::new(0, &config, &mut history, &mut rng);
    ///
    /// // A genome can be mated with itself, which implies asexual reproduction.
    /// let child = NNGenome::mate(1, &parent, &parent, &mut history, &config, &mut rng);
    /// assert_eq!(child.key(), 1);
    /// assert!(child.genes().eq(parent.genes()));
    /// ```
    fn mate<R: Rng + ?Sized>(
        key: GenomeKey,
        parent1: &NNGenome,
        parent2: &NNGenome,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> NNGenome {
        let (fitter, other) = if rank(parent2).total_cmp(&rank(parent1)).is_gt() {
            (parent2, parent1)
        } else {
            (parent1, parent2)
        };

        let mut child = fitter.clone();
        child.combine(other, config, rng);
        child.key = key;
        child.fitness = None;

        if rng.gen::<f32>() < config.child_mutation_chance {
            child.mutate_all(history, config, rng);
        }
        child.reset_suppresseds(config, rng);

        child
    }

    fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    /// # Panics
    ///
    /// Panics if `fitness` is NaN.
    fn set_fitness(&mut self, fitness: f32) {
        assert!(!fitness.is_nan(), "genome {} was assigned a NaN fitness", self.key);
        self.fitness = Some(fitness);
    }

    fn clear_fitness(&mut self) {
        self.fitness = None;
    }
}

/// Unevaluated genomes rank below every evaluated one.
fn rank(genome: &NNGenome) -> f32 {
    genome.fitness.unwrap_or(f32::NEG_INFINITY)
}

impl NNGenome {
    fn generate_nodes(config: &GeneticConfig) -> BTreeMap<Innovation, Node> {
        let input_count = config.input_count.get();
        let output_count = config.output_count.get();

        let sensors =
            (0..input_count).map(|i| Node::new(i, NodeType::Sensor, ActivationType::Identity));
        let actuators = (0..output_count).map(|o| {
            let activation = config
                .output_activation_types
                .get(o)
                .copied()
                .unwrap_or(ActivationType::Sigmoid);
            Node::new(o + input_count, NodeType::Actuator, activation)
        });

        sensors
            .chain(actuators)
            .map(|node| (node.innovation(), node))
            .collect()
    }

    fn generate_initial_genes<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        let input_count = config.input_count.get();
        let output_count = config.output_count.get();

        for i in 0..input_count {
            for o in 0..output_count {
                if rng.gen::<f32>() < config.initial_expression_chance {
                    let weight = Gene::random_weight(config, rng);
                    self.add_gene_unchecked(o + i * output_count, i, o + input_count, weight);
                }
            }
        }
    }

    /// Adds a new gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Errors
    ///
    /// Returns an error if a gene with the same `gene_id` or
    /// endpoints already exists in the genome, if either endpoint
    /// is not present in the genome, or if `output_id` is a sensor.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::genomics::{GeneticConfig, GeneValidityError, History, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut genome = NNGenome::new(0, &config, &mut History::new(&config), &mut seeded_rng(10));
    ///
    /// // The genome is initially empty.
    /// assert_eq!(genome.genes().count(), 0);
    ///
    /// let inserted = genome.add_gene(42, 2, 4, 2.5).unwrap().clone();
    /// assert_eq!(inserted.endpoints(), (2, 4));
    /// assert_eq!(genome.genes().next(), Some(&inserted));
    ///
    /// // Cycles and recursive genes are allowed.
    /// genome.add_gene(43, 4, 3, -3.0).unwrap();
    /// genome.add_gene(44, 4, 4, 1.0).unwrap();
    ///
    /// // Sensors can't receive genes.
    /// assert_eq!(genome.add_gene(45, 4, 0, 1.0), Err(GeneValidityError::SensorEndpoint(0)));
    /// ```
    pub fn add_gene(
        &mut self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
        weight: f32,
    ) -> Result<&mut Gene, GeneValidityError> {
        self.check_gene_viability(gene_id, input_id, output_id)?;
        Ok(self.add_gene_unchecked(gene_id, input_id, output_id, weight))
    }

    /// Adds a new gene to the genome, assuming it is viable.
    fn add_gene_unchecked(
        &mut self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
        weight: f32,
    ) -> &mut Gene {
        if let Some(input) = self.nodes.get_mut(&input_id) {
            input.add_output_gene(gene_id);
        }
        if let Some(output) = self.nodes.get_mut(&output_id) {
            output.add_input_gene(gene_id);
        }
        self.node_pairings.insert((input_id, output_id));
        self.genes
            .entry(gene_id)
            .or_insert_with(|| Gene::new(gene_id, input_id, output_id, weight))
    }

    fn check_gene_viability(
        &self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
    ) -> Result<(), GeneValidityError> {
        use GeneValidityError::*;
        if self.genes.contains_key(&gene_id) {
            Err(DuplicateGeneID(gene_id, input_id, output_id))
        } else if !(self.nodes.contains_key(&input_id) && self.nodes.contains_key(&output_id)) {
            Err(NonexistantEndpoints(input_id, output_id))
        } else if self.node_pairings.contains(&(input_id, output_id)) {
            Err(DuplicateGeneWithEndpoints(gene_id, (input_id, output_id)))
        } else if self.nodes[&output_id].node_type() == NodeType::Sensor {
            Err(SensorEndpoint(output_id))
        } else {
            Ok(())
        }
    }

    /// Adds a new hidden node to the genome.
    /// Returns a reference to the newly created node.
    ///
    /// # Errors
    ///
    /// Returns an error if a node with the same ID
    /// already exists in the genome.
    pub fn add_node(
        &mut self,
        node_id: Innovation,
        activation_type: ActivationType,
    ) -> Result<&mut Node, NodeValidityError> {
        if self.nodes.contains_key(&node_id) {
            return Err(NodeValidityError::DuplicateNodeID(node_id));
        }
        Ok(self.add_node_unchecked(node_id, activation_type))
    }

    fn add_node_unchecked(&mut self, node_id: Innovation, activation_type: ActivationType) -> &mut Node {
        self.nodes
            .entry(node_id)
            .or_insert_with(|| Node::new(node_id, NodeType::Neuron, activation_type))
    }

    /// Induces a _weight mutation_ in the genome.
    ///
    /// Each gene is either reset to a random value in
    /// `[-weight_bound, weight_bound]`, nudged by a random value in
    /// `[-weight_mutation_power, weight_mutation_power]`, or left as is.
    /// Newer genes are more likely to be reset.
    pub fn mutate_weights<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        let max_innovation = self.genes.keys().copied().max().unwrap_or_default().max(1) as f32;
        for gene in self.genes.values_mut() {
            // Older genes have had more time to settle.
            let reset_chance = config.weight_reset_chance
                * ((gene.innovation() + 1) as f32 / max_innovation).powf(2.0);
            if rng.gen::<f32>() < reset_chance {
                gene.randomize_weight(config, rng);
            } else if rng.gen::<f32>() < config.weight_nudge_chance {
                gene.nudge_weight(config, rng);
            }
        }
    }

    /// Induces a _gene mutation_ in the genome, connecting
    /// a pair of previously unconnected nodes.
    /// If successful, returns the newly added gene.
    ///
    /// # Errors
    ///
    /// Returns an error if the genome is fully connected or
    /// [too many] attempts to find a pair of nodes have failed.
    ///
    /// [too many]: GeneticConfig::max_gene_addition_mutation_attempts
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     weight_bound: 5.0,
    ///     max_gene_addition_mutation_attempts: 1,
    ///     recursion_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut rng = seeded_rng(10);
    /// let mut genome = NNGenome::new(0, &config, &mut history, &mut rng);
    ///
    /// assert_eq!(genome.genes().count(), 0);
    /// genome.mutate_add_gene(&mut history, &config, &mut rng).unwrap();
    /// assert_eq!(genome.genes().count(), 1);
    /// ```
    pub fn mutate_add_gene<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<&Gene, GeneAdditionMutationError> {
        let non_sensor_nodes = self.non_sensor_nodes();
        let mut potential_inputs = self.potential_input_nodes(&non_sensor_nodes);

        if potential_inputs.is_empty() {
            return Err(GeneAdditionMutationError::GenomeFullyConnected);
        }
        potential_inputs.shuffle(rng);

        let (input, output) = potential_inputs
            .iter()
            .take(config.max_gene_addition_mutation_attempts)
            .find_map(|&input| {
                self.choose_output_node_for(input, &non_sensor_nodes, config, rng)
                    .map(|output| (input, output))
            })
            .ok_or(GeneAdditionMutationError::NoInputOutputPairFound)?;

        let gene_id = history.next_gene_innovation(input, output);
        history.add_gene_innovation(input, output);
        let weight = Gene::random_weight(config, rng);
        Ok(self.add_gene_unchecked(gene_id, input, output, weight))
    }

    fn non_sensor_nodes(&self) -> BTreeSet<Innovation> {
        self.nodes
            .values()
            .filter(|n| n.node_type() != NodeType::Sensor)
            .map(Node::innovation)
            .collect()
    }

    /// Nodes with fewer output genes than there are possible outputs.
    fn potential_input_nodes(&self, non_sensor_nodes: &BTreeSet<Innovation>) -> Vec<Innovation> {
        self.nodes
            .values()
            .filter(|n| n.output_genes().count() < non_sensor_nodes.len())
            .map(Node::innovation)
            .collect()
    }

    fn choose_output_node_for<R: Rng + ?Sized>(
        &self,
        input: Innovation,
        potential_outputs: &BTreeSet<Innovation>,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Option<Innovation> {
        let can_recurse = self.nodes[&input].node_type() != NodeType::Sensor
            && !self.node_pairings.contains(&(input, input));
        if can_recurse && rng.gen::<f32>() < config.recursion_chance {
            return Some(input);
        }
        potential_outputs
            .iter()
            .copied()
            .filter(|&output| output != input && !self.node_pairings.contains(&(input, output)))
            .choose(rng)
    }

    /// Induces a _node mutation_ in the genome, splitting a
    /// randomly chosen expressed gene in two.
    /// If succesful, returns the triplet (_in gene_, _new node_, _out gene_).
    ///
    /// The split gene is suppressed. The new input gene has
    /// weight 1.0 and the new output gene inherits the split
    /// gene's weight.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no expressed
    /// genes in the genome that could be split.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::genomics::{ActivationType, GeneticConfig, History, NNGenome, NodeType};
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 1.0,
    ///     activation_types: vec![ActivationType::Tanh],
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut rng = seeded_rng(10);
    /// let mut genome = NNGenome::new(0, &config, &mut history, &mut rng);
    /// let split = genome.genes().next().unwrap().clone();
    ///
    /// let (input_gene, node, output_gene) =
    ///     genome.mutate_add_node(&mut history, &config, &mut rng).unwrap();
    ///
    /// assert_eq!(input_gene.output(), node.innovation());
    /// assert_eq!(input_gene.weight(), 1.0);
    /// assert_eq!(output_gene.input(), node.innovation());
    /// assert_eq!(output_gene.weight(), split.weight());
    /// assert_eq!(node.activation_type(), ActivationType::Tanh);
    /// assert_eq!(node.node_type(), NodeType::Neuron);
    ///
    /// assert_eq!(genome.genes().count(), 3);
    /// assert!(genome.genes().next().unwrap().suppressed());
    /// ```
    pub fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<(&Gene, &Node, &Gene), NodeAdditionMutationError> {
        let split_gene = self
            .genes
            .values()
            .filter(|g| !g.suppressed())
            .map(Gene::innovation)
            .choose(rng)
            .ok_or(NodeAdditionMutationError::NoExpressedGenes)?;

        // The genome may have split the same gene before.
        let (_, recorded_node, _) = history.next_node_innovation(split_gene, false);
        let duplicate = self.nodes.contains_key(&recorded_node);
        let mutation = history.next_node_innovation(split_gene, duplicate);
        history.add_node_innovation(split_gene, duplicate);

        Ok(self.add_node_mutation(split_gene, mutation, config, rng))
    }

    fn add_node_mutation<R: Rng + ?Sized>(
        &mut self,
        split_gene: Innovation,
        (input_gene, new_node, output_gene): (Innovation, Innovation, Innovation),
        config: &GeneticConfig,
        rng: &mut R,
    ) -> (&Gene, &Node, &Gene) {
        let (input_node, output_node, weight) = match self.genes.get_mut(&split_gene) {
            Some(gene) => {
                gene.set_suppressed(true);
                (gene.input(), gene.output(), gene.weight())
            }
            None => unreachable!("split gene {} was chosen from the genome", split_gene),
        };
        let activation = config
            .activation_types
            .choose(rng)
            .copied()
            .unwrap_or(ActivationType::Sigmoid);

        self.add_node_unchecked(new_node, activation);
        self.add_gene_unchecked(input_gene, input_node, new_node, 1.0);
        self.add_gene_unchecked(output_gene, new_node, output_node, weight);

        (
            &self.genes[&input_gene],
            &self.nodes[&new_node],
            &self.genes[&output_gene],
        )
    }

    fn mutate_all<R: Rng + ?Sized>(&mut self, history: &mut History, config: &GeneticConfig, rng: &mut R) {
        self.mutate_weights(config, rng);
        if rng.gen::<f32>() < config.node_addition_mutation_chance {
            let _ = self.mutate_add_node(history, config, rng);
        }
        if rng.gen::<f32>() < config.gene_addition_mutation_chance {
            let _ = self.mutate_add_gene(history, config, rng);
        }
    }

    /// Merges `other` into `self`, which is the fitter parent.
    fn combine<R: Rng + ?Sized>(&mut self, other: &NNGenome, config: &GeneticConfig, rng: &mut R) {
        if self.fitness == other.fitness {
            self.add_noncommon_structure(other);
        }
        if rng.gen::<f32>() < config.mate_by_averaging_chance {
            self.average_common_genes(other);
        } else {
            self.randomly_choose_common_genes(other, rng);
        }
    }

    /// Adds all genes and nodes of `other` missing from `self`.
    fn add_noncommon_structure(&mut self, other: &NNGenome) {
        for (id, node) in &other.nodes {
            if !self.nodes.contains_key(id) {
                self.add_node_unchecked(*id, node.activation_type());
            }
        }

        for (id, gene) in &other.genes {
            if self.check_gene_viability(*id, gene.input(), gene.output()).is_ok() {
                self.add_gene_unchecked(*id, gene.input(), gene.output(), gene.weight())
                    .set_suppressed(gene.suppressed());
            }
        }
    }

    fn average_common_genes(&mut self, other: &NNGenome) {
        for (id, others_gene) in &other.genes {
            if let Some(own_gene) = self.genes.get_mut(id) {
                own_gene.set_weight((own_gene.weight() + others_gene.weight()) / 2.0);
            }
        }
    }

    fn randomly_choose_common_genes<R: Rng + ?Sized>(&mut self, other: &NNGenome, rng: &mut R) {
        for (id, others_gene) in &other.genes {
            if let Some(own_gene) = self.genes.get_mut(id) {
                if rng.gen::<bool>() {
                    own_gene.set_weight(others_gene.weight());
                }
            }
        }
    }

    /// Unsuppresses suppressed genes with probability `config.suppression_reset_chance`.
    fn reset_suppresseds<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        for gene in self.genes.values_mut() {
            if gene.suppressed() && rng.gen::<f32>() < config.suppression_reset_chance {
                gene.set_suppressed(false);
            }
        }
    }

    fn count_disjoint_genes(&self, other: &NNGenome, common_innovation_max: Option<Innovation>) -> usize {
        match common_innovation_max {
            Some(max) => self
                .genes
                .range(..max)
                .filter(|(id, _)| !other.genes.contains_key(*id))
                .count(),
            None => 0,
        }
    }

    fn weight_diff_average(weight_pairs: &[(f32, f32)]) -> f32 {
        if weight_pairs.is_empty() {
            return 0.0;
        }
        weight_pairs.iter().map(|(w1, w2)| (w1 - w2).abs()).sum::<f32>() / weight_pairs.len() as f32
    }

    /// Returns an iterator over the genome's genes,
    /// in innovation order.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.values()
    }

    /// Returns an iterator over the genome's nodes,
    /// in innovation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

impl fmt::Display for NNGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genes: Vec<String> = self.genes.values().map(Gene::to_string).collect();
        let nodes: Vec<String> = self.nodes.values().map(Node::to_string).collect();
        f.debug_struct("NNGenome")
            .field("Key", &self.key)
            .field("Genes", &genes)
            .field("Nodes", &nodes)
            .field("Fitness", &self.fitness)
            .finish()
    }
}
