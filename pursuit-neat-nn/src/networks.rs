//! A network is the phenotype of a genome: suppressed
//! genes are ignored, the remaining genes become
//! connections and genome nodes become network nodes.
//!
//! [`RealTimeNetwork`] advances one time-step at a time, so
//! recurrent connections carry state between steps. Used as a
//! [`Controller`], it answers each observation from a cleared
//! state, with enough steps for the inputs to reach the outputs
//! through every hidden node.
mod connection;

use crate::genomics::{ActivationType, NNGenome, NodeType};
use crate::Innovation;
use connection::Connection;

use ahash::RandomState;
use pursuit_neat::Controller;

use std::collections::HashMap;
use std::fmt;

/// An arbitrarily-structured neural network.
///
/// Nodes are laid out as inputs, then outputs, then hidden
/// nodes, each group in innovation order.
#[derive(Clone, Debug)]
pub struct RealTimeNetwork {
    input_count: usize,
    output_count: usize,
    node_ids: Box<[Innovation]>,
    input_sums: Box<[f32]>,
    activation_levels: Box<[f32]>,
    activation_functions: Box<[ActivationType]>,
    connections: Box<[Box<[Connection]>]>,
}

impl From<&NNGenome> for RealTimeNetwork {
    /// Generates a new network from the passed genome.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::{
    ///     genomics::{GeneticConfig, History, NNGenome},
    ///     networks::RealTimeNetwork,
    /// };
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let genome = NNGenome::new(0, &config, &mut History::new(&config), &mut seeded_rng(10));
    ///
    /// let network = RealTimeNetwork::from(&genome);
    /// assert_eq!(network.input_count(), 3);
    /// assert_eq!(network.outputs().len(), 2);
    /// ```
    fn from(genome: &NNGenome) -> RealTimeNetwork {
        let mut input_nodes = vec![];
        let mut output_nodes = vec![];
        let mut hidden_nodes = vec![];

        // Genome nodes come in innovation order.
        for node in genome.nodes() {
            match node.node_type() {
                NodeType::Sensor => &mut input_nodes,
                NodeType::Actuator => &mut output_nodes,
                NodeType::Neuron => &mut hidden_nodes,
            }
            .push((node.innovation(), node.activation_type()));
        }
        let (node_ids, activation_functions): (Vec<_>, Vec<_>) = input_nodes
            .iter()
            .chain(&output_nodes)
            .chain(&hidden_nodes)
            .copied()
            .unzip();
        let total_node_count = node_ids.len();

        let node_index_from_id: HashMap<_, _, RandomState> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let mut connections = vec![vec![]; total_node_count];

        for gene in genome.genes().filter(|g| !g.suppressed()) {
            let input_index = node_index_from_id[&gene.input()];
            let output_index = node_index_from_id[&gene.output()];
            connections[input_index].push(Connection::new(output_index, gene.weight()));
        }

        RealTimeNetwork {
            input_count: input_nodes.len(),
            output_count: output_nodes.len(),
            node_ids: node_ids.into(),
            input_sums: vec![0.0; total_node_count].into(),
            activation_levels: vec![0.0; total_node_count].into(),
            activation_functions: activation_functions.into(),
            connections: connections.into_iter().map(Vec::into_boxed_slice).collect(),
        }
    }
}

impl RealTimeNetwork {
    /// Advances the network one time-step: fires all nodes,
    /// propagating all activations (including set inputs),
    /// and then computes new activation levels.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::{Genome, seeded_rng};
    /// use pursuit_neat_nn::{
    ///     genomics::{ActivationType, GeneticConfig, History, NNGenome},
    ///     networks::RealTimeNetwork,
    /// };
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(2).unwrap(),
    ///     output_count: NonZeroUsize::new(1).unwrap(),
    ///     output_activation_types: vec![ActivationType::ReLU],
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut genome = NNGenome::new(0, &config, &mut History::new(&config), &mut seeded_rng(10));
    /// genome.add_gene(0, 0, 2, 2.5).unwrap();
    /// genome.add_gene(1, 1, 2, -2.5).unwrap();
    ///
    /// let mut network = RealTimeNetwork::from(&genome);
    /// network.set_inputs(&[1.0, 0.5]);
    /// network.advance();
    ///
    /// assert_eq!(network.outputs()[0], (1.0f32 * 2.5 + 0.5 * -2.5).max(0.0));
    /// ```
    pub fn advance(&mut self) {
        self.fire_nodes();
        self.compute_activations();
    }

    /// Propagates each node's signal through all its
    /// outgoing connections.
    fn fire_nodes(&mut self) {
        for (activation, output_connections) in
            self.activation_levels.iter().zip(self.connections.iter())
        {
            for connection in output_connections.iter() {
                self.input_sums[connection.output] += *activation * connection.weight;
            }
        }
    }

    /// Computes each non-input node's activation
    /// level from its input sum.
    fn compute_activations(&mut self) {
        for ((input_sum, activation_level), activation_function) in self.input_sums
            [self.input_count..]
            .iter_mut()
            .zip(&mut self.activation_levels[self.input_count..])
            .zip(&self.activation_functions[self.input_count..])
        {
            *activation_level = activation_function.apply(*input_sum);
            *input_sum = 0.0;
        }
    }

    /// Clears the activation state of all nodes.
    pub fn clear_state(&mut self) {
        self.input_sums.iter_mut().for_each(|sum| *sum = 0.0);
        self.activation_levels.iter_mut().for_each(|level| *level = 0.0);
    }

    /// Sets the activation level of each input node
    /// to the corresponding value in the passed slice.
    ///
    /// # Panics
    ///
    /// Panics if the length of `values` is not equal
    /// to the number of inputs in the network.
    pub fn set_inputs(&mut self, values: &[f32]) {
        assert_eq!(
            values.len(),
            self.input_count,
            "network with {} inputs received {} values",
            self.input_count,
            values.len()
        );
        self.activation_levels[..self.input_count].copy_from_slice(values);
    }

    /// Returns the current output node activation levels.
    pub fn outputs(&self) -> Vec<f32> {
        self.activation_levels[self.input_count..self.input_count + self.output_count].to_vec()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of hidden nodes.
    pub fn hidden_count(&self) -> usize {
        self.node_ids.len() - self.input_count - self.output_count
    }
}

impl Controller for RealTimeNetwork {
    /// Answers `inputs` from a cleared state, advancing once
    /// per hidden node plus once more.
    ///
    /// # Panics
    ///
    /// Panics if the length of `inputs` is not equal
    /// to the number of inputs in the network.
    fn activate(&mut self, inputs: &[f32]) -> Vec<f32> {
        self.clear_state();
        self.set_inputs(inputs);
        for _ in 0..=self.hidden_count() {
            self.advance();
        }
        self.outputs()
    }
}

impl fmt::Display for RealTimeNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "RealTimeNetwork[{} inputs, {} outputs, {} hidden]",
            self.input_count,
            self.output_count,
            self.hidden_count()
        )?;
        for (id, connections) in self.node_ids.iter().zip(self.connections.iter()) {
            if !connections.is_empty() {
                let targets: Vec<String> = connections
                    .iter()
                    .map(|c| format!("{}({:.3})", self.node_ids[c.output], c.weight))
                    .collect();
                writeln!(f, "  {} -> {}", id, targets.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{GeneticConfig, History};
    use pursuit_neat::{seeded_rng, Genome};
    use std::num::NonZeroUsize;

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-4.9 * x).exp())
    }

    fn empty_genome(config: &GeneticConfig) -> NNGenome {
        NNGenome::new(0, config, &mut History::new(config), &mut seeded_rng(0))
    }

    #[test]
    fn from() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(2).unwrap(),
            output_count: NonZeroUsize::new(2).unwrap(),
            output_activation_types: vec![ActivationType::Sigmoid, ActivationType::Gaussian],
            ..GeneticConfig::zero()
        };
        let mut genome = empty_genome(&config);
        genome.add_node(4, ActivationType::Tanh).unwrap();

        let ids = [0, 2, 6, 7, 3, 5, 4];
        let inputs = [0, 0, 1, 3, 4, 4, 4];
        let outputs = [2, 4, 4, 3, 3, 2, 4];
        let weights = [1.0, 1.0, 2.5, -2.0, -1.0, -1.5, 3.2];
        for i in 0..7 {
            genome.add_gene(ids[i], inputs[i], outputs[i], weights[i]).unwrap();
        }
        genome.add_gene(1, 0, 3, -1.0).unwrap().set_suppressed(true);

        let network = RealTimeNetwork::from(&genome);
        assert_eq!(network.input_count, 2);
        assert_eq!(network.output_count, 2);
        assert_eq!(network.hidden_count(), 1);
        assert_eq!(&network.node_ids[..], &[0, 1, 2, 3, 4]);
        assert_eq!(
            &network.activation_functions[2..],
            &[ActivationType::Sigmoid, ActivationType::Gaussian, ActivationType::Tanh]
        );
        // Node ids and indices coincide here.
        assert!(!network.connections[0].contains(&Connection::new(3, -1.0)));
        for (idx, &input) in inputs.iter().enumerate() {
            assert!(network.connections[input].contains(&Connection::new(outputs[idx], weights[idx])));
        }
    }

    #[test]
    fn advance_empty() {
        let mut network = RealTimeNetwork::from(&empty_genome(&GeneticConfig::zero()));
        assert!((0..100).all(|_| {
            network.advance();
            network.outputs()[0] == sigmoid(0.0)
        }));
    }

    #[test]
    fn advance_single() {
        let mut genome = empty_genome(&GeneticConfig::zero());
        genome.add_gene(0, 0, 1, 1.0).unwrap();
        let mut network = RealTimeNetwork::from(&genome);
        for input in -20..=20 {
            let input = input as f32 / 10.0;
            network.clear_state();
            network.set_inputs(&[input]);
            network.advance();
            assert_eq!(network.outputs()[0], sigmoid(input))
        }
    }

    #[test]
    fn advance_single_recursive() {
        let mut genome = empty_genome(&GeneticConfig::zero());
        genome.add_gene(0, 0, 1, 1.0).unwrap();
        genome.add_gene(1, 1, 1, -1.0).unwrap();
        let mut network = RealTimeNetwork::from(&genome);
        let mut prev_output = 0.0;
        for input in -20..=20 {
            let input = input as f32 / 10.0;
            network.set_inputs(&[input]);
            network.advance();
            assert_eq!(network.outputs()[0], sigmoid(input - prev_output));
            prev_output = network.outputs()[0];
        }
    }

    #[test]
    fn advance_double() {
        let mut genome = empty_genome(&GeneticConfig::zero());
        genome.add_node(2, ActivationType::Sigmoid).unwrap();
        genome.add_gene(0, 0, 2, 1.0).unwrap();
        genome.add_gene(1, 2, 1, 1.0).unwrap();
        let mut network = RealTimeNetwork::from(&genome);
        for input in -20..=20 {
            let input = input as f32 / 10.0;
            network.clear_state();
            network.set_inputs(&[input]);
            network.advance();
            network.advance();
            assert_eq!(network.outputs()[0], sigmoid(sigmoid(input)))
        }
    }

    #[test]
    fn controller_reaches_outputs_through_hidden_nodes() {
        let mut genome = empty_genome(&GeneticConfig::zero());
        genome.add_node(2, ActivationType::Identity).unwrap();
        genome.add_node(3, ActivationType::Identity).unwrap();
        genome.add_gene(0, 0, 2, 2.0).unwrap();
        genome.add_gene(1, 2, 3, 0.5).unwrap();
        genome.add_gene(2, 3, 1, 1.0).unwrap();
        let mut network = RealTimeNetwork::from(&genome);

        for input in [-1.0, 0.0, 0.25] {
            assert_eq!(network.activate(&[input]), vec![sigmoid(input)]);
        }
    }

    #[test]
    fn controller_activation_is_stateless() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(3).unwrap(),
            ..GeneticConfig::zero()
        };
        let mut genome = empty_genome(&config);
        genome.add_gene(0, 0, 3, -1.0).unwrap();
        genome.add_gene(1, 1, 3, 1.0).unwrap();
        genome.add_gene(2, 2, 3, 0.5).unwrap();
        genome.add_gene(3, 3, 3, 2.0).unwrap();
        let mut network = RealTimeNetwork::from(&genome);

        let first = network.activate(&[0.5, -0.5, 1.0]);
        network.activate(&[2.0, 2.0, 2.0]);
        assert_eq!(network.activate(&[0.5, -0.5, 1.0]), first);
        assert_eq!(first, vec![sigmoid(-0.5 - 0.5 + 0.5)]);
    }

    #[test]
    #[should_panic]
    fn wrong_input_count_panics() {
        let mut network = RealTimeNetwork::from(&empty_genome(&GeneticConfig::zero()));
        network.activate(&[1.0, 2.0]);
    }
}
