use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;
use std::fmt;

/// An ActivationType represents the type
/// of activation function the node's network
/// equivalent will use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActivationType {
    // 1 / (1 + exp(-4.9x))
    Sigmoid,
    // x
    Identity,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // exp(-x²)
    Gaussian,
    // sin(πx)
    Sinusoidal,
    // tanh(x)
    Tanh,
}

impl ActivationType {
    /// Applies the activation function to `input_sum`.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat_nn::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::Sigmoid.apply(0.0), 0.5);
    /// assert_eq!(ActivationType::ReLU.apply(-2.0), 0.0);
    /// ```
    pub fn apply(self, input_sum: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => 1.0 / (1.0 + (-4.9 * input_sum).exp()),
            ActivationType::Identity => input_sum,
            ActivationType::ReLU => input_sum.max(0.0),
            ActivationType::Gaussian => (-input_sum.powf(2.0)).exp(),
            ActivationType::Sinusoidal => (input_sum * std::f32::consts::PI).sin(),
            ActivationType::Tanh => input_sum.tanh(),
        }
    }
}

/// A NodeType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Sensor,
    Neuron,
    Actuator,
}

/// Nodes are the structural elements of genomes
/// between which genes are created.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Node {
    id: Innovation,
    inputs: BTreeSet<Innovation>,
    outputs: BTreeSet<Innovation>,
    node_type: NodeType,
    activation_type: ActivationType,
}

impl Node {
    /// Returns a new node with no input or output genes.
    pub fn new(id: Innovation, node_type: NodeType, activation_type: ActivationType) -> Node {
        Node {
            id,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            node_type,
            activation_type,
        }
    }

    /// Registers a gene ending at this node.
    /// Returns `false` if it was already registered.
    pub(super) fn add_input_gene(&mut self, gene_id: Innovation) -> bool {
        self.inputs.insert(gene_id)
    }

    /// Registers a gene starting at this node.
    /// Returns `false` if it was already registered.
    pub(super) fn add_output_gene(&mut self, gene_id: Innovation) -> bool {
        self.outputs.insert(gene_id)
    }

    pub fn innovation(&self) -> Innovation {
        self.id
    }

    /// Returns the genes ending at this node.
    pub fn input_genes(&self) -> impl Iterator<Item = &Innovation> {
        self.inputs.iter()
    }

    /// Returns the genes starting at this node.
    pub fn output_genes(&self) -> impl Iterator<Item = &Innovation> {
        self.outputs.iter()
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}[{:?}, {:?}, IN: {:?}, OUT: {:?}]",
            self.id, self.node_type, self.activation_type, self.inputs, self.outputs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gene_registration_is_idempotent() {
        let mut node = Node::new(4, NodeType::Neuron, ActivationType::Tanh);
        assert!(node.add_input_gene(1));
        assert!(!node.add_input_gene(1));
        assert!(node.add_output_gene(1));
        assert_eq!(node.input_genes().count(), 1);
        assert_eq!(node.output_genes().count(), 1);
    }
}
