use crate::Innovation;

use thiserror::Error;

/// An error type indicating the gene being
/// added to a genome is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneValidityError {
    /// The gene's ID is a duplicate.
    #[error("duplicate gene insertion with id {0} between endpoints {1} -> {2}")]
    DuplicateGeneID(Innovation, Innovation, Innovation),
    /// The gene's endpoints do not exist.
    #[error("gene insertion between nonexistant endpoint(s) {0} -> {1}")]
    NonexistantEndpoints(Innovation, Innovation),
    /// The gene has the same endpoints as another with a different ID.
    #[error("gene insertion with endpoints {1:?} and id {0} shadows gene with same endpoints")]
    DuplicateGeneWithEndpoints(Innovation, (Innovation, Innovation)),
    /// The output endpoint of the gene is a sensor node.
    #[error("gene insertion with sensor node {0} as output")]
    SensorEndpoint(Innovation),
}

/// An error type indicating the node being
/// added to a genome is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeValidityError {
    #[error("duplicate node insertion with id {0}")]
    DuplicateNodeID(Innovation),
}

/// An error type indicating a failure
/// to carry out a gene addition mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneAdditionMutationError {
    /// Every node already has an output gene to every non-sensor node.
    #[error("gene mutation on fully-connected genome")]
    GenomeFullyConnected,
    /// No pair of nodes was found to connect within the allowed attempts.
    #[error("no viable input-output pair found for gene mutation")]
    NoInputOutputPairFound,
}

/// An error type indicating a failure
/// to carry out a node addition mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeAdditionMutationError {
    /// The genome has no expressed gene to split.
    #[error("node mutation on genome without expressed genes")]
    NoExpressedGenes,
}
