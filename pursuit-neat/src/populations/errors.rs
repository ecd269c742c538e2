use crate::checkpoint::CheckpointError;
use crate::GenomeKey;

use thiserror::Error;

/// Unrecoverable failures of the evolutionary loop.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// The fitness function returned without evaluating a genome.
    #[error("fitness not assigned to genome {key} in generation {generation}")]
    MissingFitness { key: GenomeKey, generation: usize },
    /// Reproduction left no species alive.
    #[error("complete extinction after generation {generation}")]
    CompleteExtinction { generation: usize },
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
