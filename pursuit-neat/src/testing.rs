//! A one-gene genome used to exercise the population
//! machinery without a neural network.
use crate::{Genome, GenomeKey, InnovationHistory};

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScalarGenome {
    pub key: GenomeKey,
    pub value: f32,
    pub fitness: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct NoHistory;

impl InnovationHistory for NoHistory {
    type Config = ();

    fn new(_: &()) -> NoHistory {
        NoHistory
    }
}

impl Genome for ScalarGenome {
    type Config = ();
    type InnovationHistory = NoHistory;

    fn new<R: Rng + ?Sized>(key: GenomeKey, _: &(), _: &mut NoHistory, rng: &mut R) -> Self {
        ScalarGenome {
            key,
            value: rng.gen_range(-1.0..1.0),
            fitness: None,
        }
    }

    fn key(&self) -> GenomeKey {
        self.key
    }

    fn genetic_distance(first: &Self, second: &Self, _: &()) -> f32 {
        (first.value - second.value).abs()
    }

    fn mate<R: Rng + ?Sized>(
        key: GenomeKey,
        parent1: &Self,
        parent2: &Self,
        _: &mut NoHistory,
        _: &(),
        rng: &mut R,
    ) -> Self {
        ScalarGenome {
            key,
            value: (parent1.value + parent2.value) / 2.0 + rng.gen_range(-0.01..0.01),
            fitness: None,
        }
    }

    fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = Some(fitness);
    }

    fn clear_fitness(&mut self) {
        self.fitness = None;
    }
}

pub(crate) fn genomes_from(entries: &[(GenomeKey, f32)]) -> BTreeMap<GenomeKey, ScalarGenome> {
    entries
        .iter()
        .map(|&(key, value)| {
            (
                key,
                ScalarGenome {
                    key,
                    value,
                    fitness: None,
                },
            )
        })
        .collect()
}

pub(crate) fn genomes_with_values(values: &[f32]) -> BTreeMap<GenomeKey, ScalarGenome> {
    let entries: Vec<_> = values.iter().copied().enumerate().collect();
    genomes_from(&entries)
}

/// Genomes with the given fitness values, keyed by position.
pub(crate) fn evaluated(fitnesses: &[f32]) -> Vec<ScalarGenome> {
    fitnesses
        .iter()
        .enumerate()
        .map(|(key, fitness)| ScalarGenome {
            key,
            value: 0.0,
            fitness: Some(*fitness),
        })
        .collect()
}
