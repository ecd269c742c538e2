use crate::{Genome, GenomeKey};

use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Species identifier. Specifies
/// the generation in which the species
/// was born, and the count of other species
/// generated in the _same generation_ before
/// the one identified (i.e, if it was the
/// third species born in generation 5, it
/// will be species [5, 2]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SpeciesID(pub usize, pub usize);

impl fmt::Display for SpeciesID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}

/// Species are collections of reproductively
/// compatible (within a certain [genetic distance])
/// genomes. Membership is determined by calculating
/// the genetic distance to a _representative_,
/// which is re-chosen every generation as the new
/// genome closest to the previous representative.
///
/// Species whose best fitness hasn't improved for
/// [`stagnation_threshold`] generations are removed
/// during reproduction.
///
/// [genetic distance]: crate::PopulationConfig::distance_threshold
/// [`stagnation_threshold`]: crate::PopulationConfig::stagnation_threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species<G> {
    id: SpeciesID,
    created: usize,
    last_improved: usize,
    representative: G,
    pub(super) members: Vec<GenomeKey>,
    pub(super) fitness: Option<f32>,
    pub(super) adjusted_fitness: Option<f32>,
    fitness_history: Vec<f32>,
}

impl<G: Genome + Clone> Species<G> {
    /// Creates a new species born in `generation`,
    /// with `representative` as its only member.
    pub(super) fn new(id: SpeciesID, generation: usize, representative: G) -> Species<G> {
        Species {
            id,
            created: generation,
            last_improved: generation,
            members: vec![representative.key()],
            representative,
            fitness: None,
            adjusted_fitness: None,
            fitness_history: vec![],
        }
    }

    /// Returns the species' ID.
    pub fn id(&self) -> SpeciesID {
        self.id
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &G {
        &self.representative
    }

    /// Returns the keys of the species' members.
    pub fn members(&self) -> impl Iterator<Item = GenomeKey> + '_ {
        self.members.iter().copied()
    }

    /// Returns the number of members in the species.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Returns the generation in which the species was born.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Returns the number of generations the species
    /// has been stagnated as of `generation`.
    pub fn time_stagnated(&self, generation: usize) -> usize {
        generation.saturating_sub(self.last_improved)
    }

    /// Returns the species' fitness as of the last reproduction.
    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    /// Returns the species' adjusted fitness as of the last reproduction.
    pub fn adjusted_fitness(&self) -> Option<f32> {
        self.adjusted_fitness
    }

    /// Returns every fitness value the species has recorded,
    /// oldest first.
    pub fn fitness_history(&self) -> &[f32] {
        &self.fitness_history
    }

    /// Records the species' fitness for `generation`,
    /// resetting its stagnation if it improved on its
    /// historical best.
    pub(super) fn record_fitness(&mut self, fitness: f32, generation: usize) {
        let previous_best = self
            .fitness_history
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        self.fitness = Some(fitness);
        self.fitness_history.push(fitness);
        if fitness > previous_best {
            self.last_improved = generation;
        }
    }

    fn reassign(&mut self, representative: G, members: Vec<GenomeKey>) {
        self.representative = representative;
        self.members = members;
    }
}

/// The partition of a population into species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSet<G> {
    species: BTreeMap<SpeciesID, Species<G>>,
    genome_to_species: BTreeMap<GenomeKey, SpeciesID>,
}

impl<G> Default for SpeciesSet<G> {
    fn default() -> Self {
        SpeciesSet {
            species: BTreeMap::new(),
            genome_to_species: BTreeMap::new(),
        }
    }
}

impl<G: Genome + Clone> SpeciesSet<G> {
    /// Returns an empty species set.
    pub fn new() -> SpeciesSet<G> {
        Self::default()
    }

    /// Partitions `genomes` into species.
    ///
    /// Every existing species first claims the genome closest
    /// to its previous representative, which becomes its new
    /// representative. Remaining genomes join the closest species
    /// within `distance_threshold`, or found a new one identified
    /// as born in `generation`. Species that claim no genome
    /// disappear.
    pub fn speciate(
        &mut self,
        genomes: &BTreeMap<GenomeKey, G>,
        distance_threshold: f32,
        config: &G::Config,
        generation: usize,
    ) {
        let mut unspeciated: BTreeSet<GenomeKey> = genomes.keys().copied().collect();
        let mut representatives: BTreeMap<SpeciesID, GenomeKey> = BTreeMap::new();
        let mut members: BTreeMap<SpeciesID, Vec<GenomeKey>> = BTreeMap::new();

        for (id, species) in &self.species {
            let closest = unspeciated
                .iter()
                .map(|key| {
                    let distance =
                        G::genetic_distance(species.representative(), &genomes[key], config);
                    (*key, distance)
                })
                .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2));
            if let Some((key, _)) = closest {
                unspeciated.remove(&key);
                representatives.insert(*id, key);
                members.insert(*id, vec![key]);
            }
        }

        let mut born = 0;
        for key in unspeciated {
            let genome = &genomes[&key];
            let closest = representatives
                .iter()
                .map(|(id, rep)| (*id, G::genetic_distance(&genomes[rep], genome, config)))
                .filter(|(_, distance)| *distance < distance_threshold)
                .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2));
            match closest {
                Some((id, _)) => members.entry(id).or_default().push(key),
                None => {
                    let id = SpeciesID(generation, born);
                    born += 1;
                    representatives.insert(id, key);
                    members.insert(id, vec![key]);
                }
            }
        }

        let mut previous = std::mem::take(&mut self.species);
        self.genome_to_species.clear();
        for (id, keys) in members {
            let representative = genomes[&representatives[&id]].clone();
            for key in &keys {
                self.genome_to_species.insert(*key, id);
            }
            let species = match previous.remove(&id) {
                Some(mut species) => {
                    species.reassign(representative, keys);
                    species
                }
                None => {
                    let mut species = Species::new(id, generation, representative);
                    species.members = keys;
                    species
                }
            };
            self.species.insert(id, species);
        }
    }

    /// Returns the species with the given ID.
    pub fn get(&self, id: SpeciesID) -> Option<&Species<G>> {
        self.species.get(&id)
    }

    /// Returns the ID of the species `key` was assigned
    /// to during the last speciation.
    pub fn species_of(&self, key: GenomeKey) -> Option<SpeciesID> {
        self.genome_to_species.get(&key).copied()
    }

    /// Returns an iterator over all species, in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Species<G>> {
        self.species.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Species<G>> {
        self.species.values_mut()
    }

    /// Keeps only the species for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Species<G>) -> bool,
    {
        self.species.retain(|_, s| keep(s));
    }

    /// Returns the number of species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Returns whether no species remain.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Returns a printable per-species summary as of `generation`.
    pub fn report(&self, generation: usize) -> SpeciesReport {
        SpeciesReport {
            rows: self
                .iter()
                .map(|s| SpeciesRow {
                    id: s.id(),
                    age: generation.saturating_sub(s.created()),
                    size: s.size(),
                    fitness: s.fitness(),
                    adjusted_fitness: s.adjusted_fitness(),
                    stagnation: s.time_stagnated(generation),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
struct SpeciesRow {
    id: SpeciesID,
    age: usize,
    size: usize,
    fitness: Option<f32>,
    adjusted_fitness: Option<f32>,
    stagnation: usize,
}

/// A table of species statistics.
#[derive(Clone, Debug)]
pub struct SpeciesReport {
    rows: Vec<SpeciesRow>,
}

impl fmt::Display for SpeciesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn optional(value: Option<f32>) -> String {
            value.map_or_else(|| "--".into(), |v| format!("{:.3}", v))
        }

        writeln!(f, "   ID    age  size   fitness   adj fit  stag")?;
        writeln!(f, "  =====  ===  ====  ========  ========  ====")?;
        for row in &self.rows {
            writeln!(
                f,
                "  {:>5}  {:>3}  {:>4}  {:>8}  {:>8}  {:>4}",
                row.id.to_string(),
                row.age,
                row.size,
                optional(row.fitness),
                optional(row.adjusted_fitness),
                row.stagnation
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{genomes_with_values, ScalarGenome};

    #[test]
    fn speciate_splits_by_distance() {
        let genomes = genomes_with_values(&[0.0, 0.5, 10.0, 10.4]);
        let mut set = SpeciesSet::<ScalarGenome>::new();
        set.speciate(&genomes, 1.0, &(), 1);

        assert_eq!(set.len(), 2);
        assert_eq!(set.species_of(0), set.species_of(1));
        assert_eq!(set.species_of(2), set.species_of(3));
        assert_ne!(set.species_of(0), set.species_of(2));
        assert_eq!(set.species_of(0), Some(SpeciesID(1, 0)));
    }

    #[test]
    fn speciate_keeps_species_continuity() {
        let genomes = genomes_with_values(&[0.0, 10.0]);
        let mut set = SpeciesSet::<ScalarGenome>::new();
        set.speciate(&genomes, 1.0, &(), 1);
        let ids: Vec<_> = set.iter().map(|s| s.id()).collect();

        // Entirely new genomes, close to the old representatives.
        let next = crate::testing::genomes_from(&[(5, 0.2), (6, 9.9), (7, 0.1)]);
        set.speciate(&next, 1.0, &(), 2);

        assert_eq!(set.iter().map(|s| s.id()).collect::<Vec<_>>(), ids);
        assert_eq!(set.species_of(7), Some(ids[0]));
        assert_eq!(set.species_of(6), Some(ids[1]));
        assert_eq!(set.get(ids[0]).unwrap().representative().key(), 7);
    }

    #[test]
    fn speciate_drops_species_without_members() {
        let mut set = SpeciesSet::<ScalarGenome>::new();
        set.speciate(&genomes_with_values(&[0.0, 10.0]), 1.0, &(), 1);
        set.speciate(&crate::testing::genomes_from(&[(3, 0.0)]), 1.0, &(), 2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn record_fitness_tracks_stagnation() {
        let genomes = genomes_with_values(&[0.0]);
        let mut species = Species::new(SpeciesID(1, 0), 1, genomes[&0].clone());
        species.record_fitness(1.0, 1);
        species.record_fitness(0.5, 2);
        species.record_fitness(1.0, 3);
        assert_eq!(species.time_stagnated(3), 2);
        species.record_fitness(2.0, 4);
        assert_eq!(species.time_stagnated(4), 0);
        assert_eq!(species.fitness_history(), &[1.0, 0.5, 1.0, 2.0]);
    }
}
