//! A Population is a collection of genomes.
//! These are grouped into species, which are
//! evolved generation after generation using a
//! caller-supplied fitness function as the
//! source of selective pressure.
mod config;
mod errors;
mod offspring_factory;
mod reproduction;
mod species;

pub use config::PopulationConfig;
pub use errors::EvolutionError;
pub use reproduction::{Breeding, DefaultReproduction, Reproduction};
pub use species::{Species, SpeciesID, SpeciesReport, SpeciesSet};

use crate::checkpoint::{self, CheckpointError, Checkpointer};
use crate::episodes::{
    build_controllers, EarlyStop, EpisodeRunner, EpisodeSchedule, EvaluationSummary, StopReason,
};
use crate::reporting::FitnessReporter;
use crate::{seeded_rng, EvolutionRng, Genome, GenomeKey, InnovationHistory};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A population of genomes, along with everything
/// needed to resume its evolution: species, innovation
/// history, reproduction state, fitness records and the
/// random number generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population<C, H, G, R = DefaultReproduction> {
    genomes: BTreeMap<GenomeKey, G>,
    species: SpeciesSet<G>,
    reproduction: R,
    history: H,
    generation: usize,
    population_config: PopulationConfig,
    genetic_config: C,
    reporter: FitnessReporter<G>,
    rng: EvolutionRng,
    #[serde(skip)]
    checkpointer: Option<Checkpointer>,
}

impl<C, H, G, R> Population<C, H, G, R>
where
    G: Genome<InnovationHistory = H, Config = C> + Clone,
    R: Reproduction<G>,
{
    /// Creates a new population using the passed configurations.
    ///
    /// The type of `genetic_config` depends on the implementation
    /// of [`Genome`], and is effectively opaque to the population.
    /// The population starts at generation 1, already speciated.
    ///
    /// [`Genome`]: crate::Genome
    ///
    /// # Examples
    /// ```
    /// # use pursuit_neat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use pursuit_neat::{Population, PopulationConfig};
    ///
    /// let pop_config = PopulationConfig {
    ///     // Set desired configuration
    ///     size: std::num::NonZeroUsize::new(10).unwrap(),
    ///     ..PopulationConfig::zero()
    /// };
    /// # let genetic_config = GeneticConfig::zero();
    ///
    /// // With `G` a suitable type implementing `Genome`...
    /// let population = <Population<_, _, G>>::new(pop_config, genetic_config);
    /// assert_eq!(population.genomes().count(), 10);
    /// assert_eq!(population.generation(), 1);
    /// ```
    pub fn new(population_config: PopulationConfig, genetic_config: C) -> Population<C, H, G, R>
    where
        H: InnovationHistory<Config = C>,
        R: Default,
    {
        let mut history = H::new(&genetic_config);
        let mut rng = seeded_rng(population_config.seed);
        let mut reproduction = R::default();
        let genomes = reproduction.create_new(
            &mut Breeding {
                config: &population_config,
                genetic_config: &genetic_config,
                history: &mut history,
                rng: &mut rng,
            },
            population_config.size.get(),
        );
        let generation = 1;
        let mut species = SpeciesSet::new();
        species.speciate(
            &genomes,
            population_config.distance_threshold,
            &genetic_config,
            generation,
        );

        Population {
            genomes,
            species,
            reproduction,
            history,
            generation,
            population_config,
            genetic_config,
            reporter: FitnessReporter::new(),
            rng,
            checkpointer: None,
        }
    }

    /// Saves checkpoints of the population with `checkpointer`
    /// while [running](Population::run).
    pub fn with_checkpointer(mut self, checkpointer: Checkpointer) -> Population<C, H, G, R> {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Restores a population from the checkpoint at `path`.
    /// The restored population doesn't save checkpoints
    /// until one is attached.
    pub fn restore(path: impl AsRef<Path>) -> Result<Population<C, H, G, R>, CheckpointError>
    where
        Self: DeserializeOwned,
    {
        checkpoint::restore(path)
    }

    /// Restores the newest checkpoint in `directory`, and
    /// keeps checkpointing to it from there with the default
    /// [`Checkpointer`] interval and retention. Returns `None`
    /// if there is no checkpoint to restore.
    ///
    /// Use [`resume`](Population::resume) to keep
    /// checkpointing with other settings.
    pub fn restore_latest(
        directory: impl Into<PathBuf>,
    ) -> Result<Option<Population<C, H, G, R>>, CheckpointError>
    where
        Self: DeserializeOwned,
    {
        Self::resume(Checkpointer::new(directory))
    }

    /// Restores the newest checkpoint in the directory of
    /// `checkpointer`, which then keeps saving from the restored
    /// generation on. Returns `None` if there is no checkpoint
    /// to restore.
    pub fn resume(
        checkpointer: Checkpointer,
    ) -> Result<Option<Population<C, H, G, R>>, CheckpointError>
    where
        Self: DeserializeOwned,
    {
        Ok(
            checkpoint::restore_latest::<Self>(checkpointer.directory())?.map(
                |(population, generation)| {
                    population.with_checkpointer(checkpointer.resumed_at(generation))
                },
            ),
        )
    }

    /// Runs `generations` generations of evolution.
    ///
    /// Every generation, `fitness_function` is called once with the
    /// population and must assign a fitness to every genome. Fitness
    /// values are cleared beforehand, so genomes carried over from
    /// the previous generation must be evaluated again. The next
    /// generation is then reproduced and speciated, and a checkpoint
    /// is saved if one is due (always after the last generation).
    ///
    /// # Errors
    /// Returns an error if a genome is left without fitness,
    /// if no species survive reproduction, or if a checkpoint
    /// can't be saved. The population is left as it was when
    /// the error was detected. After a missing fitness, this
    /// means the reporter has started counting the failed
    /// generation but holds no record of it.
    ///
    /// # Examples
    /// ```
    /// # use pursuit_neat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use pursuit_neat::{Genome, Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::zero();
    /// // With `G` a suitable type implementing `Genome`...
    /// let mut population = <Population<_, _, G>>::new(
    ///     PopulationConfig {
    ///         size: std::num::NonZeroUsize::new(8).unwrap(),
    ///         distance_threshold: 100.0,
    ///         survival_threshold: 0.5,
    ///         stagnation_threshold: std::num::NonZeroUsize::new(15).unwrap(),
    ///         ..PopulationConfig::zero()
    ///     },
    ///     genetic_config,
    /// );
    ///
    /// population
    ///     .run(
    ///         |population| {
    ///             for genome in population.genomes_mut() {
    ///                 // Compute genome's fitness...
    ///                 genome.set_fitness(1.0);
    ///             }
    ///         },
    ///         3,
    ///     )
    ///     .unwrap();
    /// assert_eq!(population.generation(), 4);
    /// ```
    pub fn run<F>(&mut self, mut fitness_function: F, generations: usize) -> Result<(), EvolutionError>
    where
        F: FnMut(&mut Self),
        Self: Serialize,
    {
        for iteration in 1..=generations {
            for genome in self.genomes.values_mut() {
                genome.clear_fitness();
            }
            self.reporter.start_generation();
            fitness_function(self);

            if let Some(genome) = self.genomes.values().find(|g| g.fitness().is_none()) {
                return Err(EvolutionError::MissingFitness {
                    key: genome.key(),
                    generation: self.generation,
                });
            }
            self.reporter.end_generation(self.genomes.values());
            self.log_generation();

            self.evolve()?;
            self.checkpoint(iteration == generations)?;
        }
        Ok(())
    }

    /// Evaluates every genome over up to `schedule.max_episodes`
    /// episodes of `runner`, stopping early once the fitness ranking
    /// stabilizes as judged by `schedule.early_stop`.
    ///
    /// Fitness accumulates over episodes starting from 0, and
    /// is divided by the number of episodes run if
    /// `schedule.normalize` is set. Meant to be called from the
    /// fitness function passed to [`run`](Population::run).
    ///
    /// # Panics
    /// Panics if `runner` changes the number of controllers
    /// during an episode.
    pub fn evaluate_episodes<E>(&mut self, runner: &mut E, schedule: &EpisodeSchedule) -> EvaluationSummary
    where
        E: EpisodeRunner<G>,
    {
        let mut controllers = build_controllers(runner, &self.genomes);
        let genome_count = controllers.len();
        for genome in self.genomes.values_mut() {
            genome.set_fitness(0.0);
        }

        let mut summary = EvaluationSummary {
            episodes: 0,
            last_score: None,
            stop_reason: StopReason::MaxEpisodes,
        };
        for episode in 1..=schedule.max_episodes.max(1) {
            self.reporter.start_episode();
            let outcome = {
                let mut genomes: Vec<&mut G> = self.genomes.values_mut().collect();
                runner.run_episode(episode, &mut controllers, &mut genomes)
            };
            assert_eq!(
                controllers.len(),
                genome_count,
                "controllers no longer match genomes after episode {}",
                episode
            );
            self.reporter.end_episode(self.genomes.values());
            summary.episodes = episode;

            let judgement = if episode < schedule.min_episodes {
                None
            } else {
                match schedule.early_stop {
                    EarlyStop::Never => None,
                    EarlyStop::RankingStability { threshold, window } => self
                        .reporter
                        .compute_evolution_ranking(self.genomes.values(), window)
                        .map(|shift| (shift.displacement as f32, shift.displacement <= threshold)),
                    EarlyStop::BestMean {
                        threshold_percent,
                        top_n,
                    } => self
                        .reporter
                        .compute_evolution_best_mean(top_n)
                        .map(|change| (change, change < threshold_percent)),
                }
            };
            log::debug!(
                "episode {}: {} steps, {} survivors, stability score {:?}",
                episode,
                outcome.steps,
                outcome.survivors,
                judgement.map(|(score, _)| score)
            );

            if let Some((score, stable)) = judgement {
                summary.last_score = Some(score);
                if stable {
                    summary.stop_reason = StopReason::Stabilized;
                    break;
                }
            }
        }

        if schedule.normalize {
            let episodes = summary.episodes as f32;
            for genome in self.genomes.values_mut() {
                let fitness = genome.fitness().unwrap_or(0.0);
                genome.set_fitness(fitness / episodes);
            }
        }
        summary
    }

    /// Reproduces and speciates the next generation.
    fn evolve(&mut self) -> Result<(), EvolutionError> {
        let offspring = self.reproduction.reproduce(
            &mut Breeding {
                config: &self.population_config,
                genetic_config: &self.genetic_config,
                history: &mut self.history,
                rng: &mut self.rng,
            },
            &mut self.species,
            &self.genomes,
            self.generation,
        );
        if self.species.is_empty() {
            return Err(EvolutionError::CompleteExtinction {
                generation: self.generation,
            });
        }
        log::debug!(
            "species after generation {}:\n{}",
            self.generation,
            self.species.report(self.generation)
        );

        self.genomes = offspring;
        self.generation += 1;
        self.species.speciate(
            &self.genomes,
            self.population_config.distance_threshold,
            &self.genetic_config,
            self.generation,
        );
        Ok(())
    }

    fn checkpoint(&mut self, force: bool) -> Result<(), CheckpointError>
    where
        Self: Serialize,
    {
        if let Some(mut checkpointer) = self.checkpointer.take() {
            let saved = if force {
                checkpointer.save(&*self, self.generation).map(Some)
            } else {
                checkpointer.end_generation(&*self, self.generation)
            };
            self.checkpointer = Some(checkpointer);
            saved?;
        }
        Ok(())
    }

    fn log_generation(&self) {
        match self.reporter.fitness_stats(self.reporter.generations().len() - 1) {
            Some(stats) => log::info!(
                "generation {}: {} genomes in {} species, best {:.3}, mean {:.3}, stdev {:.3}",
                self.generation,
                self.genomes.len(),
                self.species.len(),
                stats.maximum,
                stats.mean,
                stats.stdev
            ),
            None => log::info!("generation {}: no genomes", self.generation),
        }
    }

    /// Returns the currently best-performing genome, if
    /// any genome has been evaluated.
    pub fn champion(&self) -> Option<&G> {
        self.genomes
            .values()
            .filter(|g| g.fitness().is_some())
            .max_by(|g1, g2| {
                let (f1, f2) = (g1.fitness().unwrap_or(0.0), g2.fitness().unwrap_or(0.0));
                f1.total_cmp(&f2)
            })
    }

    /// Returns an iterator over all current genomes, in key order.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.genomes.values()
    }

    /// Returns a mutable iterator over all current genomes,
    /// in key order.
    pub fn genomes_mut(&mut self) -> impl Iterator<Item = &mut G> {
        self.genomes.values_mut()
    }

    /// Returns the genome identified by `key`, if it is
    /// part of the current generation.
    pub fn genome(&self, key: GenomeKey) -> Option<&G> {
        self.genomes.get(&key)
    }

    /// Returns the current species partition.
    pub fn species(&self) -> &SpeciesSet<G> {
        &self.species
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's fitness records.
    pub fn reporter(&self) -> &FitnessReporter<G> {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut FitnessReporter<G> {
        &mut self.reporter
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.population_config
    }

    pub fn genetic_config(&self) -> &C {
        &self.genetic_config
    }

    /// Returns the population's random number generator,
    /// for evaluations that need to be reproducible.
    pub fn rng(&mut self) -> &mut EvolutionRng {
        &mut self.rng
    }

    pub fn checkpointer(&self) -> Option<&Checkpointer> {
        self.checkpointer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episodes::{Controller, EpisodeOutcome};
    use crate::testing::{NoHistory, ScalarGenome};

    use rand::Rng;

    use std::num::NonZeroUsize;

    type TestPopulation<R = DefaultReproduction> = Population<(), NoHistory, ScalarGenome, R>;

    fn config(size: usize) -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(size).unwrap(),
            distance_threshold: 10.0,
            elitism: 1,
            survival_threshold: 0.5,
            stagnation_threshold: NonZeroUsize::new(15).unwrap(),
            species_elitism: 1,
            ..PopulationConfig::zero()
        }
    }

    fn assign_by_index<R: Reproduction<ScalarGenome>>(
        offset: f32,
    ) -> impl FnMut(&mut TestPopulation<R>) {
        move |population| {
            for (i, genome) in population.genomes_mut().enumerate() {
                genome.set_fitness(i as f32 + offset);
            }
        }
    }

    #[test]
    fn new_population_is_speciated() {
        let population = <TestPopulation>::new(config(6), ());
        assert_eq!(population.genomes().count(), 6);
        assert_eq!(population.generation(), 1);
        assert!(population
            .genomes()
            .all(|g| population.species().species_of(g.key).is_some()));
    }

    #[test]
    fn two_generation_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut population =
            <TestPopulation>::new(config(4), ()).with_checkpointer(Checkpointer::new(dir.path()));
        let mut generation = 0;
        population
            .run(
                |population| {
                    generation += 1;
                    let offset = if generation == 1 { 1.0 } else { 10.0 };
                    assign_by_index(offset)(population);
                },
                2,
            )
            .unwrap();

        assert_eq!(population.generation(), 3);
        assert_eq!(population.genomes().count(), 4);
        let best = population.reporter().best_genomes(1, true);
        assert_eq!(best[0].fitness, Some(13.0));
        assert_eq!(population.reporter().generations().len(), 2);

        let saved: Vec<usize> = checkpoint::list_checkpoints(dir.path())
            .unwrap()
            .into_iter()
            .map(|(g, _)| g)
            .collect();
        assert_eq!(saved, vec![3]);
    }

    #[test]
    fn size_holds_across_generations() {
        let cramped = PopulationConfig {
            distance_threshold: 0.0,
            min_species_size: 2,
            ..config(4)
        };
        for config in [cramped, PopulationConfig::default()] {
            let size = config.size.get();
            let mut population = <TestPopulation>::new(config, ());
            let mut sizes = vec![];
            population
                .run(
                    |population| {
                        sizes.push(population.genomes().count());
                        assign_by_index(1.0)(population);
                    },
                    5,
                )
                .unwrap();
            sizes.push(population.genomes().count());
            assert_eq!(sizes, vec![size; 6]);
        }
    }

    #[test]
    fn missing_fitness_aborts() {
        let mut population = <TestPopulation>::new(config(4), ());
        let result = population.run(
            |population| {
                if let Some(genome) = population.genomes_mut().next() {
                    genome.set_fitness(1.0);
                }
            },
            1,
        );
        assert!(matches!(
            result,
            Err(EvolutionError::MissingFitness { key: 1, generation: 1 })
        ));
        assert_eq!(population.generation(), 1);
        // The failed generation was started but never recorded.
        assert_eq!(population.reporter().generation(), 1);
        assert!(population.reporter().generations().is_empty());
    }

    #[test]
    fn carried_over_fitness_does_not_count() {
        let mut population = <TestPopulation>::new(config(4), ());
        population.run(assign_by_index(1.0), 1).unwrap();
        // Elites keep last generation's fitness until cleared.
        let result = population.run(|_| {}, 1);
        assert!(matches!(result, Err(EvolutionError::MissingFitness { .. })));
    }

    #[derive(Default, Serialize)]
    struct Extinction;

    impl Reproduction<ScalarGenome> for Extinction {
        fn create_new(
            &mut self,
            breeding: &mut Breeding<'_, (), NoHistory>,
            count: usize,
        ) -> BTreeMap<GenomeKey, ScalarGenome> {
            Reproduction::<ScalarGenome>::create_new(&mut DefaultReproduction::default(), breeding, count)
        }

        fn reproduce(
            &mut self,
            _: &mut Breeding<'_, (), NoHistory>,
            species: &mut SpeciesSet<ScalarGenome>,
            _: &BTreeMap<GenomeKey, ScalarGenome>,
            _: usize,
        ) -> BTreeMap<GenomeKey, ScalarGenome> {
            species.retain(|_| false);
            BTreeMap::new()
        }
    }

    #[test]
    fn extinction_stops_before_speciation_and_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut population = TestPopulation::<Extinction>::new(config(4), ())
            .with_checkpointer(Checkpointer::new(dir.path()).with_interval(1));
        let result = population.run(assign_by_index(1.0), 3);

        assert!(matches!(
            result,
            Err(EvolutionError::CompleteExtinction { generation: 1 })
        ));
        assert_eq!(population.generation(), 1);
        assert_eq!(population.genomes().count(), 4);
        assert!(population.species().is_empty());
        assert!(checkpoint::list_checkpoints(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn checkpoint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut population =
            <TestPopulation>::new(config(5), ()).with_checkpointer(Checkpointer::new(dir.path()));
        population.run(assign_by_index(1.0), 2).unwrap();

        let mut restored = <TestPopulation>::restore_latest(dir.path()).unwrap().unwrap();
        assert_eq!(restored.generation(), population.generation());
        assert_eq!(
            restored.genomes().collect::<Vec<_>>(),
            population.genomes().collect::<Vec<_>>()
        );
        let species = |p: &TestPopulation| p.species().iter().map(|s| s.id()).collect::<Vec<_>>();
        assert_eq!(species(&restored), species(&population));
        assert_eq!(
            restored.checkpointer().map(|c| c.last_saved_generation()),
            Some(3)
        );
        for _ in 0..4 {
            assert_eq!(restored.rng().gen::<u64>(), population.rng().gen::<u64>());
        }

        // Both continue identically.
        population.run(assign_by_index(2.0), 1).unwrap();
        restored.run(assign_by_index(2.0), 1).unwrap();
        assert_eq!(
            restored.genomes().collect::<Vec<_>>(),
            population.genomes().collect::<Vec<_>>()
        );
    }

    #[test]
    fn resumed_checkpointing_keeps_its_settings() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = || Checkpointer::new(dir.path()).with_interval(1).with_retained(2);
        let mut population = <TestPopulation>::new(config(4), ()).with_checkpointer(checkpointer());
        population.run(assign_by_index(1.0), 1).unwrap();

        let mut restored = <TestPopulation>::resume(checkpointer()).unwrap().unwrap();
        assert_eq!(restored.checkpointer(), Some(&checkpointer().resumed_at(2)));
        restored.run(assign_by_index(1.0), 3).unwrap();
        let saved: Vec<usize> = checkpoint::list_checkpoints(dir.path())
            .unwrap()
            .into_iter()
            .map(|(g, _)| g)
            .collect();
        assert_eq!(saved, vec![4, 5]);
    }

    struct Silent;

    impl Controller for Silent {
        fn activate(&mut self, _: &[f32]) -> Vec<f32> {
            vec![]
        }
    }

    /// Rewards each genome by its key every episode, plus
    /// a bonus for the last genome in selected episodes.
    struct KeyReward {
        bonus_episodes: Vec<usize>,
    }

    impl EpisodeRunner<ScalarGenome> for KeyReward {
        type Controller = Silent;

        fn controller_for(&self, _: &ScalarGenome) -> Silent {
            Silent
        }

        fn run_episode(
            &mut self,
            episode: usize,
            controllers: &mut [Silent],
            genomes: &mut [&mut ScalarGenome],
        ) -> EpisodeOutcome {
            for genome in genomes.iter_mut() {
                let reward = genome.key as f32;
                genome.add_fitness(reward);
            }
            if self.bonus_episodes.contains(&episode) {
                if let Some(first) = genomes.first_mut() {
                    first.add_fitness(100.0);
                }
            }
            EpisodeOutcome {
                steps: 1,
                survivors: controllers.len(),
            }
        }
    }

    #[test]
    fn evaluation_stops_once_ranking_is_stable() {
        let mut population = <TestPopulation>::new(config(4), ());
        population.reporter_mut().start_generation();
        let schedule = EpisodeSchedule {
            max_episodes: 5,
            min_episodes: 2,
            early_stop: EarlyStop::RankingStability {
                threshold: 0,
                window: 4,
            },
            normalize: true,
        };
        // The bonus reorders the ranking in episode 2 only.
        let mut runner = KeyReward {
            bonus_episodes: vec![2],
        };
        let summary = population.evaluate_episodes(&mut runner, &schedule);

        assert_eq!(summary.episodes, 3);
        assert_eq!(summary.stop_reason, StopReason::Stabilized);
        assert_eq!(summary.last_score, Some(0.0));
        let fitnesses: Vec<f32> = population.genomes().filter_map(|g| g.fitness).collect();
        assert_eq!(fitnesses, vec![100.0 / 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn evaluation_runs_every_episode_without_early_stop() {
        let mut population = <TestPopulation>::new(config(3), ());
        population.reporter_mut().start_generation();
        let schedule = EpisodeSchedule {
            max_episodes: 4,
            min_episodes: 1,
            early_stop: EarlyStop::Never,
            normalize: false,
        };
        let mut runner = KeyReward {
            bonus_episodes: vec![],
        };
        let summary = population.evaluate_episodes(&mut runner, &schedule);

        assert_eq!(summary.episodes, 4);
        assert_eq!(summary.stop_reason, StopReason::MaxEpisodes);
        let fitnesses: Vec<f32> = population.genomes().filter_map(|g| g.fitness).collect();
        assert_eq!(fitnesses, vec![0.0, 4.0, 8.0]);
        assert_eq!(population.reporter().deltas_of(2), vec![2.0; 4]);
    }

    #[test]
    fn best_mean_early_stop() {
        let mut population = <TestPopulation>::new(config(3), ());
        population.reporter_mut().start_generation();
        let schedule = EpisodeSchedule {
            max_episodes: 5,
            min_episodes: 2,
            early_stop: EarlyStop::BestMean {
                threshold_percent: 1.0,
                top_n: 2,
            },
            normalize: true,
        };
        let mut runner = KeyReward {
            bonus_episodes: vec![],
        };
        let summary = population.evaluate_episodes(&mut runner, &schedule);
        assert_eq!(summary.episodes, 2);
        assert_eq!(summary.stop_reason, StopReason::Stabilized);
    }
}
