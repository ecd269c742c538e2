//! Monsters and players take turns evolving, each
//! training against the best genomes of the last.
use crate::arena::{Arena, Role};
use crate::config::TrainerConfig;

use anyhow::Context;
use pursuit_neat::checkpoint::list_checkpoints;
use pursuit_neat::reporting::FitnessReporter;
use pursuit_neat::{Checkpointer, Genome, Population};
use pursuit_neat_nn::genomics::{GeneticConfig, History, NNGenome};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

type RolePopulation = Population<GeneticConfig, History, NNGenome>;

/// Yields `(round, role)` for every training of
/// `trainings` rounds, monsters first in each round.
pub fn schedule(trainings: usize) -> impl Iterator<Item = (usize, Role)> {
    (1..=trainings).flat_map(|round| [(round, Role::Monster), (round, Role::Player)])
}

/// The `n` fittest genomes ever recorded by `reporter`, each
/// genome counted once however many generations it lived.
pub fn best_unique_genomes(reporter: &FitnessReporter<NNGenome>, n: usize) -> Vec<NNGenome> {
    let mut seen = BTreeSet::new();
    reporter
        .best_genomes(usize::MAX, true)
        .into_iter()
        .filter(|genome| seen.insert(genome.key()))
        .take(n)
        .cloned()
        .collect()
}

/// Runs trainings, keeping each role's population in its
/// own checkpoint directory under a common root.
pub struct Trainer {
    config: TrainerConfig,
    root: PathBuf,
    fresh: bool,
    opponents: Vec<NNGenome>,
}

impl Trainer {
    /// Creates a trainer storing checkpoints and winning
    /// genomes under `root`. With `fresh` set, the first
    /// training of each role discards its checkpoints
    /// instead of resuming from them.
    pub fn new(config: TrainerConfig, root: impl Into<PathBuf>, fresh: bool) -> Trainer {
        Trainer {
            config,
            root: root.into(),
            fresh,
            opponents: vec![],
        }
    }

    pub fn checkpoint_directory(&self, role: Role) -> PathBuf {
        self.root.join(format!("checkpoint_{}", role))
    }

    pub fn winner_path(&self, role: Role) -> PathBuf {
        self.root.join(format!("winner_{}.ron", role))
    }

    /// Runs every configured training round.
    ///
    /// # Errors
    /// Returns an error if a population can't be restored
    /// or fails to evolve, or a winner can't be saved.
    pub fn run(&mut self) -> anyhow::Result<()> {
        for (round, role) in schedule(self.config.trainings) {
            log::info!("training {}s, round {}", role, round);
            let winner = self.train(role, self.fresh && round == 1)?;
            println!("\nBest {} genome of round {}:\n{}", role, round, winner);
            self.save_winner(role, &winner)?;
        }
        Ok(())
    }

    /// Evolves the `role` population against the current
    /// opponents, whose place is then taken by its best
    /// genomes. Returns the best genome.
    pub fn train(&mut self, role: Role, fresh: bool) -> anyhow::Result<NNGenome> {
        let directory = self.checkpoint_directory(role);
        let mut population = self.load_population(role, &directory, fresh)?;
        let seed = self
            .config
            .population
            .seed
            .wrapping_add(population.generation() as u64);
        let mut arena = Arena::new(role, self.config.arena.clone(), &self.opponents, seed);
        if arena.opponent_count() == 0 {
            log::warn!("no {} networks to train against, using scripted ones", role.opponent());
        }

        let schedule = &self.config.schedule;
        population
            .run(
                |population| {
                    let summary = population.evaluate_episodes(&mut arena, schedule);
                    log::info!(
                        "{} generation {} evaluated over {} episodes ({:?}, last score {:?})",
                        arena.role(),
                        population.generation(),
                        summary.episodes,
                        summary.stop_reason,
                        summary.last_score
                    );
                },
                self.config.generations(role),
            )
            .with_context(|| format!("{} training failed", role))?;

        population
            .reporter()
            .print_best_fitnesses(self.config.reported_fitnesses);
        self.opponents = best_unique_genomes(population.reporter(), self.config.opponent_pool);
        log::info!(
            "{} best {}s kept as opponents",
            self.opponents.len(),
            role
        );
        self.opponents
            .first()
            .cloned()
            .with_context(|| format!("no {} genome was evaluated", role))
    }

    fn load_population(
        &self,
        role: Role,
        directory: &Path,
        fresh: bool,
    ) -> anyhow::Result<RolePopulation> {
        if fresh {
            discard_checkpoints(directory)?;
        } else if let Some(population) = RolePopulation::restore_latest(directory)
            .with_context(|| format!("failed to restore the {} population", role))?
        {
            log::info!(
                "resuming {} training at generation {}",
                role,
                population.generation()
            );
            return Ok(population);
        }

        log::warn!("creating a new {} population from scratch", role);
        Ok(RolePopulation::new(
            self.config.population.clone(),
            self.config.genetics(role).clone(),
        )
        .with_checkpointer(Checkpointer::new(directory)))
    }

    fn save_winner(&self, role: Role, winner: &NNGenome) -> anyhow::Result<PathBuf> {
        let path = self.winner_path(role);
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {:?}", self.root))?;
        let text = ron::ser::to_string_pretty(winner, ron::ser::PrettyConfig::new())
            .with_context(|| format!("failed to serialize the best {}", role))?;
        fs::write(&path, text).with_context(|| format!("failed to write {:?}", path))?;
        log::info!("saved the best {} to {:?}", role, path);
        Ok(path)
    }
}

fn discard_checkpoints(directory: &Path) -> anyhow::Result<()> {
    if !directory.exists() {
        return Ok(());
    }
    for (generation, path) in list_checkpoints(directory)? {
        log::info!("discarding checkpoint of generation {}", generation);
        fs::remove_file(&path).with_context(|| format!("failed to remove {:?}", path))?;
    }
    Ok(())
}
