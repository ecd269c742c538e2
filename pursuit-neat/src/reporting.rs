//! Multi-episode fitness bookkeeping and
//! cross-generation fitness statistics.
//!
//! Within a generation, genomes are evaluated over several
//! episodes. The [`FitnessReporter`] records the fitness each
//! genome earned in every episode separately, which lets callers
//! judge whether further episodes would still change the outcome
//! of selection.
mod stats;

pub use stats::Stats;

use crate::Genome;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::time::Instant;

/// Default number of top genomes whose rank
/// changes are tracked between episodes.
pub const DEFAULT_RANKING_WINDOW: usize = 20;

/// How much the fitness ranking moved during the last episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankingShift {
    /// Sum of the rank changes of the previous top genomes.
    pub displacement: usize,
    /// How many of the previous top genomes
    /// fell out of the current top.
    pub dropped: usize,
}

/// Collects per-episode fitness deltas during a generation,
/// and every evaluated generation afterwards.
///
/// Within a generation, calls must follow
/// `start_generation`, then any number of
/// `start_episode`/`end_episode` pairs, then `end_generation`.
/// The genomes passed to `end_episode` must come in the same
/// order every time within one generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FitnessReporter<G> {
    generation: usize,
    episode: usize,
    #[serde(skip)]
    episode_started: Option<Instant>,
    episode_deltas: Vec<Vec<f32>>,
    totals: Vec<f32>,
    generations: Vec<Vec<G>>,
}

impl<G> Default for FitnessReporter<G> {
    fn default() -> Self {
        FitnessReporter {
            generation: 0,
            episode: 0,
            episode_started: None,
            episode_deltas: vec![],
            totals: vec![],
            generations: vec![],
        }
    }
}

impl<G: Genome + Clone> FitnessReporter<G> {
    /// Returns an empty reporter.
    pub fn new() -> FitnessReporter<G> {
        Self::default()
    }

    /// Opens a new, empty, fitness ledger.
    pub fn start_generation(&mut self) {
        self.generation += 1;
        self.episode = 0;
        self.episode_deltas.clear();
        self.totals.clear();
    }

    /// Marks the start of a new episode.
    pub fn start_episode(&mut self) {
        self.episode += 1;
        self.episode_started = Some(Instant::now());
    }

    /// Records the fitness each genome earned during the episode
    /// that just ended, as the difference between its current
    /// fitness and everything it had earned before.
    ///
    /// Unset fitness is read as 0.
    ///
    /// # Panics
    /// Panics if the number of genomes differs from previous
    /// episodes in the same generation.
    ///
    /// # Examples
    /// ```
    /// # use pursuit_neat_nn::genomics::{GeneticConfig, History, NNGenome};
    /// # use pursuit_neat::{seeded_rng, Genome, InnovationHistory};
    /// use pursuit_neat::reporting::FitnessReporter;
    ///
    /// # let config = GeneticConfig::zero();
    /// # let mut history = History::new(&config);
    /// # let mut rng = seeded_rng(0);
    /// let mut genome = NNGenome::new(0, &config, &mut history, &mut rng);
    /// let mut reporter = FitnessReporter::new();
    /// reporter.start_generation();
    ///
    /// reporter.start_episode();
    /// genome.set_fitness(3.0);
    /// reporter.end_episode([&genome]);
    ///
    /// reporter.start_episode();
    /// genome.set_fitness(7.5);
    /// reporter.end_episode([&genome]);
    ///
    /// assert_eq!(reporter.deltas_of(0), vec![3.0, 4.5]);
    /// ```
    pub fn end_episode<'g, I>(&mut self, genomes: I)
    where
        I: IntoIterator<Item = &'g G>,
        G: 'g,
    {
        let current: Vec<f32> = genomes
            .into_iter()
            .map(|g| g.fitness().unwrap_or(0.0))
            .collect();
        if self.totals.is_empty() {
            self.totals = vec![0.0; current.len()];
        }
        assert_eq!(
            current.len(),
            self.totals.len(),
            "genome count changed within generation {}",
            self.generation
        );

        let deltas = current
            .iter()
            .zip(&self.totals)
            .map(|(now, before)| now - before)
            .collect();
        self.episode_deltas.push(deltas);
        self.totals = current;

        if let Some(started) = self.episode_started.take() {
            log::debug!(
                "generation {} episode {} took {:.2?}",
                self.generation,
                self.episode,
                started.elapsed()
            );
        }
    }

    /// Returns how far the previous top genomes moved in the fitness
    /// ranking because of the last episode, or `None` if fewer than
    /// two episodes have been recorded.
    ///
    /// Only the `window` best genomes as of the previous episode are
    /// tracked. A genome missing from `genomes` counts as displaced to
    /// the end of the ranking, but tied genomes are ranked by position
    /// rather than as displaced: an episode that changes no fitness,
    /// ties included, then always scores a displacement of 0.
    pub fn compute_evolution_ranking<'g, I>(&self, genomes: I, window: usize) -> Option<RankingShift>
    where
        I: IntoIterator<Item = &'g G>,
        G: 'g,
    {
        let last = self.last_deltas()?;
        let current: Vec<f32> = genomes
            .into_iter()
            .map(|g| g.fitness().unwrap_or(0.0))
            .collect();
        let previous: Vec<f32> = (0..last.len())
            .map(|i| current.get(i).copied().unwrap_or(f32::NEG_INFINITY) - last[i])
            .collect();

        let previous_order = ranking(&previous);
        let current_order = ranking(&current);
        let mut current_rank = vec![None; previous.len()];
        for (rank, &i) in current_order.iter().enumerate() {
            if let Some(slot) = current_rank.get_mut(i) {
                *slot = Some(rank);
            }
        }

        let window = window.min(previous.len());
        let mut shift = RankingShift {
            displacement: 0,
            dropped: 0,
        };
        for (rank, &i) in previous_order[..window].iter().enumerate() {
            let now = current_rank[i].unwrap_or(previous.len());
            shift.displacement += now.abs_diff(rank);
            if now >= window {
                shift.dropped += 1;
            }
        }
        Some(shift)
    }

    /// Returns the mean absolute percentage change, caused by the
    /// last episode, of the `top_n` best mean per-episode fitnesses.
    /// Returns `None` if fewer than two episodes have been recorded.
    ///
    /// A change from 0 counts as 0% if the value stayed at 0
    /// and 100% otherwise.
    pub fn compute_evolution_best_mean(&self, top_n: usize) -> Option<f32> {
        let last = self.last_deltas()?;
        let episodes = self.episode_deltas.len() as f32;

        let mut now: Vec<f32> = self.totals.iter().map(|t| t / episodes).collect();
        let mut before: Vec<f32> = self
            .totals
            .iter()
            .zip(last)
            .map(|(t, d)| (t - d) / (episodes - 1.0))
            .collect();
        now.sort_by(|a, b| b.total_cmp(a));
        before.sort_by(|a, b| b.total_cmp(a));

        let top_n = top_n.min(now.len());
        if top_n == 0 {
            return Some(0.0);
        }
        let changes: Vec<f32> = now[..top_n]
            .iter()
            .zip(&before[..top_n])
            .map(|(now, before)| {
                if *before == 0.0 {
                    if *now == 0.0 {
                        0.0
                    } else {
                        100.0
                    }
                } else {
                    ((now - before) / before).abs() * 100.0
                }
            })
            .collect();
        Some(stats::mean(&changes))
    }

    /// Stores the generation's genomes, best first.
    pub fn end_generation<'g, I>(&mut self, genomes: I)
    where
        I: IntoIterator<Item = &'g G>,
        G: 'g,
    {
        let mut sorted: Vec<G> = genomes.into_iter().cloned().collect();
        sorted.sort_by(|a, b| fitness(b).total_cmp(&fitness(a)));
        self.generations.push(sorted);
        self.episode = 0;
    }

    /// Returns the deltas recorded for the genome at `position`
    /// during the current generation, one per episode.
    pub fn deltas_of(&self, position: usize) -> Vec<f32> {
        self.episode_deltas
            .iter()
            .filter_map(|deltas| deltas.get(position).copied())
            .collect()
    }

    /// Returns the number of episodes started in the current generation.
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Returns the number of generations started so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the `n` fittest genomes, best first, either ever
    /// recorded or only in the last recorded generation.
    /// Equally fit genomes keep the order they were recorded in.
    pub fn best_genomes(&self, n: usize, all_generations: bool) -> Vec<&G> {
        if all_generations {
            let mut all: Vec<&G> = self.generations.iter().flatten().collect();
            all.sort_by(|a, b| fitness(*b).total_cmp(&fitness(*a)));
            all.truncate(n);
            all
        } else {
            self.generations
                .last()
                .map(|genomes| genomes.iter().take(n).collect())
                .unwrap_or_default()
        }
    }

    /// Returns every recorded generation, each sorted best first.
    pub fn generations(&self) -> &[Vec<G>] {
        &self.generations
    }

    /// Returns the mean fitness of the `generation`th recorded
    /// generation (0-based), if it exists.
    pub fn fitness_mean(&self, generation: usize) -> Option<f32> {
        self.fitness_stats(generation).map(|s| s.mean)
    }

    /// Returns the fitness standard deviation of the `generation`th
    /// recorded generation (0-based), if it exists.
    pub fn fitness_stdev(&self, generation: usize) -> Option<f32> {
        self.fitness_stats(generation).map(|s| s.stdev)
    }

    /// Returns fitness statistics of the `generation`th
    /// recorded generation (0-based), if it exists.
    pub fn fitness_stats(&self, generation: usize) -> Option<Stats> {
        let genomes = self.generations.get(generation)?;
        Stats::from(genomes.iter().map(fitness))
    }

    /// Returns a printable table of the `n` best fitnesses
    /// of every recorded generation, with their mean.
    pub fn best_fitness_table(&self, n: usize) -> BestFitnessTable {
        BestFitnessTable {
            columns: n,
            rows: self
                .generations
                .iter()
                .map(|genomes| genomes.iter().take(n).map(fitness).collect())
                .collect(),
        }
    }

    /// Prints [`best_fitness_table`](Self::best_fitness_table) to stdout.
    pub fn print_best_fitnesses(&self, n: usize) {
        println!("{}", self.best_fitness_table(n));
    }

    fn last_deltas(&self) -> Option<&[f32]> {
        if self.episode_deltas.len() < 2 {
            return None;
        }
        self.episode_deltas.last().map(Vec::as_slice)
    }
}

fn fitness<G: Genome>(genome: &G) -> f32 {
    genome.fitness().unwrap_or(f32::NEG_INFINITY)
}

/// Indices of `values`, highest value first.
fn ranking(values: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));
    order
}

/// The best fitnesses of each generation.
#[derive(Clone, Debug)]
pub struct BestFitnessTable {
    columns: usize,
    rows: Vec<Vec<f32>>,
}

impl fmt::Display for BestFitnessTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top {} fitness per generation:", self.columns)?;
        write!(f, "  MEAN  ")?;
        for i in 0..self.columns {
            write!(f, "| Genome_{:<3}", i + 1)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            let mean = if row.is_empty() { 0.0 } else { stats::mean(row) };
            write!(f, " {:<7.2}", mean)?;
            for fitness in row {
                write!(f, "|  {:<9.2}", fitness)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{evaluated, ScalarGenome};

    fn reporter_after(episodes: &[&[f32]]) -> (FitnessReporter<ScalarGenome>, Vec<ScalarGenome>) {
        let mut reporter = FitnessReporter::new();
        let mut genomes = vec![];
        reporter.start_generation();
        for cumulative in episodes {
            reporter.start_episode();
            genomes = evaluated(cumulative);
            reporter.end_episode(&genomes);
        }
        (reporter, genomes)
    }

    #[test]
    fn end_episode_records_deltas() {
        let (reporter, _) = reporter_after(&[&[3.0, 1.0], &[7.5, 1.0], &[8.0, 4.0]]);
        assert_eq!(reporter.deltas_of(0), vec![3.0, 4.5, 0.5]);
        assert_eq!(reporter.deltas_of(1), vec![1.0, 0.0, 3.0]);
        for i in 0..2 {
            let total: f32 = reporter.deltas_of(i).iter().sum();
            assert_eq!(total, [8.0, 4.0][i]);
        }
    }

    #[test]
    fn start_generation_resets_ledger() {
        let (mut reporter, _) = reporter_after(&[&[3.0], &[5.0]]);
        reporter.start_generation();
        reporter.start_episode();
        reporter.end_episode(&evaluated(&[2.0]));
        assert_eq!(reporter.deltas_of(0), vec![2.0]);
        assert_eq!(reporter.generation(), 2);
    }

    #[test]
    #[should_panic]
    fn end_episode_rejects_changed_genome_count() {
        let (mut reporter, _) = reporter_after(&[&[3.0, 1.0]]);
        reporter.start_episode();
        reporter.end_episode(&evaluated(&[3.0]));
    }

    #[test]
    fn stability_needs_two_episodes() {
        let (reporter, genomes) = reporter_after(&[&[3.0, 1.0]]);
        assert_eq!(reporter.compute_evolution_ranking(&genomes, DEFAULT_RANKING_WINDOW), None);
        assert_eq!(reporter.compute_evolution_best_mean(5), None);
    }

    #[test]
    fn identical_episodes_are_stable() {
        let (reporter, genomes) = reporter_after(&[&[1.0, 3.0, 2.0, 2.0], &[2.0, 6.0, 4.0, 4.0]]);
        let shift = reporter
            .compute_evolution_ranking(&genomes, DEFAULT_RANKING_WINDOW)
            .unwrap();
        assert_eq!(shift, RankingShift { displacement: 0, dropped: 0 });
        assert_eq!(reporter.compute_evolution_best_mean(3), Some(0.0));
    }

    #[test]
    fn ties_do_not_count_as_displacement() {
        let (reporter, genomes) = reporter_after(&[&[2.0, 2.0, 2.0], &[4.0, 4.0, 4.0]]);
        for window in 1..=3 {
            let shift = reporter.compute_evolution_ranking(&genomes, window).unwrap();
            assert_eq!(shift, RankingShift { displacement: 0, dropped: 0 });
        }
    }

    #[test]
    fn ranking_counts_displacement_and_drops() {
        // Before the last episode: 3 > 2 > 1 > 0. After: 0 > 3 > 2 > 1.
        let (reporter, genomes) = reporter_after(&[&[0.0, 1.0, 2.0, 3.0], &[10.0, 1.0, 2.0, 3.0]]);
        let shift = reporter.compute_evolution_ranking(&genomes, 2).unwrap();
        // Genome 3 moves from 0 to 1, genome 2 from 1 to 2 and out of the top 2.
        assert_eq!(shift, RankingShift { displacement: 2, dropped: 1 });

        let shift = reporter.compute_evolution_ranking(&genomes, 4).unwrap();
        assert_eq!(shift, RankingShift { displacement: 6, dropped: 0 });
    }

    #[test]
    fn best_mean_measures_percentage_change() {
        // Means before: [2.0, 0.0], now: [3.0, 0.0].
        let (reporter, _) = reporter_after(&[&[2.0, 0.0], &[6.0, 0.0]]);
        assert_eq!(reporter.compute_evolution_best_mean(1), Some(50.0));
        assert_eq!(reporter.compute_evolution_best_mean(2), Some(25.0));

        let (reporter, _) = reporter_after(&[&[0.0], &[4.0]]);
        assert_eq!(reporter.compute_evolution_best_mean(1), Some(100.0));
    }

    #[test]
    fn best_genomes_are_ordered() {
        let mut reporter = FitnessReporter::new();
        reporter.end_generation(&evaluated(&[1.0, 4.0, 2.0]));
        reporter.end_generation(&evaluated(&[3.0, 0.5]));

        let all: Vec<f32> = reporter
            .best_genomes(10, true)
            .iter()
            .filter_map(|g| g.fitness)
            .collect();
        assert_eq!(all, vec![4.0, 3.0, 2.0, 1.0, 0.5]);

        let last: Vec<f32> = reporter
            .best_genomes(1, false)
            .iter()
            .filter_map(|g| g.fitness)
            .collect();
        assert_eq!(last, vec![3.0]);
    }

    #[test]
    fn best_genomes_breaks_ties_by_record_order() {
        let mut reporter = FitnessReporter::new();
        reporter.end_generation(&evaluated(&[2.0, 2.0]));
        reporter.end_generation(&evaluated(&[5.0, 2.0]));
        let keys: Vec<_> = reporter.best_genomes(4, true).iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![0, 0, 1, 1]);
    }

    #[test]
    fn generation_statistics() {
        let mut reporter = FitnessReporter::new();
        reporter.end_generation(&evaluated(&[1.0, 3.0]));
        assert_eq!(reporter.fitness_mean(0), Some(2.0));
        assert_eq!(reporter.fitness_stdev(0), Some(1.0));
        assert_eq!(reporter.fitness_mean(1), None);
    }

    #[test]
    fn best_fitness_table_has_a_row_per_generation() {
        let mut reporter = FitnessReporter::new();
        reporter.end_generation(&evaluated(&[1.0, 3.0, 2.0]));
        reporter.end_generation(&evaluated(&[4.0]));
        let table = reporter.best_fitness_table(2).to_string();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Genome_2"));
        assert!(lines[2].starts_with(" 2.50"));
        assert!(lines[3].starts_with(" 4.00"));
    }
}
