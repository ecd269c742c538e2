//! The contract between a population and the
//! environment its genomes are evaluated in.
use crate::{Genome, GenomeKey};

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// A decision-maker built from a genome (its phenotype).
pub trait Controller {
    /// Maps an observation to an action.
    fn activate(&mut self, inputs: &[f32]) -> Vec<f32>;
}

/// What happened during one episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpisodeOutcome {
    /// Number of simulation steps taken.
    pub steps: usize,
    /// Number of controlled entities still alive at the end.
    pub survivors: usize,
}

/// An environment that evaluates genomes over bounded episodes.
pub trait EpisodeRunner<G: Genome> {
    type Controller: Controller;

    /// Builds the controller that will act for `genome`.
    fn controller_for(&self, genome: &G) -> Self::Controller;

    /// Simulates one episode, the `episode`th of the generation
    /// (1-based).
    ///
    /// `controllers[i]` acts for `genomes[i]`. Implementations must
    /// only ever add to or subtract from the genomes' fitness, must
    /// not reorder either slice, and must end the episode within
    /// a bounded number of steps.
    fn run_episode(
        &mut self,
        episode: usize,
        controllers: &mut [Self::Controller],
        genomes: &mut [&mut G],
    ) -> EpisodeOutcome;
}

/// When to stop running episodes before the maximum is reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EarlyStop {
    /// Never stop early.
    Never,
    /// Stop once the previous top `window` genomes move, in total,
    /// no more than `threshold` places in the ranking.
    RankingStability { threshold: usize, window: usize },
    /// Stop once the `top_n` best mean fitnesses change by less
    /// than `threshold_percent` percent.
    BestMean { threshold_percent: f32, top_n: usize },
}

impl Default for EarlyStop {
    fn default() -> Self {
        EarlyStop::RankingStability {
            threshold: 50,
            window: crate::reporting::DEFAULT_RANKING_WINDOW,
        }
    }
}

/// How many episodes a generation is evaluated over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSchedule {
    /// Upper bound on episodes per generation.
    pub max_episodes: usize,
    /// Episodes always run before early stopping is considered.
    pub min_episodes: usize,
    pub early_stop: EarlyStop,
    /// Whether to divide each genome's accumulated fitness
    /// by the number of episodes run.
    pub normalize: bool,
}

impl Default for EpisodeSchedule {
    fn default() -> Self {
        EpisodeSchedule {
            max_episodes: 5,
            min_episodes: 2,
            early_stop: EarlyStop::default(),
            normalize: true,
        }
    }
}

/// Why the evaluation of a generation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The maximum number of episodes was run.
    MaxEpisodes,
    /// The early stopping criterion was met.
    Stabilized,
}

/// The result of evaluating a generation over several episodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationSummary {
    pub episodes: usize,
    /// The last stability score computed, if any: a ranking
    /// displacement or a percentage change, depending on
    /// the early stopping criterion.
    pub last_score: Option<f32>,
    pub stop_reason: StopReason,
}

/// Controllers for every genome, in key order.
pub(crate) fn build_controllers<G, R>(runner: &R, genomes: &BTreeMap<GenomeKey, G>) -> Vec<R::Controller>
where
    G: Genome,
    R: EpisodeRunner<G>,
{
    genomes.values().map(|g| runner.controller_for(g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PopulationConfig;

    #[test]
    fn schedule_from_json() {
        let schedule: EpisodeSchedule = serde_json::from_str(
            r#"{
                "max_episodes": 8,
                "min_episodes": 3,
                "early_stop": { "BestMean": { "threshold_percent": 2.5, "top_n": 4 } },
                "normalize": false
            }"#,
        )
        .unwrap();
        assert_eq!(
            schedule.early_stop,
            EarlyStop::BestMean {
                threshold_percent: 2.5,
                top_n: 4
            }
        );
        assert_eq!(schedule.max_episodes, 8);

        let text = serde_json::to_string(&EpisodeSchedule::default()).unwrap();
        assert!(text.contains(r#""RankingStability":{"threshold":50"#));
        let parsed: EpisodeSchedule = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, EpisodeSchedule::default());
    }

    #[test]
    fn empty_population_is_rejected() {
        let mut value = serde_json::to_value(PopulationConfig::default()).unwrap();
        value["size"] = serde_json::json!(0);
        assert!(serde_json::from_value::<PopulationConfig>(value).is_err());
    }
}
