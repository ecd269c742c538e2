use crate::arena::{ArenaConfig, Role};

use anyhow::{ensure, Context};
use pursuit_neat::{EpisodeSchedule, PopulationConfig};
use pursuit_neat_nn::genomics::{ActivationType, GeneticConfig};
use serde::{Deserialize, Serialize};

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

/// Everything a training session is configured by,
/// read from a RON file. Missing fields take their
/// default values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Shared by the monster and player populations.
    pub population: PopulationConfig,
    pub monster_genetics: GeneticConfig,
    pub player_genetics: GeneticConfig,
    pub schedule: EpisodeSchedule,
    pub arena: ArenaConfig,
    /// Rounds of training, each training monsters then players.
    pub trainings: usize,
    /// Generations run by every monster training.
    pub generations: usize,
    /// Additional generations run by player trainings.
    pub player_extra_generations: usize,
    /// Number of best genomes of a training faced
    /// as opponents by the next one.
    pub opponent_pool: usize,
    /// Number of best fitnesses per generation printed
    /// after each training.
    pub reported_fitnesses: usize,
}

impl TrainerConfig {
    /// Reads the configuration at `path`, or returns
    /// the default one if there is no such file.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or parsed,
    /// or if the configuration is [invalid](Self::validate).
    pub fn load(path: &Path) -> anyhow::Result<TrainerConfig> {
        let config = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration {:?}", path))?;
            ron::from_str(&text).with_context(|| format!("invalid configuration {:?}", path))?
        } else {
            log::warn!("no configuration at {:?}, using defaults", path);
            TrainerConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that each role's networks match what
    /// the arena feeds them and expects back.
    pub fn validate(&self) -> anyhow::Result<()> {
        for role in [Role::Monster, Role::Player] {
            let genetics = self.genetics(role);
            ensure!(
                genetics.input_count.get() == role.input_count(),
                "{} networks observe {} values, not {}",
                role,
                role.input_count(),
                genetics.input_count
            );
            ensure!(
                genetics.output_count.get() == role.output_count(),
                "{} networks produce {} values, not {}",
                role,
                role.output_count(),
                genetics.output_count
            );
            ensure!(
                !genetics.activation_types.is_empty() && !genetics.output_activation_types.is_empty(),
                "{} genetics need at least one activation type for hidden and output nodes",
                role
            );
        }
        ensure!(self.opponent_pool > 0, "the opponent pool can't be empty");
        Ok(())
    }

    pub fn genetics(&self, role: Role) -> &GeneticConfig {
        match role {
            Role::Monster => &self.monster_genetics,
            Role::Player => &self.player_genetics,
        }
    }

    pub fn generations(&self, role: Role) -> usize {
        match role {
            Role::Monster => self.generations,
            Role::Player => self.generations + self.player_extra_generations,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            population: PopulationConfig::default(),
            monster_genetics: default_genetics(Role::Monster),
            player_genetics: default_genetics(Role::Player),
            schedule: EpisodeSchedule::default(),
            arena: ArenaConfig::default(),
            trainings: 1,
            generations: 50,
            player_extra_generations: 6,
            opponent_pool: 10,
            reported_fitnesses: 5,
        }
    }
}

/// Feed-forward sigmoid networks starting fully connected.
fn default_genetics(role: Role) -> GeneticConfig {
    GeneticConfig {
        input_count: NonZeroUsize::new(role.input_count()).unwrap_or(NonZeroUsize::MIN),
        output_count: NonZeroUsize::new(role.output_count()).unwrap_or(NonZeroUsize::MIN),
        activation_types: vec![ActivationType::Sigmoid],
        output_activation_types: vec![ActivationType::Sigmoid],
        child_mutation_chance: 0.65,
        mate_by_averaging_chance: 0.4,
        suppression_reset_chance: 1.0,
        initial_expression_chance: 1.0,
        weight_bound: 5.0,
        weight_reset_chance: 0.2,
        weight_nudge_chance: 0.9,
        weight_mutation_power: 2.5,
        node_addition_mutation_chance: 0.03,
        gene_addition_mutation_chance: 0.05,
        max_gene_addition_mutation_attempts: 20,
        recursion_chance: 0.0,
        excess_gene_factor: 1.0,
        disjoint_gene_factor: 1.0,
        common_weight_factor: 0.4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pursuit_neat::EarlyStop;

    #[test]
    fn defaults_are_valid() {
        let config = TrainerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.generations(Role::Monster), 50);
        assert_eq!(config.generations(Role::Player), 56);
        assert_eq!(config.genetics(Role::Player).input_count.get(), 6);
    }

    #[test]
    fn partial_configuration_keeps_defaults() {
        let text = r#"(
            generations: 3,
            schedule: (
                max_episodes: 2,
                min_episodes: 1,
                early_stop: Never,
                normalize: false,
            ),
            arena: (base_steps: 100),
        )"#;
        let config: TrainerConfig = ron::from_str(text).unwrap();
        assert_eq!(config.generations, 3);
        assert_eq!(config.schedule.early_stop, EarlyStop::Never);
        assert_eq!(config.arena.base_steps, 100);
        assert_eq!(config.arena.width, 1080.0);
        assert_eq!(config.opponent_pool, 10);
        assert_eq!(config.monster_genetics, default_genetics(Role::Monster));
    }

    #[test]
    fn bundled_configuration_matches_defaults() {
        let config: TrainerConfig = ron::from_str(include_str!("../pursuit.ron")).unwrap();
        config.validate().unwrap();
        assert_eq!(config, TrainerConfig::default());
    }

    #[test]
    fn mismatched_networks_are_rejected() {
        let mut config = TrainerConfig::default();
        config.monster_genetics.output_count = NonZeroUsize::new(2).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainerConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, TrainerConfig::default());
    }

    #[test]
    fn configuration_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trainer.ron");
        let mut config = TrainerConfig::default();
        config.trainings = 4;
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        fs::write(&path, text).unwrap();
        assert_eq!(TrainerConfig::load(&path).unwrap(), config);
    }
}
