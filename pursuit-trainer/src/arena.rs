//! The pursuit arena: monsters chase players across a
//! bounded field.
//!
//! Every genome of the population being trained controls
//! one entity of its [`Role`], paired in a duel against one
//! opponent. Opponents are networks built from the other
//! role's best genomes, or scripted when there are none:
//! scripted monsters head straight for their player and
//! scripted players wander at random.
mod body;

pub use body::{Body, Direction, Field, Wander};

use pursuit_neat::{seeded_rng, Controller, EpisodeOutcome, EpisodeRunner, EvolutionRng, Genome};
use pursuit_neat_nn::genomics::NNGenome;
use pursuit_neat_nn::networks::RealTimeNetwork;

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// The side of the chase a population evolves for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Monster,
    Player,
}

impl Role {
    pub fn opponent(self) -> Role {
        match self {
            Role::Monster => Role::Player,
            Role::Player => Role::Monster,
        }
    }

    /// Number of values observed by a network of this role.
    pub fn input_count(self) -> usize {
        match self {
            Role::Monster => 4,
            Role::Player => 6,
        }
    }

    /// Number of values produced by a network of this role.
    pub fn output_count(self) -> usize {
        match self {
            Role::Monster => Direction::ALL.len(),
            Role::Player => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Monster => write!(f, "monster"),
            Role::Player => write!(f, "player"),
        }
    }
}

/// Geometry, lives, step budget and reward shaping of the arena.
///
/// Rewards go to the entity being trained:
/// - `survival_reward` every step it is alive,
/// - `wall_penalty` taken every step it is against an edge,
/// - `contact_reward` every step the monster touches the player,
///   gained by monsters and taken from players,
/// - `elimination_bonus` for each step left in the budget
///   when its opponent is eliminated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Height of the band at the top entities can't enter.
    pub stats_height: f32,
    pub entity_size: f32,
    /// Distance covered by a move, in any direction.
    pub speed: f32,
    /// Minimum distance between spawn points and the screen edges.
    pub spawn_margin: f32,
    /// Steps a monster can spend against the edges.
    pub monster_life: u32,
    /// Steps a player can spend touching its monster.
    pub player_life: u32,
    /// Step budget of the first episode of a generation is
    /// `base_steps + steps_per_episode`, growing by
    /// `steps_per_episode` every following episode.
    pub base_steps: usize,
    pub steps_per_episode: usize,
    pub survival_reward: f32,
    pub contact_reward: f32,
    pub wall_penalty: f32,
    pub elimination_bonus: f32,
}

impl ArenaConfig {
    /// Returns the step budget of the `episode`th
    /// episode (1-based) of a generation.
    pub fn step_budget(&self, episode: usize) -> usize {
        self.base_steps + episode * self.steps_per_episode
    }

    pub fn field(&self) -> Field {
        Field {
            width: self.width,
            height: self.height,
            top: self.stats_height,
            entity_size: self.entity_size,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            width: 1080.0,
            height: 720.0,
            stats_height: 100.0,
            entity_size: 50.0,
            speed: 0.25,
            spawn_margin: 100.0,
            monster_life: 3000,
            player_life: 100,
            base_steps: 1500,
            steps_per_episode: 100,
            survival_reward: 0.1,
            contact_reward: 0.1,
            wall_penalty: 0.01,
            elimination_bonus: 0.1,
        }
    }
}

/// One monster facing one player.
#[derive(Clone, Debug)]
struct Duel {
    monster: Body,
    player: Body,
    monster_life: u32,
    player_life: u32,
    /// Index of the opponent network, `None` if scripted.
    opponent: Option<usize>,
    wander: Wander,
    active: bool,
}

impl Duel {
    fn monster_view(&self, field: &Field) -> [f32; 4] {
        [
            self.player.y / field.height,
            self.monster.y / field.height,
            self.player.x / field.width,
            self.monster.x / field.width,
        ]
    }

    fn player_view(&self, field: &Field) -> [f32; 6] {
        [
            (self.monster.x - self.player.x) / field.width,
            (self.monster.y - self.player.y) / field.height,
            self.player.x / field.width,
            self.player.y / field.height,
            (field.width - self.player.x) / field.width,
            (field.height - self.player.y) / field.height,
        ]
    }

    /// Remaining lives of the trained entity and its opponent.
    fn lives(&self, role: Role) -> (u32, u32) {
        match role {
            Role::Monster => (self.monster_life, self.player_life),
            Role::Player => (self.player_life, self.monster_life),
        }
    }
}

/// The environment genomes are evaluated in.
pub struct Arena {
    role: Role,
    config: ArenaConfig,
    field: Field,
    opponents: Vec<RealTimeNetwork>,
    duels: Vec<Duel>,
    rng: EvolutionRng,
}

impl Arena {
    /// Creates an arena training `role` against networks
    /// built from `opponents`, genomes of the opposite role.
    /// Spawn points and scripted moves are drawn from `seed`.
    ///
    /// # Panics
    /// Panics if an opponent doesn't have as many inputs
    /// as the opposite role observes.
    pub fn new(role: Role, config: ArenaConfig, opponents: &[NNGenome], seed: u64) -> Arena {
        let opponents: Vec<RealTimeNetwork> = opponents.iter().map(RealTimeNetwork::from).collect();
        assert!(
            opponents
                .iter()
                .all(|network| network.input_count() == role.opponent().input_count()),
            "opponents of {}s must be {} networks",
            role,
            role.opponent()
        );
        Arena {
            role,
            field: config.field(),
            config,
            opponents,
            duels: vec![],
            rng: seeded_rng(seed),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Number of opponent networks, 0 when
    /// opponents are scripted.
    pub fn opponent_count(&self) -> usize {
        self.opponents.len()
    }

    /// Sets up `count` duels. All monsters start on the same
    /// spot, and so do all players.
    fn spawn(&mut self, count: usize) {
        let monster = self.spawn_point();
        let player = self.spawn_point();
        let opponent_count = self.opponents.len();
        self.duels.clear();
        for _ in 0..count {
            let opponent = if opponent_count > 0 {
                Some(self.rng.gen_range(0..opponent_count))
            } else {
                None
            };
            self.duels.push(Duel {
                monster,
                player,
                monster_life: self.config.monster_life,
                player_life: self.config.player_life,
                opponent,
                wander: Wander::new(self.config.speed, &mut self.rng),
                active: true,
            });
        }
    }

    fn spawn_point(&mut self) -> Body {
        let margin = self.config.spawn_margin;
        let x = self.rng.gen_range(margin..=(self.config.width - margin).max(margin));
        let y = self.rng.gen_range(margin..=(self.config.height - margin).max(margin));
        let mut body = Body::new(x, y);
        self.field.clamp(&mut body);
        body
    }

    /// Advances the `index`th duel by one step, `remaining`
    /// steps being left in the budget afterwards.
    fn step_duel(
        &mut self,
        index: usize,
        controller: &mut RealTimeNetwork,
        genome: &mut NNGenome,
        remaining: usize,
    ) {
        let Arena {
            role,
            config,
            field,
            opponents,
            duels,
            rng,
        } = self;
        let duel = &mut duels[index];

        let monster_view = duel.monster_view(field);
        let player_view = duel.player_view(field);
        let (monster_outputs, player_outputs) = match role {
            Role::Monster => (
                Some(controller.activate(&monster_view)),
                duel.opponent.map(|o| opponents[o].activate(&player_view)),
            ),
            Role::Player => (
                duel.opponent.map(|o| opponents[o].activate(&monster_view)),
                Some(controller.activate(&player_view)),
            ),
        };

        let monster_move = match monster_outputs {
            Some(outputs) => Direction::strongest(&outputs),
            None => Direction::towards(&duel.monster, &duel.player),
        };
        if let Some(direction) = monster_move {
            field.step(&mut duel.monster, direction, config.speed);
        }
        match player_outputs {
            Some(outputs) => {
                if let Some(direction) = Direction::from_axes(&outputs) {
                    field.step(&mut duel.player, direction, config.speed);
                }
            }
            None => duel
                .wander
                .advance(&mut duel.player, field, config.speed, rng),
        }

        let mut reward = config.survival_reward;
        let trained = match role {
            Role::Monster => &duel.monster,
            Role::Player => &duel.player,
        };
        if field.touches_wall(trained) {
            reward -= config.wall_penalty;
        }
        if field.touches_wall(&duel.monster) {
            duel.monster_life = duel.monster_life.saturating_sub(1);
        }
        if field.overlaps(&duel.monster, &duel.player) {
            duel.player_life = duel.player_life.saturating_sub(1);
            reward += match role {
                Role::Monster => config.contact_reward,
                Role::Player => -config.contact_reward,
            };
        }

        match duel.lives(*role) {
            (0, _) => duel.active = false,
            (_, 0) => {
                reward += config.elimination_bonus * remaining as f32;
                duel.active = false;
            }
            _ => {}
        }
        genome.add_fitness(reward);
    }
}

impl EpisodeRunner<NNGenome> for Arena {
    type Controller = RealTimeNetwork;

    fn controller_for(&self, genome: &NNGenome) -> RealTimeNetwork {
        RealTimeNetwork::from(genome)
    }

    /// Runs every duel until its budget runs out or one side
    /// of it is eliminated. Eliminated duels are flagged during
    /// a step and dropped from the live set after it, so
    /// indices into `controllers` and `genomes` never shift.
    fn run_episode(
        &mut self,
        episode: usize,
        controllers: &mut [RealTimeNetwork],
        genomes: &mut [&mut NNGenome],
    ) -> EpisodeOutcome {
        assert_eq!(
            controllers.len(),
            genomes.len(),
            "every genome needs a controller"
        );
        self.spawn(genomes.len());
        let budget = self.config.step_budget(episode);

        let mut live: Vec<usize> = (0..self.duels.len()).collect();
        let mut steps = 0;
        while steps < budget && !live.is_empty() {
            steps += 1;
            for &index in &live {
                self.step_duel(
                    index,
                    &mut controllers[index],
                    &mut *genomes[index],
                    budget - steps,
                );
            }
            live.retain(|&index| self.duels[index].active);
        }

        let role = self.role;
        let survivors = self
            .duels
            .iter()
            .filter(|duel| duel.lives(role).0 > 0)
            .count();
        log::debug!(
            "{} episode {}: {} steps, {} of {} duels still running, {} survivors",
            role,
            episode,
            steps,
            live.len(),
            self.duels.len(),
            survivors
        );
        EpisodeOutcome { steps, survivors }
    }
}
