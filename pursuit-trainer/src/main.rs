//! Trains monsters to catch players and players to escape
//! monsters, alternately, with NEAT.
mod arena;
mod config;
mod training;

use config::TrainerConfig;
use training::Trainer;

use clap::Parser;

use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON training configuration; defaults are used if it doesn't exist
    #[arg(short, long, default_value = "pursuit.ron")]
    config: PathBuf,
    /// Directory holding each role's checkpoints and best genome
    #[arg(short = 'd', long, default_value = ".")]
    checkpoint_root: PathBuf,
    /// Number of training rounds, overriding the configuration
    #[arg(short, long)]
    trainings: Option<usize>,
    /// Discard existing checkpoints and start both populations from scratch
    #[arg(long)]
    fresh: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = TrainerConfig::load(&args.config)?;
    if let Some(trainings) = args.trainings {
        config.trainings = trainings;
    }
    Trainer::new(config, args.checkpoint_root, args.fresh).run()
}
