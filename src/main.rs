// TDQN command-line trainer
// Trains or evaluates a Double/Triple DQN agent on CartPole

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tdqn::config::TdqnConfig;
use tdqn::trainer::{RunOutcome, Trainer};

#[derive(Parser)]
#[command(name = "tdqn")]
#[command(about = "Double/Triple DQN trainer for CartPole", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new agent
    Train {
        /// JSON config file; unset fields keep their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Episode budget
        #[arg(short, long)]
        episodes: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Polyak-average the target networks instead of copying
        #[arg(long)]
        soft_update: bool,

        /// Skip the score chart
        #[arg(long)]
        no_plot: bool,
    },

    /// Run greedy episodes with a saved model
    Test {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Model file (defaults to the solved checkpoint)
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        #[arg(short, long, default_value = "10")]
        episodes: usize,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<TdqnConfig> {
    match path {
        Some(path) => TdqnConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(TdqnConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            config,
            episodes,
            seed,
            soft_update,
            no_plot,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(episodes) = episodes {
                config.episodes = episodes;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if soft_update {
                config.soft_update = true;
            }
            if no_plot {
                config.plot_dir = None;
            }

            let mut trainer = Trainer::cartpole(config).context("Failed to set up training")?;
            let summary = trainer.run().context("Training failed")?;
            match summary.outcome {
                RunOutcome::Solved { episode, checkpoint } => {
                    info!(episode, path = %checkpoint.display(), "solved");
                }
                RunOutcome::Exhausted { checkpoint } => {
                    info!(
                        episodes = summary.history.scores.len(),
                        path = %checkpoint.display(),
                        "not solved within the episode budget"
                    );
                }
            }
        }

        Commands::Test {
            config,
            checkpoint,
            episodes,
        } => {
            let config = load_config(config.as_ref())?;
            let checkpoint = checkpoint.unwrap_or_else(|| config.solved_checkpoint_path());

            let mut trainer = Trainer::cartpole(config).context("Failed to set up evaluation")?;
            trainer
                .agent_mut()
                .load(&checkpoint)
                .with_context(|| format!("Failed to load model from {}", checkpoint.display()))?;

            let scores = trainer.evaluate(episodes)?;
            let mean = scores.iter().sum::<usize>() as f64 / scores.len().max(1) as f64;
            info!(episodes = scores.len(), mean_score = format_args!("{:.2}", mean), "evaluation finished");
        }
    }

    Ok(())
}
