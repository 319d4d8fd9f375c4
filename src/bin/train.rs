//! TD-Leaf(λ) training CLI.
//!
//! Online mode plays games one at a time and updates the weights after
//! each. Offline mode replays a JSONL file of recorded games instead.
//!
//! Usage:
//!   cargo run --release --bin train -- --output weights.json [OPTIONS]
//!   cargo run --release --bin train -- --offline games.jsonl --output weights.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use expendibots::config::{init_tracing, load_config};
use expendibots::eval::{Weights, FEATURE_NAMES};
use expendibots::learn::train_offline;
use expendibots::protocol::records::{load_weights, read_jsonl_file, save_weights};
use expendibots::selfplay::{train, Summary};

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Train evaluation weights with TD-Leaf(lambda)")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting weights (JSON array); defaults to the built-in weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Start from uniform random weights in [-scale, scale) instead
    #[arg(long, conflicts_with = "weights")]
    random_scale: Option<f64>,

    /// Where to write the trained weights
    #[arg(long)]
    output: PathBuf,

    /// Train from recorded games in this JSONL file instead of playing
    #[arg(long)]
    offline: Option<PathBuf>,

    /// Number of games to play (online mode)
    #[arg(long)]
    games: Option<usize>,

    /// Search depth for both players
    #[arg(long)]
    depth: Option<u32>,

    /// Temporal discount lambda
    #[arg(long)]
    lambda: Option<f64>,

    /// Learning rate alpha
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Probability of a random learner move
    #[arg(long)]
    exploration: Option<f64>,

    /// Random seed, 0 for entropy
    #[arg(long)]
    seed: Option<u64>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = load_config(args.config.as_deref())?.selfplay;
    if let Some(n) = args.games {
        config.num_games = n;
    }
    if let Some(d) = args.depth {
        config.learner.depth = d;
        config.opponent.depth = d;
    }
    if let Some(l) = args.lambda {
        config.tdleaf.lambda = l;
    }
    if let Some(a) = args.learning_rate {
        config.tdleaf.learning_rate = a;
    }
    if let Some(p) = args.exploration {
        config.learner.exploration = p;
    }
    if let Some(s) = args.seed {
        config.seed = s;
    }
    config.weights_out = Some(args.output.clone());

    let initial = match (&args.weights, args.random_scale) {
        (Some(path), _) => load_weights(path).with_context(|| format!("loading {}", path.display()))?,
        (None, Some(scale)) => {
            let mut rng = if config.seed == 0 {
                SmallRng::from_entropy()
            } else {
                SmallRng::seed_from_u64(config.seed)
            };
            Weights::random(&mut rng, scale)
        }
        (None, None) => Weights::default(),
    };

    let trained = match &args.offline {
        Some(path) => {
            let games = read_jsonl_file(path).with_context(|| format!("reading {}", path.display()))?;
            info!(games = games.len(), "offline training");
            let trained = train_offline(&initial, games.iter().map(|g| &g.leaves), config.tdleaf);
            save_weights(&args.output, &trained)?;
            trained
        }
        None => {
            info!(
                games = config.num_games,
                lambda = config.tdleaf.lambda,
                learning_rate = config.tdleaf.learning_rate,
                "online training"
            );
            let mut summary = Summary::default();
            let trained = train(&config, initial, |game, _| summary.add(game))?;
            info!("{}", summary);
            trained
        }
    };

    for (name, w) in FEATURE_NAMES.iter().zip(trained.values()) {
        info!(feature = *name, weight = *w, "trained weight");
    }
    info!(path = %args.output.display(), "weights saved");
    Ok(())
}
