//! Self-play game generation CLI.
//!
//! Plays learner-versus-opponent games with fixed weights and writes the
//! game records, leaf trajectories included, as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use expendibots::config::{init_tracing, load_config};
use expendibots::eval::{EvaluationContext, Weights};
use expendibots::protocol::records::{load_weights, write_game_json};
use expendibots::search::SearchVariant;
use expendibots::selfplay::{run_self_play_with_callback, Summary};

#[derive(Parser, Debug)]
#[command(name = "selfplay")]
#[command(about = "Generate self-play games as JSONL training data")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long)]
    games: Option<usize>,

    /// Search depth for both players
    #[arg(long)]
    depth: Option<u32>,

    /// Search variant (alphabeta or pvs)
    #[arg(long, value_parser = parse_variant)]
    variant: Option<SearchVariant>,

    /// Probability of a random learner move
    #[arg(long)]
    exploration: Option<f64>,

    /// Moves per side before a draw
    #[arg(long)]
    max_turns: Option<u32>,

    /// Number of parallel threads
    #[arg(long)]
    threads: Option<usize>,

    /// Random seed, 0 for entropy
    #[arg(long)]
    seed: Option<u64>,

    /// Weights file (JSON array); defaults to the built-in weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress per-game progress output
    #[arg(long)]
    quiet: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_variant(s: &str) -> Result<SearchVariant, String> {
    SearchVariant::from_name(s).ok_or_else(|| format!("unknown search variant '{}'", s))
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
    if let Some(v) = args.variant {
        config.learner.variant = v;
        config.opponent.variant = v;
    }
    if let Some(p) = args.exploration {
        config.learner.exploration = p;
    }
    if let Some(t) = args.max_turns {
        config.max_turns = t;
    }
    if let Some(t) = args.threads {
        config.threads = t;
    }
    if let Some(s) = args.seed {
        config.seed = s;
    }
    config.quiet |= args.quiet;

    let weights = match &args.weights {
        Some(path) => load_weights(path).with_context(|| format!("loading {}", path.display()))?,
        None => Weights::default(),
    };
    let ctx = EvaluationContext::new(weights);

    info!(
        games = config.num_games,
        depth = config.learner.depth,
        threads = config.threads,
        max_turns = config.max_turns,
        "starting self-play"
    );

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let start = Instant::now();
    let mut summary = Summary::default();
    let mut write_error = None;
    run_self_play_with_callback(&config, &ctx, |game| {
        summary.add(&game);
        if write_error.is_none() {
            if let Err(e) = write_game_json(&game, &mut writer) {
                write_error = Some(e);
            }
        }
    })?;
    if let Some(e) = write_error {
        return Err(e).context("writing game records");
    }
    writer.flush().context("flushing output")?;

    let elapsed = start.elapsed().as_secs_f64();
    info!(
        elapsed_secs = elapsed,
        games_per_hour = summary.games as f64 / elapsed.max(1e-9) * 3600.0,
        "{}",
        summary
    );
    Ok(())
}
