//! Expendibots player speaking the line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logs go to stderr.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use expendibots::config::{init_tracing, load_config};
use expendibots::engine::Engine;
use expendibots::protocol::parser::{parse_command, Command};

#[derive(Parser, Debug)]
#[command(name = "expendibots")]
#[command(about = "Expendibots player speaking the line protocol on stdin/stdout")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Weights file (JSON array), overrides the config
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Search depth, overrides the config
    #[arg(long)]
    depth: Option<u32>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    init_tracing(&config.log_level);

    if let Some(depth) = args.depth {
        config.player.depth = depth.max(1);
    }
    let mut engine = Engine::new(config.player);
    if let Some(path) = args.weights.or(config.weights) {
        engine
            .load_weights(&path)
            .with_context(|| format!("loading weights from {}", path.display()))?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::Init { color } => {
                engine.init(color);
            }
            Command::Weights { path } => {
                if let Err(e) = engine.load_weights(&path) {
                    warn!(error = %e, "weights not loaded");
                }
            }
            Command::SetOption { name, value } => {
                engine.set_option(&name, value.as_deref());
            }
            Command::IsReady => {
                engine.handle_isready(&mut out)?;
            }
            Command::Action { depth } => {
                engine.handle_action(depth, &mut out)?;
            }
            Command::Update { color, action } => {
                engine.update(color, &action);
            }
            Command::Quit => {
                info!("quit");
                break;
            }
        }
    }
    Ok(())
}
