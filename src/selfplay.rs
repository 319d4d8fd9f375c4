//! Self-play game generation and online training.
//!
//! Plays full games between two [`Player`]s under a referee that enforces
//! the draw rules, records the learner's leaf trajectory for every game, and
//! feeds finished trajectories to TD-Leaf(λ).

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::board::{Action, Color, Outcome, Position};
use crate::eval::{EvaluationContext, Weights};
use crate::learn::{td_leaf_update, TdLeafParams, Trajectory};
use crate::movegen::{RepetitionTable, REPETITION_DRAW_COUNT};
use crate::player::{Player, PlayerConfig};
use crate::protocol::records::{save_weights, RecordError};
use crate::search::SearchError;

/// Moves per side after which a game is drawn.
pub const DEFAULT_MAX_TURNS: u32 = 250;

/// Configuration for self-play and training runs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Moves per side before the game is drawn.
    pub max_turns: u32,
    /// The player whose leaves are recorded and trained on.
    pub learner: PlayerConfig,
    pub opponent: PlayerConfig,
    pub tdleaf: TdLeafParams,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Save weights here after every training game.
    pub weights_out: Option<PathBuf>,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            max_turns: DEFAULT_MAX_TURNS,
            learner: PlayerConfig {
                record_leaves: true,
                ..PlayerConfig::default()
            },
            opponent: PlayerConfig::default(),
            tdleaf: TdLeafParams::default(),
            threads: 1,
            seed: 0,
            weights_out: None,
            quiet: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// At least one side has no tokens left.
    Annihilation,
    /// The same position with the same side to move occurred four times.
    Repetition,
    /// Both sides used up their move allowance.
    TurnLimit,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::Annihilation => "annihilation",
            EndReason::Repetition => "repetition",
            EndReason::TurnLimit => "turn limit",
        };
        f.write_str(s)
    }
}

/// Result of one refereed game, from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: Outcome,
    pub plies: u32,
    pub end: EndReason,
}

/// A completed self-play game, from the learner's perspective.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameRecord {
    pub game_id: usize,
    /// Color played by the learner.
    pub learner: Color,
    pub outcome: Outcome,
    pub plies: u32,
    pub end: EndReason,
    /// Learner leaves, closed by the synthetic terminal of `outcome`.
    pub leaves: Trajectory,
}

/// Tracks the authoritative board and the official draw rules.
#[derive(Debug, Clone)]
pub struct Referee {
    /// Board from White's perspective.
    board: Position,
    to_move: Color,
    /// Occurrence counts, one table per side to move.
    seen: [RepetitionTable; 2],
    plies: u32,
    max_turns: u32,
}

impl Referee {
    pub fn new(max_turns: u32) -> Self {
        let board = Position::start(Color::White);
        let mut seen = [RepetitionTable::new(), RepetitionTable::new()];
        seen[Color::White as usize].record(&board);
        Referee {
            board,
            to_move: Color::White,
            seen,
            plies: 0,
            max_turns,
        }
    }

    pub fn board(&self) -> &Position {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn plies(&self) -> u32 {
        self.plies
    }

    /// Returns the result if the game is over.
    pub fn status(&self) -> Option<(Outcome, EndReason)> {
        if let Some(outcome) = self.board.outcome() {
            return Some((outcome, EndReason::Annihilation));
        }
        if self.seen[self.to_move as usize].count(&self.board) >= REPETITION_DRAW_COUNT {
            return Some((Outcome::Draw, EndReason::Repetition));
        }
        if self.plies >= 2 * self.max_turns {
            return Some((Outcome::Draw, EndReason::TurnLimit));
        }
        None
    }

    /// Applies an action by the side to move and returns the new status.
    pub fn apply(&mut self, action: &Action) -> Option<(Outcome, EndReason)> {
        let side = Color::White.relative(self.to_move);
        self.board = self.board.apply_action(action, side);
        self.to_move = self.to_move.other();
        self.plies += 1;
        self.seen[self.to_move as usize].record(&self.board);
        self.status()
    }
}

/// Plays one game between two players to completion.
///
/// Both players must be fresh for their colors; each is told about every
/// action, its own included.
pub fn play_game(
    white: &mut Player,
    black: &mut Player,
    max_turns: u32,
) -> Result<GameResult, SearchError> {
    let mut referee = Referee::new(max_turns);
    loop {
        if let Some((outcome, end)) = referee.status() {
            return Ok(GameResult {
                outcome,
                plies: referee.plies(),
                end,
            });
        }
        let mover = referee.to_move();
        let action = match mover {
            Color::White => white.action()?,
            Color::Black => black.action()?,
        };
        white.update(mover, &action);
        black.update(mover, &action);
        referee.apply(&action);
    }
}

/// Derives a per-player seed, keeping 0 as "use entropy".
fn player_seed(base: u64, game_id: usize, salt: u64) -> u64 {
    if base == 0 {
        0
    } else {
        base.wrapping_add((game_id as u64) << 1).wrapping_add(salt)
    }
}

/// Plays one learner-versus-opponent game. The learner takes White in
/// even-numbered games and Black in odd ones.
pub fn play_training_game(
    config: &SelfPlayConfig,
    ctx: &EvaluationContext,
    game_id: usize,
) -> Result<GameRecord, SearchError> {
    let learner_color = if game_id % 2 == 0 {
        Color::White
    } else {
        Color::Black
    };
    let learner_config = PlayerConfig {
        record_leaves: true,
        seed: player_seed(config.seed, game_id, 0),
        ..config.learner.clone()
    };
    let opponent_config = PlayerConfig {
        record_leaves: false,
        seed: player_seed(config.seed, game_id, 1),
        ..config.opponent.clone()
    };

    let mut learner = Player::new(learner_color, ctx.clone(), learner_config);
    let mut opponent = Player::new(learner_color.other(), ctx.clone(), opponent_config);

    let result = match learner_color {
        Color::White => play_game(&mut learner, &mut opponent, config.max_turns)?,
        Color::Black => play_game(&mut opponent, &mut learner, config.max_turns)?,
    };
    let outcome = match learner_color {
        Color::White => result.outcome,
        Color::Black => result.outcome.flipped(),
    };

    let mut leaves = learner.take_trajectory();
    leaves.finish(outcome);
    Ok(GameRecord {
        game_id,
        learner: learner_color,
        outcome,
        plies: result.plies,
        end: result.end,
        leaves,
    })
}

fn log_game(game: &GameRecord, done: usize, total: usize, elapsed_secs: f64) {
    info!(
        game = done,
        total,
        learner = game.learner.name(),
        outcome = ?game.outcome,
        plies = game.plies,
        end = %game.end,
        elapsed_secs,
        "game complete"
    );
}

/// Plays `config.num_games` games and returns the records in completion order.
pub fn run_self_play(
    config: &SelfPlayConfig,
    ctx: &EvaluationContext,
) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, ctx, |g| games.push(g))?;
    Ok(games)
}

/// Plays games and hands each finished record to `on_game`.
///
/// When `config.threads > 1`, games are played concurrently on a rayon pool
/// and delivered to `on_game` on the calling thread. Weights are read-only
/// for the whole run.
pub fn run_self_play_with_callback<F>(
    config: &SelfPlayConfig,
    ctx: &EvaluationContext,
    on_game: F,
) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord),
{
    if config.threads > 1 {
        run_self_play_parallel(config, ctx, on_game)
    } else {
        run_self_play_sequential(config, ctx, on_game)
    }
}

fn run_self_play_sequential<F>(
    config: &SelfPlayConfig,
    ctx: &EvaluationContext,
    mut on_game: F,
) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let game = play_training_game(config, ctx, i)?;
        if !config.quiet {
            log_game(&game, i + 1, config.num_games, started.elapsed().as_secs_f64());
        }
        on_game(game);
    }
    Ok(())
}

fn run_self_play_parallel<F>(
    config: &SelfPlayConfig,
    ctx: &EvaluationContext,
    mut on_game: F,
) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord),
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord, SearchError>>();

    std::thread::scope(|scope| {
        let completed = &completed;
        scope.spawn(move || {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let started = Instant::now();
                        let game = play_training_game(config, ctx, i);
                        if let Ok(game) = &game {
                            let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            if !config.quiet {
                                log_game(game, n, config.num_games, started.elapsed().as_secs_f64());
                            }
                        }
                        let _ = tx.send(game);
                    });
            });
        });

        // Drain every game so the workers never block, keeping the first error.
        let mut first_error = None;
        for game in rx {
            match game {
                Ok(game) => on_game(game),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(SelfPlayError::Search(e)),
            None => Ok(()),
        }
    })
}

/// Online training: plays games one at a time and applies a TD-Leaf(λ)
/// update to the learner's trajectory after each.
///
/// Both players use the current weights. `on_game` sees each record with
/// the weights produced by it.
pub fn train<F>(
    config: &SelfPlayConfig,
    weights: Weights,
    mut on_game: F,
) -> Result<Weights, SelfPlayError>
where
    F: FnMut(&GameRecord, &Weights),
{
    let mut ctx = EvaluationContext::new(weights);
    for i in 0..config.num_games {
        let started = Instant::now();
        let game = play_training_game(config, &ctx, i)?;
        ctx.weights = td_leaf_update(&ctx.weights, game.leaves.leaves(), config.tdleaf);
        debug!(game = i + 1, weights = ?ctx.weights.values(), "weights updated");

        if let Some(path) = &config.weights_out {
            save_weights(path, &ctx.weights)?;
        }
        if !config.quiet {
            log_game(&game, i + 1, config.num_games, started.elapsed().as_secs_f64());
        }
        on_game(&game, &ctx.weights);
    }
    Ok(ctx.weights)
}

/// Aggregate results over a batch of games, from the learner's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total_plies: u64,
}

impl Summary {
    pub fn add(&mut self, game: &GameRecord) {
        self.games += 1;
        self.total_plies += game.plies as u64;
        match game.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn average_plies(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_plies as f64 / self.games as f64
        }
    }
}

impl<'a> FromIterator<&'a GameRecord> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a GameRecord>>(iter: I) -> Self {
        let mut s = Summary::default();
        for game in iter {
            s.add(game);
        }
        s
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: {} wins, {} losses, {} draws, {:.1} plies on average",
            self.games,
            self.wins,
            self.losses,
            self.draws,
            self.average_plies()
        )
    }
}
