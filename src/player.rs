//! A configurable game-playing agent.
//!
//! Holds one side's view of the game: the position from its own perspective,
//! the repetition table of positions seen since the last detonation, and the
//! evaluation context used by its searches. Any search strategy is a matter
//! of [`PlayerConfig`].

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::board::{Action, Color, Position, Side};
use crate::eval::{EvaluationContext, Weights};
use crate::learn::Trajectory;
use crate::movegen::{random_action, MoveOrdering, RepetitionTable};
use crate::search::{search, SearchError, SearchOptions, SearchVariant};

/// Default search depth in plies.
const DEFAULT_DEPTH: u32 = 3;

/// Default total thinking time before falling back to a shallow search.
const DEFAULT_TIME_BUDGET_MS: u64 = 55_000;

/// How a player searches.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Search depth in plies.
    pub depth: u32,
    pub variant: SearchVariant,
    /// Base move ordering.
    pub ordering: MoveOrdering,
    /// Switch to the endgame ordering once fewer stacks than this remain.
    pub endgame_threshold: Option<u32>,
    /// Cumulative thinking time after which `fallback_depth` is used.
    pub time_budget_ms: Option<u64>,
    pub fallback_depth: u32,
    /// Search root children in parallel.
    pub parallel: bool,
    /// Record the predicted leaf of every search.
    pub record_leaves: bool,
    /// Probability of playing a uniformly random legal action.
    pub exploration: f64,
    /// RNG seed for exploration (0 = entropy).
    pub seed: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            depth: DEFAULT_DEPTH,
            variant: SearchVariant::AlphaBeta,
            ordering: MoveOrdering::Standard,
            endgame_threshold: None,
            time_budget_ms: Some(DEFAULT_TIME_BUDGET_MS),
            fallback_depth: 1,
            parallel: false,
            record_leaves: false,
            exploration: 0.0,
            seed: 0,
        }
    }
}

/// Statistics of the most recent search, for `info` output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchInfo {
    pub depth: u32,
    pub nodes: u64,
    pub score: f64,
    pub elapsed_ms: u64,
}

pub struct Player {
    color: Color,
    position: Position,
    visited: RepetitionTable,
    ctx: EvaluationContext,
    config: PlayerConfig,
    thinking: Duration,
    trajectory: Trajectory,
    last_search: Option<SearchInfo>,
    rng: SmallRng,
}

impl Player {
    /// Creates a player for `color` at the start position.
    pub fn new(color: Color, ctx: EvaluationContext, config: PlayerConfig) -> Self {
        let rng = if config.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(config.seed)
        };
        let position = Position::start(color);
        let mut visited = RepetitionTable::new();
        visited.record(&position);
        Player {
            color,
            position,
            visited,
            ctx,
            config,
            thinking: Duration::ZERO,
            trajectory: Trajectory::new(),
            last_search: None,
            rng,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The current position from this player's perspective.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.ctx
    }

    pub fn set_weights(&mut self, weights: Weights) {
        self.ctx.weights = weights;
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlayerConfig {
        &mut self.config
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Takes the recorded trajectory, leaving an empty one behind.
    pub fn take_trajectory(&mut self) -> Trajectory {
        std::mem::take(&mut self.trajectory)
    }

    pub fn last_search(&self) -> Option<&SearchInfo> {
        self.last_search.as_ref()
    }

    /// Total time spent searching so far.
    pub fn thinking_time(&self) -> Duration {
        self.thinking
    }

    /// Depth used by the next search.
    pub fn depth(&self) -> u32 {
        if self.over_budget() {
            self.config.fallback_depth.max(1)
        } else {
            self.config.depth.max(1)
        }
    }

    fn over_budget(&self) -> bool {
        match self.config.time_budget_ms {
            Some(ms) => self.thinking >= Duration::from_millis(ms),
            None => false,
        }
    }

    /// Chooses the next action for this player's own side.
    pub fn action(&mut self) -> Result<Action, SearchError> {
        if self.position.is_terminal() {
            return Err(SearchError::GameOver);
        }

        let p = self.config.exploration.clamp(0.0, 1.0);
        if p > 0.0 && self.rng.gen_bool(p) {
            if let Some(action) = random_action(&self.position, Side::Own, &mut self.rng) {
                debug!(color = self.color.name(), %action, "exploring");
                self.last_search = None;
                return Ok(action);
            }
        }

        let depth = self.depth();
        let options = SearchOptions {
            variant: self.config.variant,
            ordering: self
                .config
                .ordering
                .for_position(&self.position, self.config.endgame_threshold),
            parallel: self.config.parallel,
        };

        let was_over_budget = self.over_budget();
        let started = Instant::now();
        let outcome = search(&self.position, depth, &self.ctx, Side::Own, &self.visited, options)?;
        let elapsed = started.elapsed();
        self.thinking += elapsed;

        if self.config.record_leaves {
            self.trajectory.push(outcome.leaf);
        }
        self.last_search = Some(SearchInfo {
            depth,
            nodes: outcome.nodes,
            score: outcome.value,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        if !was_over_budget && self.over_budget() {
            info!(
                color = self.color.name(),
                thinking_ms = self.thinking.as_millis() as u64,
                fallback_depth = self.config.fallback_depth,
                "time budget exhausted"
            );
        }

        Ok(outcome.action)
    }

    /// Applies an action played by `color`, which may be either side.
    pub fn update(&mut self, color: Color, action: &Action) {
        let side = self.color.relative(color);
        if action.is_boom() {
            // Detonations remove tokens, so no earlier position can recur.
            self.visited.clear();
        }
        self.position = self.position.apply_action(action, side);
        self.visited.record(&self.position);
    }

    /// How often the current position has occurred since the last detonation.
    pub fn repetitions(&self) -> u32 {
        self.visited.count(&self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn sq(x: usize, y: usize) -> Square {
        Square::from_xy(x, y).unwrap()
    }

    fn quick() -> PlayerConfig {
        PlayerConfig {
            depth: 1,
            seed: 7,
            ..PlayerConfig::default()
        }
    }

    #[test]
    fn starts_from_own_perspective() {
        let white = Player::new(Color::White, EvaluationContext::default(), quick());
        let black = Player::new(Color::Black, EvaluationContext::default(), quick());
        assert_eq!(*white.position(), Position::start(Color::White));
        assert_eq!(*black.position(), Position::start(Color::Black));
        assert_eq!(white.repetitions(), 1);
    }

    #[test]
    fn both_views_stay_mirrored() {
        let mut white = Player::new(Color::White, EvaluationContext::default(), quick());
        let mut black = Player::new(Color::Black, EvaluationContext::default(), quick());
        for turn in 0..6 {
            let mover = if turn % 2 == 0 { Color::White } else { Color::Black };
            let action = if mover == Color::White {
                white.action().unwrap()
            } else {
                black.action().unwrap()
            };
            white.update(mover, &action);
            black.update(mover, &action);
            assert_eq!(white.position().flipped(), *black.position());
        }
    }

    #[test]
    fn records_leaves_when_asked() {
        let config = PlayerConfig {
            record_leaves: true,
            ..quick()
        };
        let mut player = Player::new(Color::White, EvaluationContext::default(), config);
        let action = player.action().unwrap();
        player.update(Color::White, &action);
        assert_eq!(player.trajectory().len(), 1);
        assert!(player.last_search().is_some());
        let taken = player.take_trajectory();
        assert_eq!(taken.len(), 1);
        assert!(player.trajectory().is_empty());
    }

    #[test]
    fn detonation_clears_history() {
        let mut player = Player::new(Color::White, EvaluationContext::default(), quick());
        for (from, to) in [(sq(0, 1), sq(0, 2)), (sq(0, 2), sq(0, 3))] {
            player.update(Color::White, &Action::Move { n: 1, from, to });
        }
        player.update(Color::White, &Action::Boom { at: sq(0, 3) });
        assert_eq!(player.repetitions(), 1);
        assert_eq!(player.position().tokens(Side::Own), 11);
    }

    #[test]
    fn zero_budget_falls_back_after_first_search() {
        let config = PlayerConfig {
            depth: 2,
            time_budget_ms: Some(0),
            fallback_depth: 1,
            ..quick()
        };
        let player = Player::new(Color::White, EvaluationContext::default(), config);
        // Zero elapsed time already meets a zero budget.
        assert_eq!(player.depth(), 1);
        let unlimited = PlayerConfig {
            depth: 2,
            time_budget_ms: None,
            ..quick()
        };
        let player = Player::new(Color::White, EvaluationContext::default(), unlimited);
        assert_eq!(player.depth(), 2);
    }

    #[test]
    fn full_exploration_plays_legal_random_actions() {
        let config = PlayerConfig {
            exploration: 1.0,
            record_leaves: true,
            ..quick()
        };
        let mut player = Player::new(Color::White, EvaluationContext::default(), config);
        let legal = crate::movegen::legal_actions(player.position(), Side::Own);
        let action = player.action().unwrap();
        assert!(legal.contains(&action));
        assert!(player.trajectory().is_empty());
    }
}
