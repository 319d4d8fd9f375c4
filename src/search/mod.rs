//! Adversarial search.
//!
//! Negamax with fail-soft alpha-beta pruning, an optional principal-variation
//! variant, and a root-parallel driver. Every search reports the leaf of its
//! principal line alongside the chosen action.

pub mod negamax;
mod parallel;

use crate::board::{Action, Position, Side};
use crate::eval::EvaluationContext;
use crate::movegen::{MoveOrdering, RepetitionTable};

pub use negamax::Searcher;

/// Which pruning scheme the searcher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchVariant {
    #[default]
    #[serde(alias = "ab")]
    AlphaBeta,
    #[serde(rename = "pvs")]
    PrincipalVariation,
}

impl SearchVariant {
    pub fn from_name(s: &str) -> Option<SearchVariant> {
        match s.to_ascii_lowercase().as_str() {
            "alphabeta" | "ab" => Some(SearchVariant::AlphaBeta),
            "pvs" | "principalvariation" => Some(SearchVariant::PrincipalVariation),
            _ => None,
        }
    }
}

/// Knobs for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub variant: SearchVariant,
    pub ordering: MoveOrdering,
    /// Search root children on the rayon pool.
    pub parallel: bool,
}

/// Result of a search from the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Value from the perspective of the side to move at the root.
    pub value: f64,
    pub action: Action,
    /// Position at the bottom of the principal line.
    pub leaf: Position,
    pub nodes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("no legal actions for {side:?} in a non-terminal position")]
    NoLegalActions { side: Side },

    #[error("the game is already over")]
    GameOver,
}

/// Searches `pos` to `depth` plies for `side` with a fresh [`Searcher`].
pub fn search(
    pos: &Position,
    depth: u32,
    ctx: &EvaluationContext,
    side: Side,
    visited: &RepetitionTable,
    options: SearchOptions,
) -> Result<SearchOutcome, SearchError> {
    Searcher::new(ctx, options).search(pos, depth, side, visited)
}
