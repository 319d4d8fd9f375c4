//! Board representation and game-state types.
//!
//! Contains squares, sides, actions, positions, and chain-reaction
//! resolution for detonations.

pub mod action;
pub mod explosion;
pub mod position;
pub mod square;

pub use action::{Action, ActionId, ActionIdError, BOOM_TAG, MOVE_TAG};
pub use explosion::{blast_radius, explosion_closure, CellSet};
pub use position::{Outcome, Position, PositionError, TOKENS_PER_SIDE};
pub use square::{Color, Side, Square, BOARD_SIZE, CELL_COUNT};
