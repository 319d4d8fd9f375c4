//! Action types.
//!
//! An action is either a move of `n` tokens along a rank or file, or a
//! detonation. The serde representation is the external action identifier
//! exchanged with game runners: `["MOVE", n, [x1, y1], [x2, y2]]` or
//! `["BOOM", [x, y]]`.

use std::fmt;

use super::position::TOKENS_PER_SIDE;
use super::square::Square;

/// Tag of a move action in the external identifier.
pub const MOVE_TAG: &str = "MOVE";

/// Tag of a detonation action in the external identifier.
pub const BOOM_TAG: &str = "BOOM";

/// A single player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ActionId", into = "ActionId")]
pub enum Action {
    /// Move `n` tokens from `from` to `to`: `MOVE 1 0 1 1 1`
    Move { n: u8, from: Square, to: Square },

    /// Detonate the stack at `at`: `BOOM 1 6`
    Boom { at: Square },
}

impl Action {
    /// Convenience constructor from coordinates. Returns None if any coordinate is off the board.
    pub fn new_move(n: u8, from: (usize, usize), to: (usize, usize)) -> Option<Action> {
        Some(Action::Move {
            n,
            from: Square::from_xy(from.0, from.1)?,
            to: Square::from_xy(to.0, to.1)?,
        })
    }

    /// Convenience constructor from coordinates. Returns None if off the board.
    pub fn new_boom(at: (usize, usize)) -> Option<Action> {
        Some(Action::Boom {
            at: Square::from_xy(at.0, at.1)?,
        })
    }

    /// True if `n` tokens can be moved at all: at least one, at most a full side.
    pub const fn is_valid_count(n: u8) -> bool {
        n >= 1 && n as u32 <= TOKENS_PER_SIDE
    }

    pub const fn is_boom(&self) -> bool {
        matches!(self, Action::Boom { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Move { n, from, to } => write!(
                f,
                "{} {} {} {} {} {}",
                MOVE_TAG,
                n,
                from.x(),
                from.y(),
                to.x(),
                to.y()
            ),
            Action::Boom { at } => write!(f, "{} {} {}", BOOM_TAG, at.x(), at.y()),
        }
    }
}

/// The external action identifier shape.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ActionId {
    Move(String, u8, (u8, u8), (u8, u8)),
    Boom(String, (u8, u8)),
}

/// Errors converting an external identifier into an action.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionIdError {
    #[error("unknown action tag '{0}'")]
    UnknownTag(String),

    #[error("coordinate ({0}, {1}) is off the board")]
    OffBoard(u8, u8),

    #[error("token count {0} is out of range")]
    InvalidCount(u8),
}

fn square_at((x, y): (u8, u8)) -> Result<Square, ActionIdError> {
    Square::from_xy(x as usize, y as usize).ok_or(ActionIdError::OffBoard(x, y))
}

impl TryFrom<ActionId> for Action {
    type Error = ActionIdError;

    fn try_from(id: ActionId) -> Result<Self, Self::Error> {
        match id {
            ActionId::Move(tag, n, from, to) if tag == MOVE_TAG => {
                if !Action::is_valid_count(n) {
                    return Err(ActionIdError::InvalidCount(n));
                }
                Ok(Action::Move {
                    n,
                    from: square_at(from)?,
                    to: square_at(to)?,
                })
            }
            ActionId::Boom(tag, at) if tag == BOOM_TAG => Ok(Action::Boom { at: square_at(at)? }),
            ActionId::Move(tag, ..) | ActionId::Boom(tag, _) => Err(ActionIdError::UnknownTag(tag)),
        }
    }
}

impl From<Action> for ActionId {
    fn from(action: Action) -> Self {
        match action {
            Action::Move { n, from, to } => ActionId::Move(MOVE_TAG.to_string(), n, from.xy(), to.xy()),
            Action::Boom { at } => ActionId::Boom(BOOM_TAG.to_string(), at.xy()),
        }
    }
}
