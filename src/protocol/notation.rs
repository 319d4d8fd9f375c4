//! Text notation for actions.
//!
//! `MOVE n x1 y1 x2 y2` moves `n` tokens from `(x1, y1)` to `(x2, y2)`;
//! `BOOM x y` detonates the stack at `(x, y)`. Keywords are
//! case-insensitive and tokens are separated by whitespace.

use crate::board::{Action, BOOM_TAG, MOVE_TAG};

/// Errors from parsing action notation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty action")]
    Empty,

    #[error("unknown action kind '{0}'")]
    UnknownKind(String),

    #[error("{kind} takes {expected} arguments, got {got}")]
    WrongArity {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("token count {0} is out of range")]
    InvalidCount(u8),

    #[error("coordinate ({0}, {1}) is off the board")]
    OffBoard(usize, usize),
}

/// Parses a single action from text notation.
pub fn parse_action(s: &str) -> Result<Action, NotationError> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let (kind, args) = tokens.split_first().ok_or(NotationError::Empty)?;

    if kind.eq_ignore_ascii_case(MOVE_TAG) {
        let [n, x1, y1, x2, y2] = numbers::<5>(MOVE_TAG, args)?;
        let n = u8::try_from(n).map_err(|_| NotationError::InvalidNumber(args[0].to_string()))?;
        if !Action::is_valid_count(n) {
            return Err(NotationError::InvalidCount(n));
        }
        let from = (x1, y1);
        let to = (x2, y2);
        Action::new_move(n, from, to).ok_or_else(|| off_board(from, to))
    } else if kind.eq_ignore_ascii_case(BOOM_TAG) {
        let [x, y] = numbers::<2>(BOOM_TAG, args)?;
        Action::new_boom((x, y)).ok_or(NotationError::OffBoard(x, y))
    } else {
        Err(NotationError::UnknownKind(kind.to_string()))
    }
}

/// Formats an action in text notation.
pub fn format_action(action: &Action) -> String {
    action.to_string()
}

fn numbers<const N: usize>(kind: &'static str, args: &[&str]) -> Result<[usize; N], NotationError> {
    if args.len() != N {
        return Err(NotationError::WrongArity {
            kind,
            expected: N,
            got: args.len(),
        });
    }
    let mut out = [0usize; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| NotationError::InvalidNumber(arg.to_string()))?;
    }
    Ok(out)
}

fn off_board(from: (usize, usize), to: (usize, usize)) -> NotationError {
    if from.0 >= 8 || from.1 >= 8 {
        NotationError::OffBoard(from.0, from.1)
    } else {
        NotationError::OffBoard(to.0, to.1)
    }
}
