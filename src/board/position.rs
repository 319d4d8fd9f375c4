//! Game position representation.
//!
//! A position is a 64-cell array of signed stack heights seen from one
//! player's perspective: positive cells hold that player's stacks, negative
//! cells the opponent's. Positions are small `Copy` values; every action
//! produces a fresh position and never touches its input.

use super::action::Action;
use super::explosion::{explosion_closure, CellSet};
use super::square::{Color, Side, Square, CELL_COUNT};

/// Number of tokens each player starts with.
pub const TOKENS_PER_SIDE: u32 = 12;

/// White's start layout: two rows of own tokens at the bottom, the
/// opponent's mirror image at the top.
const WHITE_START: [i8; CELL_COUNT] = [
    1, 1, 0, 1, 1, 0, 1, 1, //
    1, 1, 0, 1, 1, 0, 1, 1, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    -1, -1, 0, -1, -1, 0, -1, -1, //
    -1, -1, 0, -1, -1, 0, -1, -1, //
];

/// Errors from building a position out of external data.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("expected 64 cells, got {0}")]
    WrongLength(usize),

    #[error("stack height {height} at cell {index} exceeds 12")]
    HeightOutOfRange { index: usize, height: i8 },
}

/// The result of a finished game from the own side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Terminal reward: 1 for a win, -1 for a loss, 0 for a draw.
    pub const fn reward(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
            Outcome::Draw => 0.0,
        }
    }

    /// The same outcome seen from the other player.
    pub const fn flipped(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }

    /// A synthetic terminal position whose terminal reward equals this outcome.
    pub fn terminal_position(self) -> Position {
        let mut cells = [0i8; CELL_COUNT];
        match self {
            Outcome::Win => cells[0] = 1,
            Outcome::Loss => cells[0] = -1,
            Outcome::Draw => {}
        }
        Position { cells }
    }
}

/// A board position from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<i8>", into = "Vec<i8>")]
pub struct Position {
    cells: [i8; CELL_COUNT],
}

impl Position {
    /// An empty board.
    pub const fn empty() -> Self {
        Position { cells: [0; CELL_COUNT] }
    }

    /// The standard start position for a player of the given color.
    pub fn start(color: Color) -> Self {
        let white = Position { cells: WHITE_START };
        match color {
            Color::White => white,
            Color::Black => white.flipped(),
        }
    }

    /// Wraps a raw cell array.
    pub const fn from_cells(cells: [i8; CELL_COUNT]) -> Self {
        Position { cells }
    }

    /// Returns the raw cell array.
    pub const fn cells(&self) -> &[i8; CELL_COUNT] {
        &self.cells
    }

    /// Returns the signed stack height at a square.
    #[inline]
    pub const fn get(&self, sq: Square) -> i8 {
        self.cells[sq.index()]
    }

    /// Returns a copy with the cell at `sq` set to `value`.
    pub fn with_stack(mut self, sq: Square, value: i8) -> Self {
        self.cells[sq.index()] = value;
        self
    }

    /// Moves `n` tokens of `side` from `from` to `to`.
    ///
    /// No legality check is performed; legality is the move generator's job.
    pub fn apply_move(&self, n: u8, from: Square, to: Square, side: Side) -> Position {
        let signed = n as i8 * side.sign();
        let mut next = *self;
        next.cells[from.index()] -= signed;
        next.cells[to.index()] += signed;
        next
    }

    /// Detonates the stack at `at`, emptying its whole explosion closure.
    pub fn apply_boom(&self, at: Square) -> Position {
        let mut next = *self;
        for sq in explosion_closure(self, at).iter() {
            next.cells[sq.index()] = 0;
        }
        next
    }

    /// Applies an action taken by `side`.
    pub fn apply_action(&self, action: &Action, side: Side) -> Position {
        match *action {
            Action::Move { n, from, to } => self.apply_move(n, from, to, side),
            Action::Boom { at } => self.apply_boom(at),
        }
    }

    /// True when at least one side has no stacks left.
    pub fn is_terminal(&self) -> bool {
        self.cells.iter().all(|&c| c >= 0) || self.cells.iter().all(|&c| c <= 0)
    }

    /// The game result if this position is terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        let own = self.cells.iter().any(|&c| c > 0);
        let opp = self.cells.iter().any(|&c| c < 0);
        match (own, opp) {
            (true, true) => None,
            (true, false) => Some(Outcome::Win),
            (false, true) => Some(Outcome::Loss),
            (false, false) => Some(Outcome::Draw),
        }
    }

    /// The same board seen from the opponent's perspective.
    pub fn flipped(&self) -> Position {
        let mut cells = self.cells;
        for c in cells.iter_mut() {
            *c = -*c;
        }
        Position { cells }
    }

    /// All non-empty cells.
    pub fn occupied(&self) -> CellSet {
        self.mask(|c| c != 0)
    }

    /// Cells holding stacks of `side`.
    pub fn stacks(&self, side: Side) -> CellSet {
        self.mask(|c| side.owns(c))
    }

    /// Number of stacks owned by `side`.
    pub fn stack_count(&self, side: Side) -> u32 {
        self.cells.iter().filter(|&&c| side.owns(c)).count() as u32
    }

    /// Total tokens owned by `side`.
    pub fn tokens(&self, side: Side) -> u32 {
        self.cells
            .iter()
            .filter(|&&c| side.owns(c))
            .map(|&c| c.unsigned_abs() as u32)
            .sum()
    }

    /// Canonical byte encoding used for repetition tracking.
    ///
    /// Two positions with identical cells always encode identically.
    pub fn encode(&self) -> [u8; CELL_COUNT] {
        let mut out = [0u8; CELL_COUNT];
        for (o, &c) in out.iter_mut().zip(self.cells.iter()) {
            *o = c as u8;
        }
        out
    }

    fn mask(&self, pred: impl Fn(i8) -> bool) -> CellSet {
        let mut bits = 0u64;
        for (i, &c) in self.cells.iter().enumerate() {
            if pred(c) {
                bits |= 1u64 << i;
            }
        }
        CellSet::from_bits(bits)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::empty()
    }
}

impl TryFrom<Vec<i8>> for Position {
    type Error = PositionError;

    fn try_from(v: Vec<i8>) -> Result<Self, Self::Error> {
        let cells: [i8; CELL_COUNT] = v
            .as_slice()
            .try_into()
            .map_err(|_| PositionError::WrongLength(v.len()))?;
        if let Some((index, &height)) = cells
            .iter()
            .enumerate()
            .find(|(_, &c)| c.unsigned_abs() as u32 > TOKENS_PER_SIDE)
        {
            return Err(PositionError::HeightOutOfRange { index, height });
        }
        Ok(Position { cells })
    }
}

impl From<Position> for Vec<i8> {
    fn from(pos: Position) -> Self {
        pos.cells.to_vec()
    }
}
