//! Board squares and side identifiers.
//!
//! A square is a validated index into the 64-cell board, laid out row-major
//! as `x + 8 * y`. Sides come in two flavours: the relative `Side` used by
//! the search (own stacks are positive) and the absolute `Color` used by the
//! protocol and the referee.

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

/// Total number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// A cell on the 8x8 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Creates a square from a raw cell index. Returns None if out of range.
    pub const fn new(index: usize) -> Option<Square> {
        if index < CELL_COUNT {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    /// Creates a square from board coordinates. Returns None if off the board.
    pub const fn from_xy(x: usize, y: usize) -> Option<Square> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Square((x + BOARD_SIZE * y) as u8))
        } else {
            None
        }
    }

    /// Returns the cell index `x + 8 * y`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the column (file) of this square.
    #[inline]
    pub const fn x(self) -> usize {
        self.0 as usize % BOARD_SIZE
    }

    /// Returns the row (rank) of this square.
    #[inline]
    pub const fn y(self) -> usize {
        self.0 as usize / BOARD_SIZE
    }

    /// Returns the `(x, y)` coordinate pair used by the external action shape.
    pub const fn xy(self) -> (u8, u8) {
        (self.x() as u8, self.y() as u8)
    }

    /// Offsets this square by `(dx, dy)`, returning None when the result leaves the board.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Square> {
        let x = self.x() as isize + dx;
        let y = self.y() as isize + dy;
        if x < 0 || y < 0 {
            return None;
        }
        Square::from_xy(x as usize, y as usize)
    }

    /// Chebyshev distance between two squares.
    pub fn chebyshev(self, other: Square) -> usize {
        self.x().abs_diff(other.x()).max(self.y().abs_diff(other.y()))
    }

    /// Iterates over all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..CELL_COUNT as u8).map(Square)
    }
}

/// The side to move relative to the evaluating player.
///
/// `Own` stacks are stored as positive heights, `Opponent` stacks as negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Own,
    Opponent,
}

impl Side {
    /// Returns +1 for own stacks and -1 for opponent stacks.
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Side::Own => 1,
            Side::Opponent => -1,
        }
    }

    /// Returns the other side.
    #[inline]
    pub const fn other(self) -> Side {
        match self {
            Side::Own => Side::Opponent,
            Side::Opponent => Side::Own,
        }
    }

    /// Returns true if a cell value belongs to this side.
    #[inline]
    pub const fn owns(self, cell: i8) -> bool {
        match self {
            Side::Own => cell > 0,
            Side::Opponent => cell < 0,
        }
    }
}

/// The absolute color of a player. White moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the opposing color.
    pub const fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Returns the side a mover of `mover` color has from `self`'s perspective.
    pub const fn relative(self, mover: Color) -> Side {
        if self as u8 == mover as u8 {
            Side::Own
        } else {
            Side::Opponent
        }
    }

    /// Returns the lowercase protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// Parses a color from its protocol name (case-insensitive).
    pub fn from_name(s: &str) -> Option<Color> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Color::White),
            "black" | "b" => Some(Color::Black),
            _ => None,
        }
    }
}
