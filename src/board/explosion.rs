//! Chain-reaction resolution.
//!
//! Detonations are resolved over 64-bit cell sets: the blast radius of every
//! square is precomputed at compile time, and the explosion closure is a
//! flood fill over occupied cells using those masks.

use super::position::Position;
use super::square::{Square, BOARD_SIZE, CELL_COUNT};

/// A set of board cells stored as a 64-bit mask (bit `i` = cell index `i`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellSet(u64);

impl CellSet {
    /// The empty set.
    pub const EMPTY: CellSet = CellSet(0);

    /// Creates a set from a raw mask.
    pub const fn from_bits(bits: u64) -> Self {
        CellSet(bits)
    }

    /// Creates a set holding a single square.
    pub const fn single(sq: Square) -> Self {
        CellSet(1u64 << sq.index())
    }

    /// Returns the raw mask.
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.index();
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over member squares in ascending index order.
    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let idx = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Square::new(idx)
        })
    }
}

/// Blast radius of each cell: the up-to-eight neighbours within Chebyshev
/// distance 1, excluding the cell itself.
static RADIUS_MASKS: [u64; CELL_COUNT] = build_radius_masks();

const fn build_radius_masks() -> [u64; CELL_COUNT] {
    let mut masks = [0u64; CELL_COUNT];
    let mut i = 0;
    while i < CELL_COUNT {
        let x = (i % BOARD_SIZE) as isize;
        let y = (i / BOARD_SIZE) as isize;
        let mut mask = 0u64;
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                let nx = x + dx;
                let ny = y + dy;
                if (dx != 0 || dy != 0)
                    && nx >= 0
                    && ny >= 0
                    && nx < BOARD_SIZE as isize
                    && ny < BOARD_SIZE as isize
                {
                    mask |= 1u64 << (nx as usize + BOARD_SIZE * ny as usize);
                }
                dx += 1;
            }
            dy += 1;
        }
        masks[i] = mask;
        i += 1;
    }
    masks
}

/// Returns the cells within the blast radius of `sq` (not including `sq`).
#[inline]
pub fn blast_radius(sq: Square) -> CellSet {
    CellSet(RADIUS_MASKS[sq.index()])
}

/// Computes the set of cells emptied by detonating `at`.
///
/// The result always contains `at`, plus every occupied cell reachable from
/// it through chains of occupied cells at Chebyshev distance 1.
pub fn explosion_closure(pos: &Position, at: Square) -> CellSet {
    let occupied = pos.occupied().bits();
    let mut emptied = 1u64 << at.index();
    let mut frontier = emptied;

    while frontier != 0 {
        let mut reach = 0u64;
        let mut bits = frontier;
        while bits != 0 {
            let idx = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            reach |= RADIUS_MASKS[idx];
        }
        frontier = reach & occupied & !emptied;
        emptied |= frontier;
    }

    CellSet(emptied)
}
