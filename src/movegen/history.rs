//! Repetition tracking.
//!
//! Counts how often each position encoding has occurred in the current game.
//! The move generator uses it to suppress successors that would revisit a
//! known position; the referee uses the counts for the fourfold-repetition
//! draw rule.

use std::collections::HashMap;

use crate::board::{Position, CELL_COUNT};

/// Number of occurrences of the same position that ends a game in a draw.
pub const REPETITION_DRAW_COUNT: u32 = 4;

/// Occurrence counts keyed by canonical position encoding.
#[derive(Debug, Clone, Default)]
pub struct RepetitionTable {
    counts: HashMap<[u8; CELL_COUNT], u32>,
}

impl RepetitionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more occurrence of `pos` and returns its updated count.
    pub fn record(&mut self, pos: &Position) -> u32 {
        let count = self.counts.entry(pos.encode()).or_insert(0);
        *count += 1;
        *count
    }

    /// Number of times `pos` has been recorded.
    pub fn count(&self, pos: &Position) -> u32 {
        self.counts.get(&pos.encode()).copied().unwrap_or(0)
    }

    /// True if `pos` has been recorded at least once.
    pub fn contains(&self, pos: &Position) -> bool {
        self.counts.contains_key(&pos.encode())
    }

    /// True if `pos` has reached the repetition draw count.
    pub fn is_repetition_draw(&self, pos: &Position) -> bool {
        self.count(pos) >= REPETITION_DRAW_COUNT
    }

    /// Forgets every recorded position.
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Side, Square};

    #[test]
    fn counts_accumulate() {
        let mut table = RepetitionTable::new();
        let pos = Position::start(Color::White);
        assert!(!table.contains(&pos));
        assert_eq!(table.record(&pos), 1);
        assert_eq!(table.record(&pos), 2);
        assert_eq!(table.count(&pos), 2);
        assert!(table.contains(&pos));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn fourth_occurrence_is_a_draw() {
        let mut table = RepetitionTable::new();
        let pos = Position::start(Color::Black);
        for _ in 0..3 {
            table.record(&pos);
        }
        assert!(!table.is_repetition_draw(&pos));
        table.record(&pos);
        assert!(table.is_repetition_draw(&pos));
    }

    #[test]
    fn keyed_by_cells_not_history() {
        let mut table = RepetitionTable::new();
        let a = Square::from_xy(0, 0).unwrap();
        let b = Square::from_xy(0, 1).unwrap();
        let reached = Position::empty()
            .with_stack(a, 1)
            .apply_move(1, a, b, Side::Own);
        table.record(&reached);
        assert!(table.contains(&Position::empty().with_stack(b, 1)));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut table = RepetitionTable::new();
        table.record(&Position::start(Color::White));
        table.clear();
        assert!(table.is_empty());
    }
}
