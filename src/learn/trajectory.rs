//! Leaf trajectories recorded during a game.

use crate::board::{Outcome, Position};

/// The predicted leaves of one player's searches, in play order.
///
/// Every leaf is seen from the recording player's perspective. A finished
/// trajectory ends with the synthetic terminal position of the real outcome.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    leaves: Vec<Position>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, leaf: Position) {
        self.leaves.push(leaf);
    }

    /// Appends the terminal position encoding `outcome`.
    pub fn finish(&mut self, outcome: Outcome) {
        self.leaves.push(outcome.terminal_position());
    }

    pub fn leaves(&self) -> &[Position] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn clear(&mut self) {
        self.leaves.clear();
    }
}

impl From<Vec<Position>> for Trajectory {
    fn from(leaves: Vec<Position>) -> Self {
        Trajectory { leaves }
    }
}

impl AsRef<[Position]> for Trajectory {
    fn as_ref(&self) -> &[Position] {
        &self.leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn finish_appends_terminal() {
        let mut t = Trajectory::new();
        t.push(Position::start(Color::White));
        t.finish(Outcome::Win);
        assert_eq!(t.len(), 2);
        assert_eq!(t.leaves()[1].outcome(), Some(Outcome::Win));
    }

    #[test]
    fn serializes_as_list_of_boards() {
        let t = Trajectory::from(vec![Position::start(Color::Black)]);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.starts_with("[["));
        let back: Trajectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
