//! Legal move generation.
//!
//! Generates the successors `(action, position)` of a position for the side
//! to move, under one of two deterministic orderings, and filters out
//! successors that would repeat an already-seen position.

pub mod endgame;
pub mod history;
pub mod standard;

use rand::Rng;

use crate::board::{Action, Position, Side, Square};

pub use history::{RepetitionTable, REPETITION_DRAW_COUNT};

/// An action paired with the position it produces.
pub type Successor = (Action, Position);

/// Successor ordering used by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveOrdering {
    /// Useful detonations first, then every move, fewest tokens first.
    #[default]
    Standard,
    /// Strided moves first, full stack first, then every detonation.
    Endgame,
}

impl MoveOrdering {
    /// Parses an ordering from its configuration name.
    pub fn from_name(s: &str) -> Option<MoveOrdering> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Some(MoveOrdering::Standard),
            "endgame" => Some(MoveOrdering::Endgame),
            _ => None,
        }
    }

    /// Picks the endgame ordering once fewer than `threshold` stacks remain on the board.
    pub fn for_position(self, pos: &Position, threshold: Option<u32>) -> MoveOrdering {
        match threshold {
            Some(t) if pos.occupied().len() < t as usize => MoveOrdering::Endgame,
            _ => self,
        }
    }
}

/// Generates the successors of `pos` for `side` under `ordering`.
///
/// Successors already present in `avoid` are dropped. If that would drop
/// every successor, the unfiltered list is returned so that a repeated
/// position is never mistaken for a position without actions.
pub fn generate(
    pos: &Position,
    side: Side,
    ordering: MoveOrdering,
    avoid: &RepetitionTable,
) -> Vec<Successor> {
    let all = match ordering {
        MoveOrdering::Standard => standard::successors(pos, side),
        MoveOrdering::Endgame => endgame::successors(pos, side),
    };
    if avoid.is_empty() {
        return all;
    }

    let fresh: Vec<Successor> = all
        .iter()
        .filter(|(_, child)| !avoid.contains(child))
        .copied()
        .collect();
    if fresh.is_empty() {
        all
    } else {
        fresh
    }
}

/// Every generated action of `side` in standard order, with no repetition filter.
pub fn legal_actions(pos: &Position, side: Side) -> Vec<Action> {
    standard::successors(pos, side)
        .into_iter()
        .map(|(action, _)| action)
        .collect()
}

/// True if `side` may play `action` in `pos` under the game rules.
///
/// Accepts every detonation of an own stack, including ones neither
/// generator yields, and every move of 1 to `height` tokens a distance of 1
/// to `height` along a rank or file onto an empty or own cell.
pub fn is_legal(pos: &Position, side: Side, action: &Action) -> bool {
    match *action {
        Action::Boom { at } => side.owns(pos.get(at)),
        Action::Move { n, from, to } => {
            let cell = pos.get(from);
            if !side.owns(cell) {
                return false;
            }
            let height = cell.unsigned_abs();
            let straight = from.x() == to.x() || from.y() == to.y();
            let distance = from.chebyshev(to);
            straight
                && (1..=height as usize).contains(&distance)
                && (1..=height).contains(&n)
                && can_land(side, pos.get(to))
        }
    }
}

/// Picks a uniformly random action for `side` from the standard generator.
pub fn random_action(pos: &Position, side: Side, rng: &mut impl Rng) -> Option<Action> {
    let actions = legal_actions(pos, side);
    if actions.is_empty() {
        return None;
    }
    Some(actions[rng.gen_range(0..actions.len())])
}

/// Squares exactly `d` cells away from `from` along its rank and file,
/// in the order down, up, left, right.
pub(crate) fn targets_at(from: Square, d: u8) -> impl Iterator<Item = Square> {
    let d = d as isize;
    [(0, -d), (0, d), (-d, 0), (d, 0)]
        .into_iter()
        .filter_map(move |(dx, dy)| from.offset(dx, dy))
}

/// True if a stack of `side` may land on a cell holding `cell`.
#[inline]
pub(crate) fn can_land(side: Side, cell: i8) -> bool {
    !side.other().owns(cell)
}
