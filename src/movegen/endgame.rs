//! Endgame successor ordering.
//!
//! With few stacks left, long full-stack relocations matter most. Moves are
//! generated first with a distance stride of 3 starting from the full
//! height, moving the whole stack before a single token. Every detonation is
//! generated afterwards, so each stack always has at least one action.

use super::{can_land, targets_at, Successor};
use crate::board::{Action, Position, Side};

/// Distance stride between generated move destinations.
const DISTANCE_STRIDE: usize = 3;

/// Generates every endgame-ordered successor of `pos` for `side`.
pub fn successors(pos: &Position, side: Side) -> Vec<Successor> {
    let own = pos.stacks(side);
    let mut out = Vec::with_capacity(own.len() * 8);

    for from in own.iter() {
        let height = pos.get(from).unsigned_abs();
        for d in (1..=height).rev().step_by(DISTANCE_STRIDE) {
            for to in targets_at(from, d) {
                if !can_land(side, pos.get(to)) {
                    continue;
                }
                for n in amounts(height) {
                    out.push((Action::Move { n, from, to }, pos.apply_move(n, from, to, side)));
                }
            }
        }
    }

    for at in own.iter() {
        out.push((Action::Boom { at }, pos.apply_boom(at)));
    }

    out
}

/// Token counts to move: the whole stack, then a single token.
fn amounts(height: u8) -> impl Iterator<Item = u8> {
    let single = if height > 1 { Some(1) } else { None };
    std::iter::once(height).chain(single)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn sq(x: usize, y: usize) -> Square {
        Square::from_xy(x, y).unwrap()
    }

    #[test]
    fn moves_before_detonations() {
        let pos = Position::empty().with_stack(sq(4, 4), 1).with_stack(sq(0, 0), -1);
        let succ = successors(&pos, Side::Own);
        let last = succ.last().unwrap();
        assert_eq!(last.0, Action::Boom { at: sq(4, 4) });
        assert!(succ[..succ.len() - 1].iter().all(|(a, _)| !a.is_boom()));
    }

    #[test]
    fn strided_distances_full_stack_first() {
        let pos = Position::empty().with_stack(sq(0, 0), 5).with_stack(sq(7, 7), -1);
        let succ = successors(&pos, Side::Own);
        let moves: Vec<Action> = succ.iter().map(|(a, _)| *a).filter(|a| !a.is_boom()).collect();
        // Distances 5 and 2; from the corner only up and right exist.
        assert_eq!(
            moves,
            vec![
                Action::Move { n: 5, from: sq(0, 0), to: sq(0, 5) },
                Action::Move { n: 1, from: sq(0, 0), to: sq(0, 5) },
                Action::Move { n: 5, from: sq(0, 0), to: sq(5, 0) },
                Action::Move { n: 1, from: sq(0, 0), to: sq(5, 0) },
                Action::Move { n: 5, from: sq(0, 0), to: sq(0, 2) },
                Action::Move { n: 1, from: sq(0, 0), to: sq(0, 2) },
                Action::Move { n: 5, from: sq(0, 0), to: sq(2, 0) },
                Action::Move { n: 1, from: sq(0, 0), to: sq(2, 0) },
            ]
        );
    }

    #[test]
    fn every_stack_can_detonate() {
        let pos = Position::empty()
            .with_stack(sq(0, 0), 2)
            .with_stack(sq(0, 2), -1)
            .with_stack(sq(2, 0), -1);
        // Both distance-2 destinations are blocked, but the detonation remains.
        let succ = successors(&pos, Side::Own);
        assert_eq!(succ.len(), 1);
        assert_eq!(succ[0].0, Action::Boom { at: sq(0, 0) });
        assert!(succ[0].1.is_terminal());
    }
}
