//! General-purpose successor ordering.
//!
//! Detonations come first and are only generated when an opposing stack sits
//! inside the blast radius. Moves follow, farthest destination first, and
//! for each destination the number of tokens moved ascends from 1 to the
//! full stack.

use super::{can_land, targets_at, Successor};
use crate::board::{blast_radius, Action, Position, Side};

/// Generates every standard-ordered successor of `pos` for `side`.
pub fn successors(pos: &Position, side: Side) -> Vec<Successor> {
    let own = pos.stacks(side);
    let enemy = pos.stacks(side.other()).bits();
    let mut out = Vec::with_capacity(own.len() * 16);

    for at in own.iter() {
        if blast_radius(at).bits() & enemy != 0 {
            out.push((Action::Boom { at }, pos.apply_boom(at)));
        }
    }

    for from in own.iter() {
        let height = pos.get(from).unsigned_abs();
        for d in (1..=height).rev() {
            for to in targets_at(from, d) {
                if !can_land(side, pos.get(to)) {
                    continue;
                }
                for n in 1..=height {
                    out.push((Action::Move { n, from, to }, pos.apply_move(n, from, to, side)));
                }
            }
        }
    }

    out
}
