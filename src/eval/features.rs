//! Evaluation features.
//!
//! Maps a position to a fixed-length vector of bounded, finite features, all
//! from the own side's perspective. The linear evaluator combines them with
//! a learned weight vector.
//!
//! Design: every feature is normalised to roughly `[-1, 1]` except the raw
//! stack-count difference, so that the weight scales stay comparable.

use crate::board::{blast_radius, explosion_closure, Position, Side, BOARD_SIZE, TOKENS_PER_SIDE};

/// Number of features produced by [`features`].
pub const FEATURE_COUNT: usize = 8;

/// A feature vector.
pub type Features = [f64; FEATURE_COUNT];

/// Human-readable feature names, index-aligned with [`features`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "token_asymmetry",
    "own_tokens",
    "opponent_tokens",
    "stack_difference",
    "own_stacks",
    "center_of_mass_proximity",
    "own_boom_gain",
    "opponent_boom_gain",
];

const TOKEN_SCALE: f64 = TOKENS_PER_SIDE as f64;

/// Computes the feature vector of `pos`.
pub fn features(pos: &Position) -> Features {
    let own_tokens = pos.tokens(Side::Own) as f64;
    let opp_tokens = pos.tokens(Side::Opponent) as f64;
    let own_stacks = pos.stack_count(Side::Own) as f64;
    let opp_stacks = pos.stack_count(Side::Opponent) as f64;

    let total = own_tokens + opp_tokens;
    let asymmetry = if total > 0.0 {
        (own_tokens - opp_tokens) / total
    } else {
        0.0
    };

    [
        asymmetry,
        own_tokens / TOKEN_SCALE,
        opp_tokens / TOKEN_SCALE,
        own_stacks - opp_stacks,
        own_stacks / TOKEN_SCALE,
        center_of_mass_proximity(pos),
        best_boom_gain(pos, Side::Own) / TOKEN_SCALE,
        best_boom_gain(pos, Side::Opponent) / TOKEN_SCALE,
    ]
}

/// Token-weighted center of mass of `side`, or None if it has no tokens.
fn center_of_mass(pos: &Position, side: Side) -> Option<(f64, f64)> {
    let mut mass = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for sq in pos.stacks(side).iter() {
        let h = pos.get(sq).unsigned_abs() as f64;
        mass += h;
        sx += h * sq.x() as f64;
        sy += h * sq.y() as f64;
    }
    if mass > 0.0 {
        Some((sx / mass, sy / mass))
    } else {
        None
    }
}

/// `1 - d / 7` where `d` is the Chebyshev distance between both centers of
/// mass; 0 when either side has no tokens.
fn center_of_mass_proximity(pos: &Position) -> f64 {
    match (center_of_mass(pos, Side::Own), center_of_mass(pos, Side::Opponent)) {
        (Some((ox, oy)), Some((tx, ty))) => {
            let d = (ox - tx).abs().max((oy - ty).abs());
            1.0 - d / (BOARD_SIZE - 1) as f64
        }
        _ => 0.0,
    }
}

/// Best net token gain (opponent tokens destroyed minus own tokens lost,
/// seen from `side`) over detonations of `side` that touch an opposing
/// stack. Never negative.
fn best_boom_gain(pos: &Position, side: Side) -> f64 {
    let enemy = pos.stacks(side.other()).bits();
    let mut best = 0i32;
    for at in pos.stacks(side).iter() {
        if blast_radius(at).bits() & enemy == 0 {
            continue;
        }
        let mut gain = 0i32;
        for sq in explosion_closure(pos, at).iter() {
            let cell = pos.get(sq) as i32;
            gain -= cell * side.sign() as i32;
        }
        best = best.max(gain);
    }
    best as f64
}
