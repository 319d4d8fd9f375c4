//! TD-Leaf(λ) weight updates.
//!
//! Given the leaves `s_0 .. s_N` of one game, with `s_N` the synthetic
//! terminal of the real outcome:
//!
//! ```text
//! δ_i  = r(s_{i+1}) - r(s_i)
//! D_i  = δ_i + λ D_{i+1}          (D_N = 0)
//! w'_j = w_j + α Σ_{i<N} D_i ∂r(s_i)/∂w_j
//! ```
//!
//! All rewards and derivatives use the weights before the update.

use crate::board::Position;
use crate::eval::{gradient, reward, Weights, FEATURE_COUNT};

/// Step parameters of the update.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TdLeafParams {
    /// Temporal discount λ in `[0, 1]`.
    pub lambda: f64,
    /// Step size α.
    pub learning_rate: f64,
}

impl Default for TdLeafParams {
    fn default() -> Self {
        TdLeafParams {
            lambda: 0.7,
            learning_rate: 0.01,
        }
    }
}

/// Applies one TD-Leaf(λ) update for a single game.
///
/// Trajectories with fewer than two leaves have no temporal differences and
/// return `weights` unchanged.
pub fn td_leaf_update(weights: &Weights, leaves: &[Position], params: TdLeafParams) -> Weights {
    if leaves.len() < 2 {
        return weights.clone();
    }

    let rewards: Vec<f64> = leaves.iter().map(|s| reward(s, weights)).collect();

    let mut adjust = [0.0; FEATURE_COUNT];
    let mut discounted = 0.0;
    for i in (0..leaves.len() - 1).rev() {
        let delta = rewards[i + 1] - rewards[i];
        discounted = delta + params.lambda * discounted;
        if discounted == 0.0 {
            continue;
        }
        let g = gradient(&leaves[i], weights);
        for (a, gj) in adjust.iter_mut().zip(g.iter()) {
            *a += discounted * gj;
        }
    }

    let mut next = *weights.values();
    for (w, a) in next.iter_mut().zip(adjust.iter()) {
        *w += params.learning_rate * a;
    }
    Weights::from_array(next)
}

/// Applies one update per recorded game, in order.
pub fn train_offline<I>(weights: &Weights, trajectories: I, params: TdLeafParams) -> Weights
where
    I: IntoIterator,
    I::Item: AsRef<[Position]>,
{
    trajectories
        .into_iter()
        .fold(weights.clone(), |w, t| td_leaf_update(&w, t.as_ref(), params))
}
