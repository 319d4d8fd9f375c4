//! Linear evaluation with tanh squashing.
//!
//! `reward = tanh(w · features)` for non-terminal positions and the exact game
//! result for terminal ones. The closed-form partial derivative
//! `features[i] * (1 - reward^2)` is what TD-Leaf training climbs.

use rand::Rng;

use super::features::{features, Features, FEATURE_COUNT};
use crate::board::Position;

/// Hand-tuned starting weights, index-aligned with the feature vector.
const DEFAULT_WEIGHTS: [f64; FEATURE_COUNT] = [0.8, 0.1, -0.1, 0.05, -0.2, 0.05, 0.3, -0.3];

/// Errors building a weight vector from external data.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WeightsError {
    #[error("expected {} weights, got {}", FEATURE_COUNT, .0)]
    WrongLength(usize),

    #[error("weight {0} is not finite")]
    NonFinite(usize),
}

/// The learned weight vector of the linear evaluator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Weights {
    values: [f64; FEATURE_COUNT],
}

impl Weights {
    /// All-zero weights; every non-terminal position evaluates to 0.
    pub const fn zeros() -> Self {
        Weights {
            values: [0.0; FEATURE_COUNT],
        }
    }

    pub const fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Weights { values }
    }

    /// Uniform random weights in `[-scale, scale)`.
    pub fn random(rng: &mut impl Rng, scale: f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        if scale > 0.0 {
            for v in values.iter_mut() {
                *v = rng.gen_range(-scale..scale);
            }
        }
        Weights { values }
    }

    pub const fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Dot product with a feature vector.
    #[inline]
    pub fn dot(&self, f: &Features) -> f64 {
        self.values.iter().zip(f.iter()).map(|(w, x)| w * x).sum()
    }
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            values: DEFAULT_WEIGHTS,
        }
    }
}

impl TryFrom<Vec<f64>> for Weights {
    type Error = WeightsError;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        let values: [f64; FEATURE_COUNT] = v
            .as_slice()
            .try_into()
            .map_err(|_| WeightsError::WrongLength(v.len()))?;
        if let Some(i) = values.iter().position(|w| !w.is_finite()) {
            return Err(WeightsError::NonFinite(i));
        }
        Ok(Weights { values })
    }
}

impl From<Weights> for Vec<f64> {
    fn from(w: Weights) -> Self {
        w.values.to_vec()
    }
}

/// Evaluation state passed explicitly into search and training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    pub weights: Weights,
}

impl EvaluationContext {
    pub fn new(weights: Weights) -> Self {
        EvaluationContext { weights }
    }

    /// See [`reward`].
    #[inline]
    pub fn reward(&self, pos: &Position) -> f64 {
        reward(pos, &self.weights)
    }

    /// See [`dfeature`].
    pub fn dfeature(&self, pos: &Position, i: usize) -> f64 {
        dfeature(pos, &self.weights, i)
    }

    /// See [`gradient`].
    pub fn gradient(&self, pos: &Position) -> Features {
        gradient(pos, &self.weights)
    }
}

/// Evaluates `pos` from the own side's perspective, in `[-1, 1]`.
///
/// Terminal positions score exactly 1 (only own stacks left), -1 (only
/// opponent stacks left) or 0 (mutual annihilation). A dot product that
/// overflows to NaN scores 0.
pub fn reward(pos: &Position, weights: &Weights) -> f64 {
    match pos.outcome() {
        Some(outcome) => outcome.reward(),
        None => {
            let z = weights.dot(&features(pos));
            if z.is_nan() {
                0.0
            } else {
                z.tanh()
            }
        }
    }
}

/// Partial derivative of [`reward`] with respect to weight `i`.
pub fn dfeature(pos: &Position, weights: &Weights, i: usize) -> f64 {
    let r = reward(pos, weights);
    features(pos)[i] * (1.0 - r * r)
}

/// All partial derivatives of [`reward`] at once.
pub fn gradient(pos: &Position, weights: &Weights) -> Features {
    let r = reward(pos, weights);
    let scale = 1.0 - r * r;
    let mut g = features(pos);
    for v in g.iter_mut() {
        *v *= scale;
    }
    g
}
