//! Position evaluation.
//!
//! Scores a position from the own side's perspective with a linear model
//! over handcrafted features, squashed into `[-1, 1]` by tanh.

pub mod features;
pub mod linear;

pub use features::{features, Features, FEATURE_COUNT, FEATURE_NAMES};
pub use linear::{dfeature, gradient, reward, EvaluationContext, Weights, WeightsError};
