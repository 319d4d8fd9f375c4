//! Learning from self-play.
//!
//! Players record the predicted leaf of every search; at the end of a game
//! the trajectory is closed with the real outcome and fed to TD-Leaf(λ).

pub mod tdleaf;
pub mod trajectory;

pub use tdleaf::{td_leaf_update, train_offline, TdLeafParams};
pub use trajectory::Trajectory;
