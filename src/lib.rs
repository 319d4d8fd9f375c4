//! Expendibots engine library.
//!
//! Exposes the board representation, move generation, evaluation, search,
//! TD-Leaf learning, self-play and protocol modules for use by integration
//! tests and the binary entry points.

pub mod board;
pub mod config;
pub mod engine;
pub mod eval;
pub mod learn;
pub mod movegen;
pub mod player;
pub mod protocol;
pub mod search;
pub mod selfplay;
