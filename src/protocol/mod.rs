//! Player protocol handling.
//!
//! Text notation for actions, the line-oriented command parser used by the
//! main binary, and the weight and game-record file formats.

pub mod notation;
pub mod parser;
pub mod records;

pub use notation::{format_action, parse_action, NotationError};
pub use parser::{parse_command, Command};
pub use records::{
    load_weights, read_jsonl, read_jsonl_file, save_weights, write_game_json, write_jsonl,
    RecordError,
};
