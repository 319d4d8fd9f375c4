//! Player protocol command parser.
//!
//! Parses incoming protocol lines into structured `Command` variants that
//! the main loop dispatches on.

use std::path::PathBuf;

use tracing::warn;

use super::notation::parse_action;
use crate::board::{Action, Color};

/// A parsed runner-to-player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new game playing `color`: `init <white|black>`.
    Init { color: Color },

    /// Load evaluation weights from a JSON file: `weights <path>`.
    Weights { path: PathBuf },

    /// Set a player option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Synchronization ping; the player must reply `readyok`.
    IsReady,

    /// Choose an action: `action [depth <n>]`.
    Action { depth: Option<u32> },

    /// An action was played: `update <color> <action>`.
    Update { color: Color, action: Action },

    /// Terminate the player process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),

        "init" => parse_init(&tokens),
        "weights" => parse_weights(&tokens, line),
        "setoption" => parse_setoption(&tokens),
        "action" => parse_action_request(&tokens),
        "update" => parse_update(&tokens),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `init <color>`.
fn parse_init(tokens: &[&str]) -> Option<Command> {
    let Some(name) = tokens.get(1) else {
        warn!("malformed init: expected 'init <white|black>'");
        return None;
    };
    match Color::from_name(name) {
        Some(color) => Some(Command::Init { color }),
        None => {
            warn!(color = *name, "unknown color");
            None
        }
    }
}

/// Parses `weights <path>`; the path is the rest of the line.
fn parse_weights(tokens: &[&str], line: &str) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed weights: expected 'weights <path>'");
        return None;
    }
    let path = line.trim().strip_prefix("weights").unwrap_or("").trim();
    Some(Command::Weights {
        path: PathBuf::from(path),
    })
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name_parts, value_parts) = match value_idx {
        Some(vi) => (&tokens[2..vi], &tokens[vi + 1..]),
        None => (&tokens[2..], &tokens[tokens.len()..]),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }

    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };
    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

/// Parses `action [depth <n>]`.
fn parse_action_request(tokens: &[&str]) -> Option<Command> {
    let mut depth = None;
    let mut i = 1;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u32>()) {
                    Some(Ok(d)) => depth = Some(d),
                    _ => warn!("invalid depth value"),
                }
            }
            other => warn!(parameter = other, "unknown action parameter"),
        }
        i += 1;
    }
    Some(Command::Action { depth })
}

/// Parses `update <color> <action notation>`.
fn parse_update(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed update: expected 'update <color> <action>'");
        return None;
    }
    let Some(color) = Color::from_name(tokens[1]) else {
        warn!(color = tokens[1], "unknown color");
        return None;
    };
    match parse_action(&tokens[2..].join(" ")) {
        Ok(action) => Some(Command::Update { color, action }),
        Err(e) => {
            warn!(error = %e, "malformed update action");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn sq(x: usize, y: usize) -> Square {
        Square::from_xy(x, y).unwrap()
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("action"), Some(Command::Action { depth: None }));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_init_colors() {
        assert_eq!(parse_command("init white"), Some(Command::Init { color: Color::White }));
        assert_eq!(parse_command("init Black"), Some(Command::Init { color: Color::Black }));
        assert_eq!(parse_command("init red"), None);
        assert_eq!(parse_command("init"), None);
    }

    #[test]
    fn parse_weights_keeps_spaces_in_path() {
        assert_eq!(
            parse_command("weights /tmp/my weights.json"),
            Some(Command::Weights {
                path: PathBuf::from("/tmp/my weights.json")
            })
        );
        assert_eq!(parse_command("weights"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        assert_eq!(
            parse_command("setoption name Depth value 4"),
            Some(Command::SetOption {
                name: "Depth".to_string(),
                value: Some("4".to_string()),
            })
        );
    }

    #[test]
    fn parse_setoption_without_value() {
        assert_eq!(
            parse_command("setoption name Parallel"),
            Some(Command::SetOption {
                name: "Parallel".to_string(),
                value: None,
            })
        );
        assert_eq!(parse_command("setoption Depth 4"), None);
        assert_eq!(parse_command("setoption name value 4"), None);
    }

    #[test]
    fn parse_action_with_depth() {
        assert_eq!(
            parse_command("action depth 2"),
            Some(Command::Action { depth: Some(2) })
        );
        assert_eq!(
            parse_command("action depth x"),
            Some(Command::Action { depth: None })
        );
    }

    #[test]
    fn parse_update_commands() {
        assert_eq!(
            parse_command("update black MOVE 1 3 6 3 5"),
            Some(Command::Update {
                color: Color::Black,
                action: Action::Move { n: 1, from: sq(3, 6), to: sq(3, 5) },
            })
        );
        assert_eq!(
            parse_command("update white BOOM 0 1"),
            Some(Command::Update {
                color: Color::White,
                action: Action::Boom { at: sq(0, 1) },
            })
        );
        assert_eq!(parse_command("update white BOOM 9 9"), None);
        assert_eq!(parse_command("update white"), None);
    }
}
