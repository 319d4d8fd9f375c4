//! Integration tests for the expendibots player binary.
//!
//! Tests full protocol sessions by spawning the player process, sending
//! commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use expendibots::board::{Action, Color, Position, Side};
use expendibots::movegen::legal_actions;
use expendibots::protocol::parse_action;

/// Sends a sequence of commands to the player and collects stdout lines.
fn run_player(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_expendibots");
    let mut child = Command::new(exe)
        .env_remove("EXPENDIBOTS_CONFIG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start expendibots");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// Extracts the actions from `action ...` response lines.
fn actions(lines: &[String]) -> Vec<Action> {
    lines
        .iter()
        .filter_map(|l| l.strip_prefix("action "))
        .map(|a| parse_action(a).expect("player printed invalid notation"))
        .collect()
}

#[test]
fn isready_response() {
    let lines = run_player(&["isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_player(&["foobar", "init purple", "update white JUMP 1 1", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn empty_lines_are_ignored() {
    let lines = run_player(&["", "   ", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn action_without_init_is_silent() {
    let lines = run_player(&["action", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn white_opens_with_a_legal_move() {
    let lines = run_player(&["init white", "setoption name Depth value 2", "action", "quit"]);
    let played = actions(&lines);
    assert_eq!(played.len(), 1);
    let legal = legal_actions(&Position::start(Color::White), Side::Own);
    assert!(legal.contains(&played[0]), "illegal opening {}", played[0]);

    let info = lines.iter().find(|l| l.starts_with("info ")).unwrap();
    assert!(info.starts_with("info depth 2 nodes "));
}

#[test]
fn black_answers_after_update() {
    let lines = run_player(&[
        "init black",
        "setoption name Depth value 1",
        "update white MOVE 1 3 1 3 2",
        "action",
        "quit",
    ]);
    let played = actions(&lines);
    assert_eq!(played.len(), 1);

    let white_view = Position::start(Color::White).apply_action(
        &parse_action("MOVE 1 3 1 3 2").unwrap(),
        Side::Own,
    );
    let legal = legal_actions(&white_view.flipped(), Side::Own);
    assert!(legal.contains(&played[0]));
}

#[test]
fn variant_and_ordering_options_are_accepted() {
    let lines = run_player(&[
        "init white",
        "setoption name Depth value 2",
        "setoption name Variant value pvs",
        "setoption name Ordering value endgame",
        "action",
        "quit",
    ]);
    assert_eq!(actions(&lines).len(), 1);
}

#[test]
fn action_depth_parameter_overrides_option() {
    let lines = run_player(&["init white", "action depth 1", "quit"]);
    assert!(lines.iter().any(|l| l.starts_with("info depth 1 ")));
    assert_eq!(actions(&lines).len(), 1);
}

#[test]
fn two_players_play_a_short_game() {
    // Alternate between a white and a black player by feeding each the
    // other's answers through fresh sessions.
    let mut history: Vec<String> = Vec::new();
    for ply in 0..4 {
        let color = if ply % 2 == 0 { "white" } else { "black" };
        let mut commands = vec![format!("init {}", color), "setoption name Depth value 1".to_string()];
        for (i, played) in history.iter().enumerate() {
            let mover = if i % 2 == 0 { "white" } else { "black" };
            commands.push(format!("update {} {}", mover, played));
        }
        commands.push("action".to_string());
        commands.push("quit".to_string());
        let refs: Vec<&str> = commands.iter().map(String::as_str).collect();
        let lines = run_player(&refs);
        let played = actions(&lines);
        assert_eq!(played.len(), 1, "ply {}", ply);
        history.push(played[0].to_string());
    }
    assert_eq!(history.len(), 4);
}

#[test]
fn illegal_updates_are_ignored() {
    let mut commands = vec!["init black", "setoption name Depth value 1"];
    commands.extend(std::iter::repeat("update white MOVE 12 0 0 0 2").take(12));
    commands.extend(["update white MOVE 1 3 1 3 2", "action", "quit"]);
    let lines = run_player(&commands);
    let played = actions(&lines);
    assert_eq!(played.len(), 1);

    let white_view = Position::start(Color::White).apply_action(
        &parse_action("MOVE 1 3 1 3 2").unwrap(),
        Side::Own,
    );
    let legal = legal_actions(&white_view.flipped(), Side::Own);
    assert!(legal.contains(&played[0]));
}

#[test]
fn missing_weights_file_keeps_session_alive() {
    let lines = run_player(&["weights /nonexistent/weights.json", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn weights_file_is_loaded() {
    let dir = std::env::temp_dir().join(format!("expendibots-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("weights.json");
    std::fs::write(&path, "[0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]\n").unwrap();

    let load = format!("weights {}", path.display());
    let lines = run_player(&[&load, "init white", "setoption name Depth value 1", "action", "quit"]);
    assert_eq!(actions(&lines).len(), 1);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn eof_exits_cleanly() {
    let lines = run_player(&["init white"]);
    assert!(lines.is_empty());
}
