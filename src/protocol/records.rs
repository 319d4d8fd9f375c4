//! Weight and game-record files.
//!
//! Weights are stored as a JSON array of floats. Game records are JSONL:
//! one [`GameRecord`] object per line, positions as arrays of 64 integers.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::eval::Weights;
use crate::selfplay::GameRecord;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed record on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Stream(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RecordError + '_ {
    move |source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads a weight vector from a JSON file.
pub fn load_weights(path: &Path) -> Result<Weights, RecordError> {
    let file = File::open(path).map_err(io_error(path))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| RecordError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a weight vector to a JSON file, replacing it.
pub fn save_weights(path: &Path, weights: &Weights) -> Result<(), RecordError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, weights)?;
    writeln!(out).map_err(io_error(path))?;
    out.flush().map_err(io_error(path))
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> Result<(), RecordError> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes a single game record followed by a newline.
pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> Result<(), RecordError> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)?;
    Ok(())
}

/// Reads game records from JSONL, skipping blank lines.
pub fn read_jsonl<R: BufRead>(input: R) -> Result<Vec<GameRecord>, RecordError> {
    let mut games = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let game = serde_json::from_str(&line).map_err(|source| RecordError::Line {
            line: i + 1,
            source,
        })?;
        games.push(game);
    }
    Ok(games)
}

/// Reads every game record in a JSONL file.
pub fn read_jsonl_file(path: &Path) -> Result<Vec<GameRecord>, RecordError> {
    let file = File::open(path).map_err(io_error(path))?;
    read_jsonl(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Outcome, Position};
    use crate::learn::Trajectory;
    use crate::selfplay::EndReason;

    fn record(game_id: usize) -> GameRecord {
        let mut leaves = Trajectory::from(vec![Position::start(Color::Black)]);
        leaves.finish(Outcome::Loss);
        GameRecord {
            game_id,
            learner: Color::Black,
            outcome: Outcome::Loss,
            plies: 41,
            end: EndReason::Annihilation,
            leaves,
        }
    }

    #[test]
    fn jsonl_one_object_per_line() {
        let games = vec![record(0), record(1)];
        let mut buf = Vec::new();
        write_jsonl(&games, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("{\"game_id\":")));
        assert!(text.contains("\"learner\":\"black\""));
        assert!(text.contains("\"end\":\"annihilation\""));
        let back = read_jsonl(buf.as_slice()).unwrap();
        assert_eq!(back, games);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let mut buf = Vec::new();
        write_jsonl(&[record(0)], &mut buf).unwrap();
        buf.extend_from_slice(b"\n{\"game_id\": \n");
        match read_jsonl(buf.as_slice()) {
            Err(RecordError::Line { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a line error, got {:?}", other),
        }
    }

    #[test]
    fn weights_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("expendibots-weights-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("weights.json");
        let w = Weights::from_array([0.5, -0.25, 0.0, 1.0, 2.0, -3.0, 0.125, 4.0]);
        save_weights(&path, &w).unwrap();
        assert_eq!(load_weights(&path).unwrap(), w);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_weights_file_names_the_path() {
        let err = load_weights(Path::new("/nonexistent/weights.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/weights.json"));
    }
}
