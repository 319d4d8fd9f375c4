//! Protocol session state.
//!
//! Holds the player for the current game, the weights to hand it, and the
//! options set so far, and answers the protocol commands.

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::board::{Action, Color};
use crate::eval::{EvaluationContext, Weights};
use crate::movegen::{is_legal, MoveOrdering};
use crate::player::{Player, PlayerConfig};
use crate::protocol::notation::format_action;
use crate::protocol::records::{load_weights, RecordError};
use crate::search::SearchVariant;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    player: Option<Player>,
    weights: Weights,
    config: PlayerConfig,
}

impl Engine {
    /// Creates an engine with default weights and no game in progress.
    pub fn new(config: PlayerConfig) -> Self {
        Engine {
            player: None,
            weights: Weights::default(),
            config,
        }
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Starts a new game playing `color`.
    pub fn init(&mut self, color: Color) {
        let ctx = EvaluationContext::new(self.weights.clone());
        self.player = Some(Player::new(color, ctx, self.config.clone()));
        info!(color = color.name(), depth = self.config.depth, "new game");
    }

    /// Loads weights for this and every later game.
    pub fn load_weights(&mut self, path: &Path) -> Result<(), RecordError> {
        let weights = load_weights(path)?;
        if let Some(player) = self.player.as_mut() {
            player.set_weights(weights.clone());
        }
        self.weights = weights;
        Ok(())
    }

    /// Sets a player option. Unknown names and bad values are logged and ignored.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) {
        let value = value.unwrap_or("");
        let applied = match name.to_ascii_lowercase().as_str() {
            "depth" => match value.parse::<u32>() {
                Ok(d) => {
                    self.config.depth = d.max(1);
                    true
                }
                Err(_) => false,
            },
            "variant" => match SearchVariant::from_name(value) {
                Some(v) => {
                    self.config.variant = v;
                    true
                }
                None => false,
            },
            "ordering" if value.eq_ignore_ascii_case("auto") => {
                self.config.endgame_threshold = Some(AUTO_ENDGAME_THRESHOLD);
                true
            }
            "ordering" => match MoveOrdering::from_name(value) {
                Some(o) => {
                    self.config.ordering = o;
                    self.config.endgame_threshold = None;
                    true
                }
                None => false,
            },
            "parallel" => match value.parse::<bool>() {
                Ok(p) => {
                    self.config.parallel = p;
                    true
                }
                Err(_) => false,
            },
            _ => {
                warn!(name, "unknown option");
                return;
            }
        };
        if !applied {
            warn!(name, value, "invalid option value");
            return;
        }
        if let Some(player) = self.player.as_mut() {
            *player.config_mut() = self.config.clone();
        }
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles the `action` command: searches and prints `action <notation>`,
    /// preceded by an `info` line with the search statistics.
    pub fn handle_action<W: Write>(&mut self, depth: Option<u32>, out: &mut W) -> std::io::Result<()> {
        let Some(player) = self.player.as_mut() else {
            warn!("action: no game in progress");
            return Ok(());
        };

        let saved = player.config().depth;
        if let Some(d) = depth {
            player.config_mut().depth = d.max(1);
        }
        let result = player.action();
        player.config_mut().depth = saved;

        match result {
            Ok(action) => {
                if let Some(info) = player.last_search() {
                    writeln!(
                        out,
                        "info depth {} nodes {} score {:.4} time {}",
                        info.depth, info.nodes, info.score, info.elapsed_ms
                    )?;
                }
                writeln!(out, "action {}", format_action(&action))?;
            }
            Err(e) => warn!(error = %e, "action: search failed"),
        }
        out.flush()
    }

    /// Applies an action reported by the runner. Illegal actions are logged
    /// and ignored.
    pub fn update(&mut self, color: Color, action: &Action) {
        let Some(player) = self.player.as_mut() else {
            warn!("update: no game in progress");
            return;
        };
        let side = player.color().relative(color);
        if !is_legal(player.position(), side, action) {
            warn!(color = color.name(), action = %action, "update: illegal action ignored");
            return;
        }
        player.update(color, action);
    }
}

/// Stack count below which `ordering auto` switches to the endgame ordering.
const AUTO_ENDGAME_THRESHOLD: u32 = 6;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, Side, Square};

    fn engine() -> Engine {
        Engine::new(PlayerConfig {
            depth: 1,
            seed: 5,
            ..PlayerConfig::default()
        })
    }

    #[test]
    fn new_engine_has_no_game() {
        let engine = engine();
        assert!(engine.player().is_none());
        assert_eq!(engine.config().depth, 1);
    }

    #[test]
    fn init_starts_at_own_layout() {
        let mut engine = engine();
        engine.init(Color::Black);
        let player = engine.player().unwrap();
        assert_eq!(player.color(), Color::Black);
        assert_eq!(*player.position(), Position::start(Color::Black));
    }

    #[test]
    fn set_option_updates_config() {
        let mut engine = engine();
        engine.init(Color::White);
        engine.set_option("Depth", Some("3"));
        engine.set_option("Variant", Some("pvs"));
        engine.set_option("Ordering", Some("endgame"));
        assert_eq!(engine.config().depth, 3);
        assert_eq!(engine.config().variant, SearchVariant::PrincipalVariation);
        assert_eq!(engine.config().ordering, MoveOrdering::Endgame);
        assert_eq!(engine.player().unwrap().config().depth, 3);

        engine.set_option("Ordering", Some("auto"));
        assert_eq!(engine.config().endgame_threshold, Some(AUTO_ENDGAME_THRESHOLD));
    }

    #[test]
    fn invalid_options_are_ignored() {
        let mut engine = engine();
        engine.set_option("Depth", Some("deep"));
        engine.set_option("Colour", Some("red"));
        engine.set_option("Variant", None);
        assert_eq!(engine.config().depth, 1);
        assert_eq!(engine.config().variant, SearchVariant::AlphaBeta);
    }

    #[test]
    fn handle_action_outputs_notation() {
        let mut engine = engine();
        engine.init(Color::White);
        let mut output = Vec::new();
        engine.handle_action(None, &mut output).unwrap();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.lines().any(|l| l.starts_with("info depth 1 ")));
        let line = output_str
            .lines()
            .find(|l| l.starts_with("action "))
            .unwrap();
        let action = crate::protocol::parse_action(line.strip_prefix("action ").unwrap()).unwrap();
        assert!(!action.is_boom());
    }

    #[test]
    fn handle_action_without_game_is_silent() {
        let mut engine = engine();
        let mut output = Vec::new();
        engine.handle_action(None, &mut output).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn handle_isready_outputs_readyok() {
        let engine = engine();
        let mut output = Vec::new();
        engine.handle_isready(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().trim(), "readyok");
    }

    #[test]
    fn update_moves_the_players_view() {
        let mut engine = engine();
        engine.init(Color::White);
        let from = Square::from_xy(3, 6).unwrap();
        let to = Square::from_xy(3, 5).unwrap();
        engine.update(Color::Black, &Action::Move { n: 1, from, to });
        let pos = engine.player().unwrap().position();
        assert_eq!(pos.get(from), 0);
        assert_eq!(pos.get(to), -1);
    }

    #[test]
    fn illegal_update_leaves_position_unchanged() {
        let mut engine = engine();
        engine.init(Color::White);
        let oversized = crate::protocol::parse_action("MOVE 12 0 0 0 2").unwrap();
        for _ in 0..12 {
            engine.update(Color::White, &oversized);
        }
        // A move of the wrong color's stack is rejected too.
        let wrong_owner = Action::Move {
            n: 1,
            from: Square::from_xy(3, 6).unwrap(),
            to: Square::from_xy(3, 5).unwrap(),
        };
        engine.update(Color::White, &wrong_owner);
        let player = engine.player().unwrap();
        assert_eq!(*player.position(), Position::start(Color::White));
        assert_eq!(player.repetitions(), 1);
    }

    #[test]
    fn self_detonation_update_is_applied() {
        let mut engine = engine();
        engine.init(Color::Black);
        engine.update(Color::White, &Action::Boom { at: Square::from_xy(0, 0).unwrap() });
        let pos = engine.player().unwrap().position();
        assert_eq!(pos.tokens(Side::Opponent), 8);
        assert_eq!(pos.tokens(Side::Own), 12);
    }
}
