//! Negamax search with alpha-beta pruning.
//!
//! Values are always seen from the side to move at each node: a child's
//! value is negated on the way up, and the `(alpha, beta)` window is negated
//! and swapped on the way down. Every node also returns the position at the
//! bottom of its principal line, which is the leaf TD-Leaf training learns
//! from.
//!
//! The principal-variation variant searches the first child with the full
//! window and later children with a null window around alpha, re-searching
//! only when a probe lands strictly inside the window.

use tracing::debug;

use super::{SearchError, SearchOptions, SearchOutcome, SearchVariant};
use crate::board::{Action, Position, Side};
use crate::eval::EvaluationContext;
use crate::movegen::{generate, RepetitionTable};

/// Width of the null window used by principal-variation probes.
const NULL_WINDOW: f64 = 1e-9;

/// Result of searching one node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    /// Value from the perspective of the side to move at this node.
    pub value: f64,
    /// Deepest position along the chosen line.
    pub leaf: Position,
    /// Best action, None at leaves.
    pub action: Option<Action>,
}

/// A depth-first searcher bound to one evaluation context.
pub struct Searcher<'a> {
    ctx: &'a EvaluationContext,
    options: SearchOptions,
    nodes: u64,
}

impl<'a> Searcher<'a> {
    pub fn new(ctx: &'a EvaluationContext, options: SearchOptions) -> Self {
        Searcher {
            ctx,
            options,
            nodes: 0,
        }
    }

    /// Nodes visited by the most recent search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Searches `pos` to `depth` plies for `side` and returns the best action.
    ///
    /// `visited` holds positions already seen in the game; successors equal
    /// to one of them are avoided. A depth of 0 is treated as 1.
    pub fn search(
        &mut self,
        pos: &Position,
        depth: u32,
        side: Side,
        visited: &RepetitionTable,
    ) -> Result<SearchOutcome, SearchError> {
        if pos.is_terminal() {
            return Err(SearchError::GameOver);
        }
        self.nodes = 0;
        let depth = depth.max(1);

        let outcome = if self.options.parallel {
            let children = generate(pos, side, self.options.ordering, visited);
            super::parallel::search_root(self.ctx, self.options, &children, depth, side, visited)?
        } else {
            let node = self.negamax(pos, depth, side, f64::NEG_INFINITY, f64::INFINITY, visited)?;
            let action = node.action.ok_or(SearchError::NoLegalActions { side })?;
            SearchOutcome {
                value: node.value,
                action,
                leaf: node.leaf,
                nodes: self.nodes,
            }
        };
        self.nodes = outcome.nodes;

        debug!(
            depth,
            value = outcome.value,
            nodes = outcome.nodes,
            action = %outcome.action,
            "search complete"
        );
        Ok(outcome)
    }

    /// Unpruned minimax over the same tree, for verifying pruning.
    pub fn search_full_width(
        &mut self,
        pos: &Position,
        depth: u32,
        side: Side,
        visited: &RepetitionTable,
    ) -> Result<SearchOutcome, SearchError> {
        if pos.is_terminal() {
            return Err(SearchError::GameOver);
        }
        self.nodes = 0;
        let node = self.minimax(pos, depth.max(1), side, visited)?;
        let action = node.action.ok_or(SearchError::NoLegalActions { side })?;
        Ok(SearchOutcome {
            value: node.value,
            action,
            leaf: node.leaf,
            nodes: self.nodes,
        })
    }

    /// Static value of `pos` for the side to move.
    #[inline]
    fn leaf_value(&self, pos: &Position, side: Side) -> f64 {
        side.sign() as f64 * self.ctx.reward(pos)
    }

    pub(crate) fn negamax(
        &mut self,
        pos: &Position,
        depth: u32,
        side: Side,
        mut alpha: f64,
        beta: f64,
        visited: &RepetitionTable,
    ) -> Result<Node, SearchError> {
        self.nodes += 1;
        if depth == 0 || pos.is_terminal() {
            return Ok(Node {
                value: self.leaf_value(pos, side),
                leaf: *pos,
                action: None,
            });
        }

        let children = generate(pos, side, self.options.ordering, visited);
        if children.is_empty() {
            return Err(SearchError::NoLegalActions { side });
        }

        let mut best = Node {
            value: f64::NEG_INFINITY,
            leaf: *pos,
            action: None,
        };

        for (i, (action, child)) in children.iter().enumerate() {
            let (value, leaf) = match self.options.variant {
                SearchVariant::PrincipalVariation if i > 0 => {
                    let probe = self.negamax(
                        child,
                        depth - 1,
                        side.other(),
                        -alpha - NULL_WINDOW,
                        -alpha,
                        visited,
                    )?;
                    let v = -probe.value;
                    if v > alpha && v < beta {
                        let full = self.negamax(child, depth - 1, side.other(), -beta, -alpha, visited)?;
                        (-full.value, full.leaf)
                    } else {
                        (v, probe.leaf)
                    }
                }
                _ => {
                    let full = self.negamax(child, depth - 1, side.other(), -beta, -alpha, visited)?;
                    (-full.value, full.leaf)
                }
            };

            if value > best.value {
                best = Node {
                    value,
                    leaf,
                    action: Some(*action),
                };
            }
            if value > alpha {
                alpha = value;
            }
            if alpha >= beta {
                break;
            }
        }

        Ok(best)
    }

    fn minimax(
        &mut self,
        pos: &Position,
        depth: u32,
        side: Side,
        visited: &RepetitionTable,
    ) -> Result<Node, SearchError> {
        self.nodes += 1;
        if depth == 0 || pos.is_terminal() {
            return Ok(Node {
                value: self.leaf_value(pos, side),
                leaf: *pos,
                action: None,
            });
        }

        let children = generate(pos, side, self.options.ordering, visited);
        if children.is_empty() {
            return Err(SearchError::NoLegalActions { side });
        }

        let mut best = Node {
            value: f64::NEG_INFINITY,
            leaf: *pos,
            action: None,
        };
        for (action, child) in &children {
            let sub = self.minimax(child, depth - 1, side.other(), visited)?;
            let value = -sub.value;
            if value > best.value {
                best = Node {
                    value,
                    leaf: sub.leaf,
                    action: Some(*action),
                };
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Square};
    use crate::eval::Weights;
    use crate::movegen::MoveOrdering;

    fn sq(x: usize, y: usize) -> Square {
        Square::from_xy(x, y).unwrap()
    }

    fn options(variant: SearchVariant) -> SearchOptions {
        SearchOptions {
            variant,
            ordering: MoveOrdering::Standard,
            parallel: false,
        }
    }

    #[test]
    fn takes_the_winning_detonation() {
        let ctx = EvaluationContext::default();
        let pos = Position::empty()
            .with_stack(sq(3, 3), 1)
            .with_stack(sq(4, 4), -2)
            .with_stack(sq(7, 0), 2);
        let mut searcher = Searcher::new(&ctx, options(SearchVariant::AlphaBeta));
        let out = searcher
            .search(&pos, 2, Side::Own, &RepetitionTable::new())
            .unwrap();
        assert_eq!(out.action, Action::Boom { at: sq(3, 3) });
        assert_eq!(out.value, 1.0);
        assert!(out.leaf.is_terminal());
    }

    #[test]
    fn opponent_value_is_negated() {
        let ctx = EvaluationContext::default();
        let pos = Position::empty()
            .with_stack(sq(3, 3), -1)
            .with_stack(sq(4, 4), 2)
            .with_stack(sq(0, 7), -2);
        let mut searcher = Searcher::new(&ctx, options(SearchVariant::AlphaBeta));
        let out = searcher
            .search(&pos, 1, Side::Opponent, &RepetitionTable::new())
            .unwrap();
        assert_eq!(out.action, Action::Boom { at: sq(3, 3) });
        // Opponent wins: from its perspective the value is +1.
        assert_eq!(out.value, 1.0);
        assert_eq!(ctx.reward(&out.leaf), -1.0);
    }

    #[test]
    fn terminal_root_is_game_over() {
        let ctx = EvaluationContext::default();
        let pos = Position::empty().with_stack(sq(0, 0), 1);
        let mut searcher = Searcher::new(&ctx, options(SearchVariant::AlphaBeta));
        let err = searcher
            .search(&pos, 2, Side::Own, &RepetitionTable::new())
            .unwrap_err();
        assert!(matches!(err, SearchError::GameOver));
    }

    #[test]
    fn pruning_preserves_value_and_action() {
        let ctx = EvaluationContext::new(Weights::default());
        let pos = Position::start(Color::White);
        let visited = RepetitionTable::new();
        let mut pruned = Searcher::new(&ctx, options(SearchVariant::AlphaBeta));
        let a = pruned.search(&pos, 2, Side::Own, &visited).unwrap();
        let mut full = Searcher::new(&ctx, options(SearchVariant::AlphaBeta));
        let b = full.search_full_width(&pos, 2, Side::Own, &visited).unwrap();
        assert_eq!(a.value, b.value);
        assert_eq!(a.action, b.action);
        assert!(a.nodes <= b.nodes);
    }

    #[test]
    fn pvs_matches_alpha_beta() {
        let ctx = EvaluationContext::default();
        let pos = Position::empty()
            .with_stack(sq(1, 1), 2)
            .with_stack(sq(2, 4), 1)
            .with_stack(sq(4, 3), -1)
            .with_stack(sq(5, 5), -2)
            .with_stack(sq(6, 2), 1);
        let visited = RepetitionTable::new();
        for depth in 1..=3 {
            let ab = Searcher::new(&ctx, options(SearchVariant::AlphaBeta))
                .search(&pos, depth, Side::Own, &visited)
                .unwrap();
            let pvs = Searcher::new(&ctx, options(SearchVariant::PrincipalVariation))
                .search(&pos, depth, Side::Own, &visited)
                .unwrap();
            assert_eq!(ab.value, pvs.value, "depth {}", depth);
            assert_eq!(ab.action, pvs.action, "depth {}", depth);
        }
    }

    #[test]
    fn leaf_lies_on_the_principal_line() {
        let ctx = EvaluationContext::default();
        let pos = Position::start(Color::White);
        let visited = RepetitionTable::new();
        let mut searcher = Searcher::new(&ctx, options(SearchVariant::AlphaBeta));
        let out = searcher.search(&pos, 3, Side::Own, &visited).unwrap();
        // The leaf value reproduces the root value (sign of the side to move at the root).
        assert!((ctx.reward(&out.leaf) - out.value).abs() < 1e-12);
        // Tokens are conserved along a move-only line.
        assert_eq!(out.leaf.tokens(Side::Own) + out.leaf.tokens(Side::Opponent), 24);
    }

    #[test]
    fn first_discovered_wins_ties() {
        let ctx = EvaluationContext::new(Weights::zeros());
        let pos = Position::start(Color::White);
        let visited = RepetitionTable::new();
        let out = Searcher::new(&ctx, options(SearchVariant::AlphaBeta))
            .search(&pos, 1, Side::Own, &visited)
            .unwrap();
        let first = generate(&pos, Side::Own, MoveOrdering::Standard, &visited)[0].0;
        assert_eq!(out.value, 0.0);
        assert_eq!(out.action, first);
    }
}
