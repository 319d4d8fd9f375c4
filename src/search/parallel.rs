//! Root-parallel search.
//!
//! Each root child is searched on the rayon pool with its own sequential
//! searcher and a full window, so child values are exact and the reduction
//! below picks the same action as the sequential search.

use rayon::prelude::*;

use super::negamax::Searcher;
use super::{SearchError, SearchOptions, SearchOutcome};
use crate::board::{Position, Side};
use crate::eval::EvaluationContext;
use crate::movegen::{RepetitionTable, Successor};

pub(crate) fn search_root(
    ctx: &EvaluationContext,
    options: SearchOptions,
    children: &[Successor],
    depth: u32,
    side: Side,
    visited: &RepetitionTable,
) -> Result<SearchOutcome, SearchError> {
    if children.is_empty() {
        return Err(SearchError::NoLegalActions { side });
    }
    let sequential = SearchOptions {
        parallel: false,
        ..options
    };

    let results: Vec<Result<(f64, Position, u64), SearchError>> = children
        .par_iter()
        .map(|(_, child)| {
            let mut searcher = Searcher::new(ctx, sequential);
            let node = searcher.negamax(
                child,
                depth - 1,
                side.other(),
                f64::NEG_INFINITY,
                f64::INFINITY,
                visited,
            )?;
            Ok((-node.value, node.leaf, searcher.nodes()))
        })
        .collect();

    // Sequential reduction keeps the first-discovered tie-break.
    let mut best: Option<SearchOutcome> = None;
    let mut nodes = 1u64;
    for ((action, _), result) in children.iter().zip(results) {
        let (value, leaf, sub_nodes) = result?;
        nodes += sub_nodes;
        if best.as_ref().map_or(true, |b| value > b.value) {
            best = Some(SearchOutcome {
                value,
                action: *action,
                leaf,
                nodes: 0,
            });
        }
    }

    let mut outcome = best.ok_or(SearchError::NoLegalActions { side })?;
    outcome.nodes = nodes;
    Ok(outcome)
}
