use thiserror::Error;

use crate::problem::{node::NodeIdx, validation::ValidationError};

/// Why a solve call produced no assignment.
///
/// Budget exhaustion and cancellation are not in here: both still return the
/// best feasible assignment found, with the cause recorded on its search
/// summary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No feasible insertion exists for `node`. When every rejection came
    /// from one dimension, `dimension` names it.
    #[error(
        "no feasible insertion for node {node}{}",
        .dimension.map(|name| format!(" (blocked by the {name} dimension)")).unwrap_or_default()
    )]
    Infeasible {
        node: NodeIdx,
        dimension: Option<&'static str>,
    },
}
