use thiserror::Error;

use crate::problem::travel_matrices::Load;

/// Rejections raised while assembling a [`RoutingProblem`] or checking the
/// search inputs, always before any search step runs.
///
/// [`RoutingProblem`]: crate::problem::routing_problem::RoutingProblem
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("distance matrix row {row} has {len} entries, expected {expected}")]
    NonSquareDistances { row: usize, len: usize, expected: usize },

    #[error("duration matrix row {row} has {len} entries, expected {expected}")]
    NonSquareDurations { row: usize, len: usize, expected: usize },

    #[error("duration matrix covers {durations} nodes but the distance matrix covers {nodes}")]
    MatrixSizeMismatch { durations: usize, nodes: usize },

    #[error("demand vector has {demands} entries but the matrices cover {nodes} nodes")]
    DemandLengthMismatch { demands: usize, nodes: usize },

    #[error("label list has {labels} entries but the matrices cover {nodes} nodes")]
    LabelLengthMismatch { labels: usize, nodes: usize },

    #[error("depot index {depot} is out of range for {nodes} nodes")]
    DepotOutOfRange { depot: usize, nodes: usize },

    #[error("{matrix} matrix entry ({from}, {to}) is negative: {value}")]
    NegativeMatrixEntry {
        matrix: &'static str,
        from: usize,
        to: usize,
        value: i64,
    },

    #[error("{matrix} matrix diagonal entry ({node}, {node}) must be zero, got {value}")]
    NonZeroDiagonal {
        matrix: &'static str,
        node: usize,
        value: i64,
    },

    #[error("node {node} has a negative demand of {demand}")]
    NegativeDemand { node: usize, demand: Load },

    #[error("the depot (node {depot}) must have zero demand, got {demand}")]
    DepotDemand { depot: usize, demand: Load },

    #[error("the fleet needs at least one vehicle")]
    NoVehicles,

    #[error("vehicle capacity must be positive, got {0}")]
    NonPositiveCapacity(Load),

    #[error("dimension {name} declares inverted bounds [{min}, {max}]")]
    InvertedBounds {
        name: &'static str,
        min: i64,
        max: i64,
    },

    #[error("dimension {name} declares a negative slack of {slack}")]
    NegativeSlack { name: &'static str, slack: i64 },

    #[error("dimension {0} is attached more than once")]
    DuplicateDimension(&'static str),

    #[error("local search is enabled but no termination limit is set")]
    NoTermination,

    #[error("guided local search lambda factor must be positive and finite, got {0}")]
    InvalidLambdaFactor(f64),
}
