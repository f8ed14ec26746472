use serde::Serialize;

use crate::{
    dimension::CumulBounds,
    problem::{
        node::NodeIdx,
        travel_matrices::{Distance, Duration, Load},
    },
    solver::assignment::SearchSummary,
};

/// One visited demand node, with the resolved dimension values at the visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopReport {
    pub node: NodeIdx,
    /// Place identifier from the model, when the caller supplied labels.
    pub label: Option<String>,
    /// Load carried after serving the stop.
    pub load: Load,
    /// Earliest and latest feasible arrival.
    pub time: CumulBounds,
}

/// One non-empty vehicle route, in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub vehicle: usize,
    pub stops: Vec<StopReport>,
    /// Travel distance of the full loop, depot to depot.
    pub distance: Distance,
    /// Load delivered over the route.
    pub load: Load,
    /// Elapsed time from leaving the depot to returning.
    pub duration: Duration,
}

impl RouteReport {
    pub fn nodes(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.stops.iter().map(|stop| stop.node)
    }
}

/// Decoded solve output handed to reporting and export collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub routes: Vec<RouteReport>,
    pub total_distance: Distance,
    pub total_duration: Duration,
    pub summary: SearchSummary,
}

impl RoutePlan {
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn num_stops(&self) -> usize {
        self.routes.iter().map(|route| route.stops.len()).sum()
    }
}
