use jiff::SignedDuration;
use serde::Serialize;

use crate::{
    dimension::{CumulBounds, Dimension},
    problem::{
        node::NodeIdx,
        routing_problem::RoutingProblem,
        travel_matrices::{Cost, Objective},
    },
    solver::{ls::local_search::StopCause, solution::search_solution::SearchSolution},
};

/// How the search that produced an [`Assignment`] ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    /// Whether the improvement phase ran and beat the constructed solution.
    pub improved: bool,
    pub iterations: usize,
    pub accepted_moves: usize,
    pub elapsed: SignedDuration,
    pub stop: StopCause,
}

impl SearchSummary {
    pub fn construction_only(elapsed: SignedDuration) -> Self {
        SearchSummary {
            improved: false,
            iterations: 0,
            accepted_moves: 0,
            elapsed,
            stop: StopCause::ConstructionOnly,
        }
    }
}

/// The solver's immutable output: per-vehicle successor chains over the
/// nodes plus the resolved cumulative value of every dimension at every
/// visited node. Each vehicle's path starts at the depot, follows
/// [`Assignment::successor`] links and returns to the depot; every demand
/// node sits on exactly one chain.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    successors: Vec<NodeIdx>,
    starts: Vec<NodeIdx>,
    dimension_names: Vec<&'static str>,
    /// Resolved cumul per dimension per demand node; depot entries unused,
    /// the per-vehicle values below cover the route ends.
    node_cumuls: Vec<Vec<CumulBounds>>,
    route_start_cumuls: Vec<Vec<CumulBounds>>,
    route_end_cumuls: Vec<Vec<CumulBounds>>,
    objective: Objective,
    total_cost: Cost,
    summary: SearchSummary,
}

impl Assignment {
    pub(crate) fn from_solution(
        problem: &RoutingProblem,
        dimensions: &[Dimension],
        objective: Objective,
        solution: &SearchSolution,
        summary: SearchSummary,
    ) -> Self {
        let depot = problem.depot();
        let zero = CumulBounds { min: 0, max: 0 };

        let mut successors = vec![depot; problem.num_nodes()];
        let mut starts = Vec::with_capacity(solution.routes().len());
        let mut node_cumuls = vec![vec![zero; problem.num_nodes()]; dimensions.len()];
        let mut route_start_cumuls = Vec::with_capacity(solution.routes().len());
        let mut route_end_cumuls = Vec::with_capacity(solution.routes().len());

        for route in solution.routes() {
            let stops = route.stops();
            starts.push(stops.first().copied().unwrap_or(depot));

            for (position, &stop) in stops.iter().enumerate() {
                successors[stop.get()] = stops.get(position + 1).copied().unwrap_or(depot);
            }

            let mut start_cumuls = Vec::with_capacity(dimensions.len());
            let mut end_cumuls = Vec::with_capacity(dimensions.len());
            for dimension in 0..dimensions.len() {
                let values = route.dimension_values(dimension);
                start_cumuls.push(values.start());
                end_cumuls.push(values.end());

                for (position, &stop) in stops.iter().enumerate() {
                    node_cumuls[dimension][stop.get()] = values.stop(position);
                }
            }
            route_start_cumuls.push(start_cumuls);
            route_end_cumuls.push(end_cumuls);
        }

        Assignment {
            successors,
            starts,
            dimension_names: dimensions.iter().map(Dimension::name).collect(),
            node_cumuls,
            route_start_cumuls,
            route_end_cumuls,
            objective,
            total_cost: solution.total_cost(),
            summary,
        }
    }

    pub fn num_vehicles(&self) -> usize {
        self.starts.len()
    }

    /// First node of the vehicle's chain; the depot itself when the vehicle
    /// stays home.
    pub fn vehicle_start(&self, vehicle: usize) -> NodeIdx {
        self.starts[vehicle]
    }

    pub fn successor(&self, node: NodeIdx) -> NodeIdx {
        self.successors[node.get()]
    }

    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimension_names
            .iter()
            .position(|&dimension| dimension == name)
    }

    pub fn dimension_names(&self) -> &[&'static str] {
        &self.dimension_names
    }

    /// Resolved cumul of one dimension at a visited demand node.
    pub fn cumul(&self, dimension: usize, node: NodeIdx) -> CumulBounds {
        self.node_cumuls[dimension][node.get()]
    }

    pub fn route_start_cumul(&self, vehicle: usize, dimension: usize) -> CumulBounds {
        self.route_start_cumuls[vehicle][dimension]
    }

    /// Cumul on arrival back at the depot, carrying the route total.
    pub fn route_end_cumul(&self, vehicle: usize, dimension: usize) -> CumulBounds {
        self.route_end_cumuls[vehicle][dimension]
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    pub fn summary(&self) -> &SearchSummary {
        &self.summary
    }
}
