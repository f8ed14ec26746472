use smallvec::SmallVec;

use crate::{
    dimension::{Dimension, DimensionValues},
    problem::{
        node::NodeIdx,
        routing_problem::RoutingProblem,
        travel_matrices::{Cost, Objective},
    },
};

pub type Stops = SmallVec<[NodeIdx; 8]>;

/// One vehicle's route under search: the ordered demand nodes it visits plus
/// the resolved dimension values and objective cost, refreshed on every
/// mutation. The depot endpoints are implicit.
#[derive(Debug, Clone)]
pub struct RouteState {
    stops: Stops,
    values: Vec<DimensionValues>,
    cost: Cost,
}

impl RouteState {
    pub fn empty(problem: &RoutingProblem, dimensions: &[Dimension], objective: Objective) -> Self {
        let mut route = RouteState {
            stops: Stops::new(),
            values: Vec::new(),
            cost: 0,
        };
        route.recompute(problem, dimensions, objective);
        route
    }

    pub fn stops(&self) -> &[NodeIdx] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn dimension_values(&self, dimension: usize) -> &DimensionValues {
        &self.values[dimension]
    }

    /// Objective cost of `depot -> stops -> depot`.
    pub fn chain_cost(problem: &RoutingProblem, objective: Objective, stops: &[NodeIdx]) -> Cost {
        let depot = problem.depot();
        let mut cost = 0;
        let mut prev = depot;

        for &stop in stops.iter().chain(std::iter::once(&depot)) {
            cost += problem.cost(objective, prev, stop);
            prev = stop;
        }

        cost
    }

    /// Whether every dimension admits the candidate stop sequence.
    pub fn is_feasible(
        problem: &RoutingProblem,
        dimensions: &[Dimension],
        stops: &[NodeIdx],
    ) -> bool {
        dimensions
            .iter()
            .all(|dimension| dimension.admits(problem, stops))
    }

    pub fn insert_stop(
        &mut self,
        problem: &RoutingProblem,
        dimensions: &[Dimension],
        objective: Objective,
        position: usize,
        node: NodeIdx,
    ) {
        self.stops.insert(position, node);
        self.recompute(problem, dimensions, objective);
    }

    pub fn set_stops(
        &mut self,
        problem: &RoutingProblem,
        dimensions: &[Dimension],
        objective: Objective,
        stops: Stops,
    ) {
        self.stops = stops;
        self.recompute(problem, dimensions, objective);
    }

    /// Callers mutate stops only through pre-validated moves, so a failed
    /// resolve here is a solver bug.
    fn recompute(&mut self, problem: &RoutingProblem, dimensions: &[Dimension], objective: Objective) {
        self.values = dimensions
            .iter()
            .map(|dimension| {
                dimension
                    .resolve(problem, &self.stops)
                    .unwrap_or_else(|| {
                        panic!(
                            "route {:?} became infeasible for dimension {}",
                            self.stops,
                            dimension.name()
                        )
                    })
            })
            .collect();
        self.cost = Self::chain_cost(problem, objective, &self.stops);
    }
}
