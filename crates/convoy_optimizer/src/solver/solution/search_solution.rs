use crate::{
    dimension::Dimension,
    problem::{routing_problem::RoutingProblem, travel_matrices::{Cost, Objective}},
    solver::solution::{route::RouteState, route_id::RouteIdx},
};

/// Mutable search state: one route per vehicle. Exclusive to a single
/// in-flight solve.
#[derive(Debug, Clone)]
pub struct SearchSolution {
    routes: Vec<RouteState>,
}

impl SearchSolution {
    pub fn empty(problem: &RoutingProblem, dimensions: &[Dimension], objective: Objective) -> Self {
        let routes = (0..problem.num_vehicles())
            .map(|_| RouteState::empty(problem, dimensions, objective))
            .collect();

        SearchSolution { routes }
    }

    pub fn routes(&self) -> &[RouteState] {
        &self.routes
    }

    pub fn route(&self, id: RouteIdx) -> &RouteState {
        &self.routes[id]
    }

    pub fn route_mut(&mut self, id: RouteIdx) -> &mut RouteState {
        &mut self.routes[id]
    }

    pub fn total_cost(&self) -> Cost {
        self.routes.iter().map(RouteState::cost).sum()
    }

    pub fn num_stops(&self) -> usize {
        self.routes.iter().map(RouteState::len).sum()
    }
}
