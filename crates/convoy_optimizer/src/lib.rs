pub mod dimension;
pub mod plan;
pub mod problem;
pub mod solver;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

use crate::{
    dimension::Dimension,
    plan::{decode::decode, route_plan::RoutePlan},
    problem::{
        routing_problem::{RoutingProblem, RoutingProblemBuilder},
        travel_matrices::{Distance, Duration, Load, Objective},
    },
    solver::{engine::RoutingEngine, search_params::SearchParams, solve_error::SolveError},
};

/// One-call surface over the solver: builds the problem from the raw
/// matrices, demand vector and fleet, attaches the standard capacity and
/// time dimensions, minimizes distance, solves and decodes.
///
/// With `use_metaheuristic` the constructed solution is improved by guided
/// local search under the default budget; without it the construction
/// result is returned as-is.
pub fn solve_and_decode(
    distances: Vec<Vec<Distance>>,
    durations: Vec<Vec<Duration>>,
    demands: Vec<Load>,
    num_vehicles: usize,
    vehicle_capacity: Load,
    time_horizon: Duration,
    use_metaheuristic: bool,
) -> Result<RoutePlan, SolveError> {
    let mut builder = RoutingProblemBuilder::default();
    builder.set_distances(distances);
    builder.set_durations(durations);
    builder.set_demands(demands);
    builder.set_num_vehicles(num_vehicles);
    builder.set_vehicle_capacity(vehicle_capacity);
    let problem = builder.build()?;

    solve_problem(&problem, time_horizon, use_metaheuristic)
}

/// [`solve_and_decode`] over an already assembled problem, for callers that
/// carry place labels or reuse one instance across solves.
pub fn solve_problem(
    problem: &RoutingProblem,
    time_horizon: Duration,
    use_metaheuristic: bool,
) -> Result<RoutePlan, SolveError> {
    let dimensions = [
        Dimension::capacity(problem.vehicle_capacity()),
        Dimension::time(time_horizon),
    ];

    let params = if use_metaheuristic {
        SearchParams::default()
    } else {
        SearchParams::construction_only()
    };

    let engine = RoutingEngine::new();
    let assignment = engine.solve(problem, &dimensions, Objective::Distance, &params)?;

    Ok(decode(problem, &assignment))
}
