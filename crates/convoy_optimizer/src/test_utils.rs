use smallvec::SmallVec;

use crate::{
    dimension::Dimension,
    problem::{
        node::NodeIdx,
        routing_problem::{RoutingProblem, RoutingProblemBuilder},
        travel_matrices::{Distance, Duration, Load, Objective},
    },
    solver::{
        ls::r#move::{ArcCosts, MoveContext},
        solution::{route_id::RouteIdx, search_solution::SearchSolution},
    },
};

/// Distance matrix for nodes sitting at the given positions on a line.
pub fn line_distances(positions: &[i64]) -> Vec<Vec<Distance>> {
    positions
        .iter()
        .map(|&a| positions.iter().map(|&b| (a - b).abs()).collect())
        .collect()
}

/// Manhattan distance matrix for nodes at the given grid coordinates.
pub fn grid_distances(coordinates: &[(i64, i64)]) -> Vec<Vec<Distance>> {
    coordinates
        .iter()
        .map(|&(ax, ay)| {
            coordinates
                .iter()
                .map(|&(bx, by)| (ax - bx).abs() + (ay - by).abs())
                .collect()
        })
        .collect()
}

/// Problem with durations equal to distances and the depot at node 0.
pub fn create_problem(
    distances: Vec<Vec<Distance>>,
    demands: Vec<Load>,
    num_vehicles: usize,
    capacity: Load,
) -> RoutingProblem {
    let durations = distances.clone();
    create_problem_with_durations(distances, durations, demands, num_vehicles, capacity)
}

pub fn create_problem_with_durations(
    distances: Vec<Vec<Distance>>,
    durations: Vec<Vec<Duration>>,
    demands: Vec<Load>,
    num_vehicles: usize,
    capacity: Load,
) -> RoutingProblem {
    let mut builder = RoutingProblemBuilder::default();
    builder.set_distances(distances);
    builder.set_durations(durations);
    builder.set_demands(demands);
    builder.set_num_vehicles(num_vehicles);
    builder.set_vehicle_capacity(capacity);
    builder.build().unwrap()
}

pub fn create_problem_with_labels(
    distances: Vec<Vec<Distance>>,
    demands: Vec<Load>,
    labels: Vec<&str>,
    num_vehicles: usize,
    capacity: Load,
) -> RoutingProblem {
    let mut builder = RoutingProblemBuilder::default();
    builder.set_durations(distances.clone());
    builder.set_distances(distances);
    builder.set_demands(demands);
    builder.set_labels(labels.into_iter().map(str::to_owned).collect());
    builder.set_num_vehicles(num_vehicles);
    builder.set_vehicle_capacity(capacity);
    builder.build().unwrap()
}

/// The two standard dimensions: load against the fleet capacity and elapsed
/// time against the horizon.
pub fn default_dimensions(problem: &RoutingProblem, horizon: Duration) -> Vec<Dimension> {
    vec![
        Dimension::capacity(problem.vehicle_capacity()),
        Dimension::time(horizon),
    ]
}

#[derive(Debug, Clone)]
pub struct TestRoute {
    pub vehicle: usize,
    pub stops: Vec<usize>,
}

pub fn create_solution(
    problem: &RoutingProblem,
    dimensions: &[Dimension],
    objective: Objective,
    routes: Vec<TestRoute>,
) -> SearchSolution {
    let mut solution = SearchSolution::empty(problem, dimensions, objective);

    for route in routes {
        let stops: SmallVec<[NodeIdx; 8]> = route.stops.iter().map(|&i| NodeIdx::new(i)).collect();
        solution
            .route_mut(RouteIdx::new(route.vehicle))
            .set_stops(problem, dimensions, objective, stops);
    }

    solution
}

pub fn plain_context<'a>(
    problem: &'a RoutingProblem,
    dimensions: &'a [Dimension],
) -> MoveContext<'a> {
    MoveContext {
        problem,
        dimensions,
        objective: Objective::Distance,
        costs: ArcCosts::plain(problem, Objective::Distance),
    }
}

pub fn travel_time_context<'a>(
    problem: &'a RoutingProblem,
    dimensions: &'a [Dimension],
) -> MoveContext<'a> {
    MoveContext {
        problem,
        dimensions,
        objective: Objective::TravelTime,
        costs: ArcCosts::plain(problem, Objective::TravelTime),
    }
}
