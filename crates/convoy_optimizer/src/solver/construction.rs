use smallvec::SmallVec;
use tracing::{Level, debug, instrument};

use crate::{
    dimension::Dimension,
    problem::{
        node::NodeIdx,
        routing_problem::RoutingProblem,
        travel_matrices::{Cost, Objective},
    },
    solver::{
        ls::r#move::stop_before,
        solution::{
            route::{RouteState, Stops},
            route_id::RouteIdx,
            search_solution::SearchSolution,
        },
        solve_error::SolveError,
    },
};

#[derive(Debug, Clone, Copy)]
struct Insertion {
    node: NodeIdx,
    route: RouteIdx,
    position: usize,
    added_cost: Cost,
}

/// Cheapest-arc construction: every round inserts the unrouted node whose
/// best feasible insertion adds the least arc cost
/// `cost(prev, node) + cost(node, next) - cost(prev, next)`.
///
/// Candidates are scanned in ascending (node, route, position) order with
/// strict improvement, so ties fall to the lowest node index and the whole
/// construction is deterministic. A round with unrouted nodes left but no
/// feasible insertion anywhere fails with [`SolveError::Infeasible`].
#[instrument(skip_all, level = Level::DEBUG)]
pub fn construct_solution(
    problem: &RoutingProblem,
    dimensions: &[Dimension],
    objective: Objective,
) -> Result<SearchSolution, SolveError> {
    let mut solution = SearchSolution::empty(problem, dimensions, objective);
    let mut unrouted: Vec<NodeIdx> = problem.customers().collect();

    while !unrouted.is_empty() {
        let Some(insertion) =
            find_cheapest_insertion(problem, dimensions, objective, &solution, &unrouted)
        else {
            let node = unrouted[0];
            return Err(SolveError::Infeasible {
                node,
                dimension: blocking_dimension(problem, dimensions, &solution, node),
            });
        };

        debug!(
            node = %insertion.node,
            route = %insertion.route,
            position = insertion.position,
            added_cost = insertion.added_cost,
            "insert"
        );

        solution.route_mut(insertion.route).insert_stop(
            problem,
            dimensions,
            objective,
            insertion.position,
            insertion.node,
        );
        unrouted.retain(|&node| node != insertion.node);
    }

    Ok(solution)
}

fn find_cheapest_insertion(
    problem: &RoutingProblem,
    dimensions: &[Dimension],
    objective: Objective,
    solution: &SearchSolution,
    unrouted: &[NodeIdx],
) -> Option<Insertion> {
    let depot = problem.depot();
    let mut best: Option<Insertion> = None;

    for &node in unrouted {
        for (route_index, route) in solution.routes().iter().enumerate() {
            let route_id = RouteIdx::new(route_index);
            let stops = route.stops();

            for position in 0..=stops.len() {
                let prev = stop_before(depot, stops, position);
                let next = if position == stops.len() {
                    depot
                } else {
                    stops[position]
                };

                let added_cost = problem.cost(objective, prev, node)
                    + problem.cost(objective, node, next)
                    - problem.cost(objective, prev, next);

                if best.is_some_and(|b| added_cost >= b.added_cost) {
                    continue;
                }

                if is_insertion_feasible(problem, dimensions, stops, position, node) {
                    best = Some(Insertion {
                        node,
                        route: route_id,
                        position,
                        added_cost,
                    });
                }
            }
        }
    }

    best
}

fn spliced(stops: &[NodeIdx], position: usize, node: NodeIdx) -> Stops {
    let mut candidate: Stops = SmallVec::from_slice(stops);
    candidate.insert(position, node);
    candidate
}

fn is_insertion_feasible(
    problem: &RoutingProblem,
    dimensions: &[Dimension],
    stops: &[NodeIdx],
    position: usize,
    node: NodeIdx,
) -> bool {
    RouteState::is_feasible(problem, dimensions, &spliced(stops, position, node))
}

/// Names the dimension that blocked every insertion of `node`, when the
/// rejections all trace back to a single one.
fn blocking_dimension(
    problem: &RoutingProblem,
    dimensions: &[Dimension],
    solution: &SearchSolution,
    node: NodeIdx,
) -> Option<&'static str> {
    let mut rejecting: SmallVec<[&'static str; 2]> = SmallVec::new();

    for route in solution.routes() {
        for position in 0..=route.stops().len() {
            let candidate = spliced(route.stops(), position, node);

            for dimension in dimensions {
                if !dimension.admits(problem, &candidate)
                    && !rejecting.contains(&dimension.name())
                {
                    rejecting.push(dimension.name());
                }
            }
        }
    }

    match rejecting.as_slice() {
        [single] => Some(single),
        _ => None,
    }
}
