use crate::{
    dimension::{CAPACITY_DIMENSION, CumulBounds, TIME_DIMENSION},
    plan::route_plan::{RoutePlan, RouteReport, StopReport},
    problem::routing_problem::RoutingProblem,
    solver::assignment::Assignment,
};

/// Decodes an [`Assignment`] into ordered per-vehicle routes with their
/// statistics. Walks each vehicle's successor chain from the depot back to
/// the depot, drops vehicles that never leave, and reads loads and times
/// straight from the resolved dimension values. Pure read; decoding the same
/// assignment twice yields the same plan.
pub fn decode(problem: &RoutingProblem, assignment: &Assignment) -> RoutePlan {
    let depot = problem.depot();
    let capacity = assignment.dimension_index(CAPACITY_DIMENSION);
    let time = assignment.dimension_index(TIME_DIMENSION);
    let zero = CumulBounds { min: 0, max: 0 };

    let mut routes = Vec::new();
    let mut total_distance = 0;
    let mut total_duration = 0;

    for vehicle in 0..assignment.num_vehicles() {
        let mut stops = Vec::new();
        let mut distance = 0;

        let mut prev = depot;
        let mut node = assignment.vehicle_start(vehicle);
        while node != depot {
            distance += problem.distance(prev, node);
            stops.push(StopReport {
                node,
                label: problem.label(node).map(str::to_owned),
                load: capacity.map_or(0, |dim| assignment.cumul(dim, node).min),
                time: time.map_or(zero, |dim| assignment.cumul(dim, node)),
            });

            prev = node;
            node = assignment.successor(node);
        }

        if stops.is_empty() {
            continue;
        }

        distance += problem.distance(prev, depot);

        let load = capacity.map_or(0, |dim| assignment.route_end_cumul(vehicle, dim).min);
        let duration = time.map_or(0, |dim| {
            assignment.route_end_cumul(vehicle, dim).min
                - assignment.route_start_cumul(vehicle, dim).min
        });

        total_distance += distance;
        total_duration += duration;
        routes.push(RouteReport {
            vehicle,
            stops,
            distance,
            load,
            duration,
        });
    }

    RoutePlan {
        routes,
        total_distance,
        total_duration,
        summary: assignment.summary().clone(),
    }
}
