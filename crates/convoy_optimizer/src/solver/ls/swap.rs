use smallvec::SmallVec;

use crate::{
    problem::travel_matrices::Cost,
    solver::{
        ls::r#move::{LocalSearchOperator, MoveContext, stop_after, stop_before},
        solution::{
            route::{RouteState, Stops},
            route_id::RouteIdx,
            search_solution::SearchSolution,
        },
    },
};

/// **Intra-Route Swap**
///
/// Exchanges the stops at `first` and `second` of one route.
#[derive(Debug)]
pub struct SwapOperator {
    params: SwapParams,
}

#[derive(Debug)]
pub struct SwapParams {
    pub route: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl SwapOperator {
    pub fn new(params: SwapParams) -> Self {
        if params.first >= params.second {
            panic!("SwapOperator 'first' must come before 'second'");
        }

        Self { params }
    }

    fn rebuilt_stops(&self, solution: &SearchSolution) -> Stops {
        let mut stops = SmallVec::from_slice(solution.route(self.params.route).stops());
        stops.swap(self.params.first, self.params.second);
        stops
    }
}

impl LocalSearchOperator for SwapOperator {
    fn generate_moves<C>(solution: &SearchSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();

        for first in 0..len {
            for second in first + 1..len {
                consumer(SwapOperator::new(SwapParams {
                    route: r1,
                    first,
                    second,
                }));
            }
        }
    }

    fn cost_delta(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> Cost {
        let depot = ctx.problem.depot();
        let stops = solution.route(self.params.route).stops();

        let x = stops[self.params.first];
        let y = stops[self.params.second];
        let a = stop_before(depot, stops, self.params.first);
        let b = stop_after(depot, stops, self.params.second);

        if self.params.second == self.params.first + 1 {
            // Adjacent stops share the middle arc.
            let removed = ctx.costs.arc(a, x) + ctx.costs.arc(x, y) + ctx.costs.arc(y, b);
            let added = ctx.costs.arc(a, y) + ctx.costs.arc(y, x) + ctx.costs.arc(x, b);
            return added - removed;
        }

        let c = stop_after(depot, stops, self.params.first);
        let d = stop_before(depot, stops, self.params.second);

        let removed = ctx.costs.arc(a, x)
            + ctx.costs.arc(x, c)
            + ctx.costs.arc(d, y)
            + ctx.costs.arc(y, b);
        let added = ctx.costs.arc(a, y)
            + ctx.costs.arc(y, c)
            + ctx.costs.arc(d, x)
            + ctx.costs.arc(x, b);

        added - removed
    }

    fn is_valid(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> bool {
        RouteState::is_feasible(ctx.problem, ctx.dimensions, &self.rebuilt_stops(solution))
    }

    fn apply(&self, ctx: &MoveContext<'_>, solution: &mut SearchSolution) {
        let stops = self.rebuilt_stops(solution);
        solution.route_mut(self.params.route).set_stops(
            ctx.problem,
            ctx.dimensions,
            ctx.objective,
            stops,
        );
    }

    fn updated_routes(&self) -> (RouteIdx, Option<RouteIdx>) {
        (self.params.route, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{node::NodeIdx, travel_matrices::Objective},
        test_utils::{self, TestRoute},
    };

    #[test]
    fn test_swap_distant_stops() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 1, 2, 3, 4]),
            vec![0, 1, 1, 1, 1],
            1,
            10,
        );
        let dimensions = test_utils::default_dimensions(&problem, 1_000);
        let mut solution = test_utils::create_solution(
            &problem,
            &dimensions,
            Objective::Distance,
            vec![TestRoute {
                vehicle: 0,
                stops: vec![1, 2, 3, 4],
            }],
        );
        let ctx = test_utils::plain_context(&problem, &dimensions);

        let operator = SwapOperator::new(SwapParams {
            route: RouteIdx::new(0),
            first: 0,
            second: 3,
        });

        let cost = solution.route(RouteIdx::new(0)).cost();
        let delta = operator.cost_delta(&ctx, &solution);
        operator.apply(&ctx, &mut solution);

        assert_eq!(solution.route(RouteIdx::new(0)).cost(), cost + delta);
        assert_eq!(
            solution.route(RouteIdx::new(0)).stops(),
            &[4, 2, 3, 1].map(NodeIdx::new)
        );
    }

    #[test]
    fn test_swap_adjacent_stops() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 1, 2, 3, 4]),
            vec![0, 1, 1, 1, 1],
            1,
            10,
        );
        let dimensions = test_utils::default_dimensions(&problem, 1_000);
        let mut solution = test_utils::create_solution(
            &problem,
            &dimensions,
            Objective::Distance,
            vec![TestRoute {
                vehicle: 0,
                stops: vec![1, 2, 3, 4],
            }],
        );
        let ctx = test_utils::plain_context(&problem, &dimensions);

        let operator = SwapOperator::new(SwapParams {
            route: RouteIdx::new(0),
            first: 1,
            second: 2,
        });

        let cost = solution.route(RouteIdx::new(0)).cost();
        let delta = operator.cost_delta(&ctx, &solution);
        operator.apply(&ctx, &mut solution);

        assert_eq!(solution.route(RouteIdx::new(0)).cost(), cost + delta);
        assert_eq!(
            solution.route(RouteIdx::new(0)).stops(),
            &[1, 3, 2, 4].map(NodeIdx::new)
        );
    }
}
