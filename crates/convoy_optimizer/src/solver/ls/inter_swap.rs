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

/// **Inter-Route Swap**
///
/// Exchanges the stop at `first` of one route with the stop at `second` of
/// another.
///
/// ```text
/// BEFORE:
///    Route 1: ... (A) -> [first]  -> (C) ...
///    Route 2: ... (D) -> [second] -> (B) ...
///
/// AFTER:
///    Route 1: ... (A) -> [second] -> (C) ...
///    Route 2: ... (D) -> [first]  -> (B) ...
/// ```
#[derive(Debug)]
pub struct InterSwapOperator {
    params: InterSwapParams,
}

#[derive(Debug)]
pub struct InterSwapParams {
    pub first_route: RouteIdx,
    pub second_route: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl InterSwapOperator {
    pub fn new(params: InterSwapParams) -> Self {
        if params.first_route == params.second_route {
            panic!("InterSwapOperator routes must be different");
        }

        Self { params }
    }

    fn rebuilt_stops(&self, solution: &SearchSolution) -> (Stops, Stops) {
        let mut first_route: Stops =
            SmallVec::from_slice(solution.route(self.params.first_route).stops());
        let mut second_route: Stops =
            SmallVec::from_slice(solution.route(self.params.second_route).stops());

        std::mem::swap(
            &mut first_route[self.params.first],
            &mut second_route[self.params.second],
        );

        (first_route, second_route)
    }
}

impl LocalSearchOperator for InterSwapOperator {
    fn generate_moves<C>(solution: &SearchSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        // Every unordered route pair is visited in both orders, so only act
        // on one of them.
        if r1 >= r2 {
            return;
        }

        for first in 0..solution.route(r1).len() {
            for second in 0..solution.route(r2).len() {
                consumer(InterSwapOperator::new(InterSwapParams {
                    first_route: r1,
                    second_route: r2,
                    first,
                    second,
                }));
            }
        }
    }

    fn cost_delta(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> Cost {
        let depot = ctx.problem.depot();
        let first_stops = solution.route(self.params.first_route).stops();
        let second_stops = solution.route(self.params.second_route).stops();

        let x = first_stops[self.params.first];
        let y = second_stops[self.params.second];

        let a = stop_before(depot, first_stops, self.params.first);
        let c = stop_after(depot, first_stops, self.params.first);
        let d = stop_before(depot, second_stops, self.params.second);
        let b = stop_after(depot, second_stops, self.params.second);

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
        let (first_route, second_route) = self.rebuilt_stops(solution);

        RouteState::is_feasible(ctx.problem, ctx.dimensions, &first_route)
            && RouteState::is_feasible(ctx.problem, ctx.dimensions, &second_route)
    }

    fn apply(&self, ctx: &MoveContext<'_>, solution: &mut SearchSolution) {
        let (first_route, second_route) = self.rebuilt_stops(solution);

        solution.route_mut(self.params.first_route).set_stops(
            ctx.problem,
            ctx.dimensions,
            ctx.objective,
            first_route,
        );
        solution.route_mut(self.params.second_route).set_stops(
            ctx.problem,
            ctx.dimensions,
            ctx.objective,
            second_route,
        );
    }

    fn updated_routes(&self) -> (RouteIdx, Option<RouteIdx>) {
        (self.params.first_route, Some(self.params.second_route))
    }
}
