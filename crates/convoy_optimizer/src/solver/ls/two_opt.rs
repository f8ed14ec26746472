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

/// **Intra-Route Two-Opt**
///
/// Reverses the segment `[first..=second]` of one route, exchanging the two
/// arcs that bracket it.
///
/// ```text
/// BEFORE:
///    Route: ... (A) -> [first] -> ... -> [second] -> (B) ...
///
/// AFTER:
///    Route: ... (A) -> [second] -> ... -> [first] -> (B) ...
///
/// Edges Removed: (A->first),  (second->B)
/// Edges Created: (A->second), (first->B)
/// ```
#[derive(Debug)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug)]
pub struct TwoOptParams {
    pub route: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        if params.first >= params.second {
            panic!("TwoOptOperator 'first' must come before 'second'");
        }

        Self { params }
    }

    fn rebuilt_stops(&self, solution: &SearchSolution) -> Stops {
        let mut stops: Stops = SmallVec::from_slice(solution.route(self.params.route).stops());
        stops[self.params.first..=self.params.second].reverse();
        stops
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(solution: &SearchSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        if len < 2 {
            return;
        }

        for first in 0..len - 1 {
            for second in first + 1..len {
                consumer(TwoOptOperator::new(TwoOptParams {
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

        let mut delta = ctx.costs.arc(a, y) + ctx.costs.arc(x, b)
            - ctx.costs.arc(a, x)
            - ctx.costs.arc(y, b);

        // Reversing the segment flips its internal arcs, which only matters
        // when the searched costs are directed.
        if !ctx.costs.is_symmetric() {
            for i in self.params.first..self.params.second {
                delta += ctx.costs.arc(stops[i + 1], stops[i]) - ctx.costs.arc(stops[i], stops[i + 1]);
            }
        }

        delta
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
