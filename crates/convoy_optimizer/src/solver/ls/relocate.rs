use smallvec::SmallVec;
use tracing::{Level, instrument};

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

/// **Intra-Route Relocate**
///
/// Removes the stop at `from` and reinserts it at `to`, where `to` indexes
/// the route as it stands after the removal.
///
/// ```text
/// BEFORE:
///    Route: ... (A) -> [from] -> (C) ... (X) -> (Y) ...
///
/// AFTER:
///    Route: ... (A) -> (C) ... (X) -> [from] -> (Y) ...
///
/// Edges Removed: (A->from), (from->C), (X->Y)
/// Edges Created: (A->C),    (X->from), (from->Y)
/// ```
#[derive(Debug)]
pub struct RelocateOperator {
    params: RelocateParams,
}

#[derive(Debug)]
pub struct RelocateParams {
    pub route: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl RelocateOperator {
    pub fn new(params: RelocateParams) -> Self {
        if params.from == params.to {
            panic!("RelocateOperator 'from' and 'to' positions must be different");
        }

        Self { params }
    }

    fn rebuilt_stops(&self, solution: &SearchSolution) -> Stops {
        let mut stops = SmallVec::from_slice(solution.route(self.params.route).stops());
        let moved = stops.remove(self.params.from);
        stops.insert(self.params.to, moved);
        stops
    }
}

impl LocalSearchOperator for RelocateOperator {
    #[instrument(skip_all, level = Level::DEBUG)]
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

        for from in 0..len {
            for to in 0..len {
                if to == from {
                    continue;
                }

                consumer(RelocateOperator::new(RelocateParams { route: r1, from, to }));
            }
        }
    }

    fn cost_delta(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> Cost {
        let depot = ctx.problem.depot();
        let stops = solution.route(self.params.route).stops();
        let moved = stops[self.params.from];

        let a = stop_before(depot, stops, self.params.from);
        let c = stop_after(depot, stops, self.params.from);

        // Insertion-point neighbors in the route with `moved` taken out.
        let reduced = |index: usize| {
            if index < self.params.from {
                stops[index]
            } else {
                stops[index + 1]
            }
        };
        let x = if self.params.to == 0 {
            depot
        } else {
            reduced(self.params.to - 1)
        };
        let y = if self.params.to == stops.len() - 1 {
            depot
        } else {
            reduced(self.params.to)
        };

        let removed = ctx.costs.arc(a, moved) + ctx.costs.arc(moved, c) + ctx.costs.arc(x, y);
        let added = ctx.costs.arc(a, c) + ctx.costs.arc(x, moved) + ctx.costs.arc(moved, y);

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
