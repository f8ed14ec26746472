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

/// **Inter-Route Relocate**
///
/// Removes the stop at `from` of one route and inserts it at `to` of
/// another, emptying routes one stop at a time if that pays off.
#[derive(Debug)]
pub struct InterRelocateOperator {
    params: InterRelocateParams,
}

#[derive(Debug)]
pub struct InterRelocateParams {
    pub from_route: RouteIdx,
    pub to_route: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl InterRelocateOperator {
    pub fn new(params: InterRelocateParams) -> Self {
        if params.from_route == params.to_route {
            panic!("InterRelocateOperator routes must be different");
        }

        Self { params }
    }

    fn rebuilt_stops(&self, solution: &SearchSolution) -> (Stops, Stops) {
        let mut source = SmallVec::from_slice(solution.route(self.params.from_route).stops());
        let moved = source.remove(self.params.from);

        let mut target = SmallVec::from_slice(solution.route(self.params.to_route).stops());
        target.insert(self.params.to, moved);

        (source, target)
    }
}

impl LocalSearchOperator for InterRelocateOperator {
    fn generate_moves<C>(solution: &SearchSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        let source_len = solution.route(r1).len();
        let target_len = solution.route(r2).len();

        for from in 0..source_len {
            for to in 0..=target_len {
                consumer(InterRelocateOperator::new(InterRelocateParams {
                    from_route: r1,
                    to_route: r2,
                    from,
                    to,
                }));
            }
        }
    }

    fn cost_delta(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> Cost {
        let depot = ctx.problem.depot();
        let source = solution.route(self.params.from_route).stops();
        let target = solution.route(self.params.to_route).stops();
        let moved = source[self.params.from];

        let a = stop_before(depot, source, self.params.from);
        let c = stop_after(depot, source, self.params.from);

        let x = stop_before(depot, target, self.params.to);
        let y = if self.params.to == target.len() {
            depot
        } else {
            target[self.params.to]
        };

        let removed = ctx.costs.arc(a, moved) + ctx.costs.arc(moved, c) + ctx.costs.arc(x, y);
        let added = ctx.costs.arc(a, c) + ctx.costs.arc(x, moved) + ctx.costs.arc(moved, y);

        added - removed
    }

    fn is_valid(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> bool {
        let (source, target) = self.rebuilt_stops(solution);

        RouteState::is_feasible(ctx.problem, ctx.dimensions, &source)
            && RouteState::is_feasible(ctx.problem, ctx.dimensions, &target)
    }

    fn apply(&self, ctx: &MoveContext<'_>, solution: &mut SearchSolution) {
        let (source, target) = self.rebuilt_stops(solution);

        solution.route_mut(self.params.from_route).set_stops(
            ctx.problem,
            ctx.dimensions,
            ctx.objective,
            source,
        );
        solution.route_mut(self.params.to_route).set_stops(
            ctx.problem,
            ctx.dimensions,
            ctx.objective,
            target,
        );
    }

    fn updated_routes(&self) -> (RouteIdx, Option<RouteIdx>) {
        (self.params.from_route, Some(self.params.to_route))
    }
}
