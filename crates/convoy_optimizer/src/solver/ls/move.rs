use crate::{
    dimension::Dimension,
    problem::{
        node::NodeIdx,
        routing_problem::RoutingProblem,
        travel_matrices::{Cost, Objective},
    },
    solver::{
        ls::{
            inter_relocate::InterRelocateOperator, inter_swap::InterSwapOperator,
            penalties::ArcPenalties, relocate::RelocateOperator, swap::SwapOperator,
            two_opt::TwoOptOperator,
        },
        solution::{route_id::RouteIdx, search_solution::SearchSolution},
    },
};

/// Everything a move needs to price and apply itself. `costs` is the arc
/// view the search minimizes, which carries guided penalties when active;
/// route state is always refreshed against the plain `objective`.
pub struct MoveContext<'a> {
    pub problem: &'a RoutingProblem,
    pub dimensions: &'a [Dimension],
    pub objective: Objective,
    pub costs: ArcCosts<'a>,
}

/// Arc cost lookup, optionally augmented with guided-local-search penalties.
#[derive(Clone, Copy)]
pub struct ArcCosts<'a> {
    problem: &'a RoutingProblem,
    objective: Objective,
    penalties: Option<&'a ArcPenalties>,
    lambda: Cost,
}

impl<'a> ArcCosts<'a> {
    pub fn new(
        problem: &'a RoutingProblem,
        objective: Objective,
        penalties: Option<&'a ArcPenalties>,
        lambda: Cost,
    ) -> Self {
        ArcCosts {
            problem,
            objective,
            penalties,
            lambda,
        }
    }

    pub fn plain(problem: &'a RoutingProblem, objective: Objective) -> Self {
        ArcCosts::new(problem, objective, None, 0)
    }

    #[inline(always)]
    pub fn arc(&self, from: NodeIdx, to: NodeIdx) -> Cost {
        let base = self.problem.cost(self.objective, from, to);

        match self.penalties {
            Some(penalties) => base + self.lambda * penalties.count(from, to) as Cost,
            None => base,
        }
    }

    /// Whether `arc` is symmetric in its arguments. Penalties are directed,
    /// so any augmentation breaks symmetry.
    pub fn is_symmetric(&self) -> bool {
        self.penalties.is_none() && self.problem.matrices().is_symmetric(self.objective)
    }
}

#[inline]
pub(crate) fn stop_before(depot: NodeIdx, stops: &[NodeIdx], position: usize) -> NodeIdx {
    if position == 0 {
        depot
    } else {
        stops[position - 1]
    }
}

#[inline]
pub(crate) fn stop_after(depot: NodeIdx, stops: &[NodeIdx], position: usize) -> NodeIdx {
    stops.get(position + 1).copied().unwrap_or(depot)
}

pub trait LocalSearchOperator {
    fn generate_moves<C>(solution: &SearchSolution, pair: (RouteIdx, RouteIdx), consumer: C)
    where
        C: FnMut(Self),
        Self: Sized;

    /// Net change of the searched arc cost, negative for an improvement.
    fn cost_delta(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> Cost;
    fn is_valid(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> bool;
    fn apply(&self, ctx: &MoveContext<'_>, solution: &mut SearchSolution);

    /// The route(s) whose stops change when the move is applied.
    fn updated_routes(&self) -> (RouteIdx, Option<RouteIdx>);
}

#[derive(Debug)]
pub enum SearchMove {
    /// Moves one stop to another position of the same route.
    Relocate(RelocateOperator),
    /// Moves one stop into a different route.
    InterRelocate(InterRelocateOperator),
    /// Exchanges two stops within one route.
    Swap(SwapOperator),
    /// Exchanges one stop of each of two routes.
    InterSwap(InterSwapOperator),
    /// Reverses a segment of one route.
    TwoOpt(TwoOptOperator),
}

impl SearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            SearchMove::Relocate { .. } => "Relocate",
            SearchMove::InterRelocate { .. } => "Inter-Relocate",
            SearchMove::Swap { .. } => "Swap",
            SearchMove::InterSwap { .. } => "Inter-Swap",
            SearchMove::TwoOpt { .. } => "Two-Opt",
        }
    }

    pub fn cost_delta(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> Cost {
        match self {
            SearchMove::Relocate(op) => op.cost_delta(ctx, solution),
            SearchMove::InterRelocate(op) => op.cost_delta(ctx, solution),
            SearchMove::Swap(op) => op.cost_delta(ctx, solution),
            SearchMove::InterSwap(op) => op.cost_delta(ctx, solution),
            SearchMove::TwoOpt(op) => op.cost_delta(ctx, solution),
        }
    }

    pub fn is_valid(&self, ctx: &MoveContext<'_>, solution: &SearchSolution) -> bool {
        match self {
            SearchMove::Relocate(op) => op.is_valid(ctx, solution),
            SearchMove::InterRelocate(op) => op.is_valid(ctx, solution),
            SearchMove::Swap(op) => op.is_valid(ctx, solution),
            SearchMove::InterSwap(op) => op.is_valid(ctx, solution),
            SearchMove::TwoOpt(op) => op.is_valid(ctx, solution),
        }
    }

    pub fn apply(&self, ctx: &MoveContext<'_>, solution: &mut SearchSolution) {
        match self {
            SearchMove::Relocate(op) => op.apply(ctx, solution),
            SearchMove::InterRelocate(op) => op.apply(ctx, solution),
            SearchMove::Swap(op) => op.apply(ctx, solution),
            SearchMove::InterSwap(op) => op.apply(ctx, solution),
            SearchMove::TwoOpt(op) => op.apply(ctx, solution),
        }
    }

    pub fn updated_routes(&self) -> (RouteIdx, Option<RouteIdx>) {
        match self {
            SearchMove::Relocate(op) => op.updated_routes(),
            SearchMove::InterRelocate(op) => op.updated_routes(),
            SearchMove::Swap(op) => op.updated_routes(),
            SearchMove::InterSwap(op) => op.updated_routes(),
            SearchMove::TwoOpt(op) => op.updated_routes(),
        }
    }
}
