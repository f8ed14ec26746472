use std::sync::atomic::{AtomicBool, Ordering};

use fxhash::FxHashMap;
use jiff::{SignedDuration, Timestamp};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use tracing::{Level, debug, instrument};

use crate::{
    dimension::Dimension,
    problem::{
        routing_problem::RoutingProblem,
        travel_matrices::{Cost, Objective},
    },
    solver::{
        ls::{
            inter_relocate::InterRelocateOperator,
            inter_swap::InterSwapOperator,
            r#move::{ArcCosts, LocalSearchOperator, MoveContext, SearchMove},
            penalties::{ArcPenalties, lambda_from_solution},
            relocate::RelocateOperator,
            swap::SwapOperator,
            two_opt::TwoOptOperator,
        },
        search_params::{LocalSearchStrategy, Termination},
        solution::{route_id::RouteIdx, search_solution::SearchSolution},
    },
};

/// Why the improvement phase stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopCause {
    /// The improvement phase was never run.
    ConstructionOnly,
    /// No move improves the solution any further.
    LocalOptimum,
    /// The accepted-solution limit fired.
    SolutionLimit,
    /// The iteration budget fired.
    IterationLimit,
    /// The wall-clock budget fired.
    TimeLimit,
    /// The caller's stop signal fired.
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalSearchOutcome {
    pub iterations: usize,
    pub accepted_moves: usize,
    pub elapsed: SignedDuration,
    pub stop: StopCause,
}

type RoutePair = (RouteIdx, RouteIdx);
type PairBest = Option<(Cost, SearchMove)>;

/// Improvement phase over a constructed solution.
///
/// Every iteration picks the single best feasible move across all route
/// pairs and applies it; pairs untouched by the applied move keep their
/// cached best move, since only updated routes can change a pair's outlook.
/// Under guided local search, hitting a local optimum
/// penalizes the costliest arcs of the current solution and the search
/// continues on the augmented costs; the best solution by plain cost is kept
/// aside and restored at the end.
pub struct LocalSearch<'a> {
    problem: &'a RoutingProblem,
    dimensions: &'a [Dimension],
    objective: Objective,
    strategy: LocalSearchStrategy,
    terminations: &'a [Termination],
    lambda: Cost,
    penalties: ArcPenalties,
    pairs: Vec<RoutePair>,
    state: FxHashMap<RoutePair, PairBest>,
}

impl<'a> LocalSearch<'a> {
    pub fn new(
        problem: &'a RoutingProblem,
        dimensions: &'a [Dimension],
        objective: Objective,
        strategy: LocalSearchStrategy,
        terminations: &'a [Termination],
        lambda_factor: f64,
        solution: &SearchSolution,
    ) -> Self {
        let count = solution.routes().len();
        let mut pairs = Vec::with_capacity(count * count);
        for i in 0..count {
            for j in 0..count {
                pairs.push((RouteIdx::new(i), RouteIdx::new(j)));
            }
        }

        let lambda = match strategy {
            LocalSearchStrategy::Greedy => 0,
            LocalSearchStrategy::GuidedLocalSearch => {
                lambda_from_solution(lambda_factor, solution).max(1)
            }
        };

        LocalSearch {
            problem,
            dimensions,
            objective,
            strategy,
            terminations,
            lambda,
            penalties: ArcPenalties::new(),
            pairs,
            state: FxHashMap::default(),
        }
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn run(&mut self, solution: &mut SearchSolution, is_stopped: &AtomicBool) -> LocalSearchOutcome {
        let start = Timestamp::now();
        let mut iterations = 0;
        let mut accepted_moves = 0;

        let mut best = solution.clone();
        let mut best_cost = solution.total_cost();

        let stop = loop {
            if is_stopped.load(Ordering::Relaxed) {
                break StopCause::Cancelled;
            }

            if let Some(cause) = self.check_terminations(iterations, accepted_moves, start) {
                break cause;
            }

            iterations += 1;

            match self.best_pair(solution) {
                Some(pair) => {
                    self.apply_pair_move(pair, solution);
                    accepted_moves += 1;

                    let cost = solution.total_cost();
                    if cost < best_cost {
                        best_cost = cost;
                        best = solution.clone();
                    }
                }
                None => match self.strategy {
                    LocalSearchStrategy::Greedy => break StopCause::LocalOptimum,
                    LocalSearchStrategy::GuidedLocalSearch => {
                        let penalized =
                            self.penalties.penalize(self.problem, self.objective, solution);
                        if penalized == 0 {
                            break StopCause::LocalOptimum;
                        }

                        // Augmented costs changed everywhere.
                        self.state.clear();
                    }
                },
            }
        };

        if best_cost < solution.total_cost() {
            *solution = best;
        }

        let outcome = LocalSearchOutcome {
            iterations,
            accepted_moves,
            elapsed: Timestamp::now().duration_since(start),
            stop,
        };

        debug!(
            ?outcome.stop,
            iterations = outcome.iterations,
            accepted = outcome.accepted_moves,
            cost = solution.total_cost(),
            "local search finished"
        );

        outcome
    }

    fn check_terminations(
        &self,
        iterations: usize,
        accepted_moves: usize,
        start: Timestamp,
    ) -> Option<StopCause> {
        for termination in self.terminations {
            match termination {
                Termination::Iterations(max) if iterations >= *max => {
                    return Some(StopCause::IterationLimit);
                }
                Termination::Solutions(max) if accepted_moves >= *max => {
                    return Some(StopCause::SolutionLimit);
                }
                Termination::Duration(max)
                    if Timestamp::now().duration_since(start) > *max =>
                {
                    return Some(StopCause::TimeLimit);
                }
                _ => {}
            }
        }

        None
    }

    fn move_context(&self) -> MoveContext<'_> {
        let penalties = match self.strategy {
            LocalSearchStrategy::Greedy => None,
            LocalSearchStrategy::GuidedLocalSearch => Some(&self.penalties),
        };

        MoveContext {
            problem: self.problem,
            dimensions: self.dimensions,
            objective: self.objective,
            costs: ArcCosts::new(self.problem, self.objective, penalties, self.lambda),
        }
    }

    /// Refreshes stale pair entries in parallel, then picks the pair holding
    /// the best strictly improving move. Pair order decides ties, so the
    /// result does not depend on thread scheduling.
    fn best_pair(&mut self, solution: &SearchSolution) -> Option<RoutePair> {
        let ctx = self.move_context();

        let stale: Vec<RoutePair> = self
            .pairs
            .iter()
            .copied()
            .filter(|pair| !self.state.contains_key(pair))
            .collect();

        let refreshed: Vec<(RoutePair, PairBest)> = stale
            .par_iter()
            .map(|&pair| (pair, best_move_for_pair(&ctx, solution, pair)))
            .collect();

        self.state.extend(refreshed);

        let mut best: Option<(Cost, RoutePair)> = None;
        for &pair in &self.pairs {
            if let Some(Some((delta, _))) = self.state.get(&pair)
                && *delta < 0
                && best.is_none_or(|(best_delta, _)| *delta < best_delta)
            {
                best = Some((*delta, pair));
            }
        }

        best.map(|(_, pair)| pair)
    }

    fn apply_pair_move(&mut self, pair: RoutePair, solution: &mut SearchSolution) {
        let Some(Some((delta, search_move))) = self.state.remove(&pair) else {
            unreachable!("best_pair returned a pair without a stored move");
        };

        let ctx = self.move_context();

        debug!(
            operator = search_move.operator_name(),
            ?pair,
            delta,
            "apply move"
        );
        search_move.apply(&ctx, solution);

        let (first, second) = search_move.updated_routes();
        self.state
            .retain(|&(r1, r2), _| r1 != first && r2 != first && Some(r1) != second && Some(r2) != second);
    }
}

fn best_move_for_pair(
    ctx: &MoveContext<'_>,
    solution: &SearchSolution,
    pair: RoutePair,
) -> PairBest {
    let mut best: PairBest = None;

    macro_rules! consider {
        ($operator:ty, $variant:expr) => {
            <$operator>::generate_moves(solution, pair, |op| {
                let delta = op.cost_delta(ctx, solution);
                if delta < best.as_ref().map_or(0, |(best_delta, _)| *best_delta)
                    && op.is_valid(ctx, solution)
                {
                    best = Some((delta, $variant(op)));
                }
            });
        };
    }

    consider!(RelocateOperator, SearchMove::Relocate);
    consider!(TwoOptOperator, SearchMove::TwoOpt);
    consider!(SwapOperator, SearchMove::Swap);
    consider!(InterRelocateOperator, SearchMove::InterRelocate);
    consider!(InterSwapOperator, SearchMove::InterSwap);

    best
}
