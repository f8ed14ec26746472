use fxhash::FxHashMap;
use tracing::debug;

use crate::{
    problem::{
        node::NodeIdx,
        routing_problem::RoutingProblem,
        travel_matrices::{Cost, Objective},
    },
    solver::solution::search_solution::SearchSolution,
};

/// Guided-local-search penalty counters per directed arc.
///
/// At a local optimum the arcs of the current solution with the highest
/// utility `cost / (1 + count)` get their counter bumped, which raises their
/// price in the augmented cost view until the search is pushed somewhere
/// else. Plain route costs are never touched.
#[derive(Debug, Default)]
pub struct ArcPenalties {
    counts: FxHashMap<(NodeIdx, NodeIdx), u32>,
}

impl ArcPenalties {
    pub fn new() -> Self {
        ArcPenalties::default()
    }

    #[inline(always)]
    pub fn count(&self, from: NodeIdx, to: NodeIdx) -> u32 {
        self.counts.get(&(from, to)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&count| count as u64).sum()
    }

    /// Bumps the counter of every maximum-utility arc of the current
    /// solution. Returns how many arcs were penalized.
    pub fn penalize(
        &mut self,
        problem: &RoutingProblem,
        objective: Objective,
        solution: &SearchSolution,
    ) -> usize {
        let mut best_utility = 0.0f64;
        let mut penalized: Vec<(NodeIdx, NodeIdx)> = Vec::new();

        for route in solution.routes() {
            let depot = problem.depot();
            let mut prev = depot;

            for &stop in route.stops().iter().chain(std::iter::once(&depot)) {
                let cost = problem.cost(objective, prev, stop);
                let utility = cost as f64 / (1 + self.count(prev, stop)) as f64;

                if utility > best_utility {
                    best_utility = utility;
                    penalized.clear();
                    penalized.push((prev, stop));
                } else if utility == best_utility && utility > 0.0 {
                    penalized.push((prev, stop));
                }

                prev = stop;
            }
        }

        for &arc in &penalized {
            *self.counts.entry(arc).or_insert(0) += 1;
        }

        debug!(
            arcs = penalized.len(),
            utility = best_utility,
            "penalized maximum-utility arcs"
        );

        penalized.len()
    }
}

/// Scaling applied to penalty counts in the augmented cost view, derived
/// from the average arc cost of the solution the search starts from.
pub fn lambda_from_solution(factor: f64, solution: &SearchSolution) -> Cost {
    let arcs: usize = solution
        .routes()
        .iter()
        .filter(|route| !route.is_empty())
        .map(|route| route.len() + 1)
        .sum();

    if arcs == 0 {
        return 0;
    }

    let average = solution.total_cost() as f64 / arcs as f64;
    (factor * average).round() as Cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, TestRoute};

    #[test]
    fn test_penalize_targets_costliest_arc() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 1, 2, 30]),
            vec![0, 1, 1, 1],
            1,
            10,
        );
        let dimensions = test_utils::default_dimensions(&problem, 1_000);
        let solution = test_utils::create_solution(
            &problem,
            &dimensions,
            Objective::Distance,
            vec![TestRoute {
                vehicle: 0,
                stops: vec![1, 2, 3],
            }],
        );

        let mut penalties = ArcPenalties::new();
        let penalized = penalties.penalize(&problem, Objective::Distance, &solution);

        // 3 -> depot and 2 -> 3 both cost 28 or more; the 30-unit return arc
        // 3 -> 0 stands alone at the top.
        assert_eq!(penalized, 1);
        assert_eq!(penalties.count(NodeIdx::new(3), NodeIdx::new(0)), 1);
        assert_eq!(penalties.count(NodeIdx::new(2), NodeIdx::new(3)), 0);

        // A second round divides the penalized arc's utility by two, so the
        // 28-unit arc 2 -> 3 takes over.
        let penalized = penalties.penalize(&problem, Objective::Distance, &solution);
        assert_eq!(penalized, 1);
        assert_eq!(penalties.count(NodeIdx::new(2), NodeIdx::new(3)), 1);
        assert_eq!(penalties.total(), 2);
    }

    #[test]
    fn test_lambda_scales_with_average_arc_cost() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 10, 20]),
            vec![0, 1, 1],
            2,
            10,
        );
        let dimensions = test_utils::default_dimensions(&problem, 1_000);
        let solution = test_utils::create_solution(
            &problem,
            &dimensions,
            Objective::Distance,
            vec![TestRoute {
                vehicle: 0,
                stops: vec![1, 2],
            }],
        );

        // Route 0 -> 10 -> 20 -> 0 costs 40 over 3 arcs.
        assert_eq!(lambda_from_solution(0.3, &solution), 4);
        assert_eq!(lambda_from_solution(0.0, &solution), 0);
    }

    #[test]
    fn test_empty_solution_yields_zero_lambda() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 1]),
            vec![0, 1],
            1,
            10,
        );
        let dimensions = test_utils::default_dimensions(&problem, 1_000);
        let solution = test_utils::create_solution(&problem, &dimensions, Objective::Distance, vec![]);

        assert_eq!(lambda_from_solution(0.5, &solution), 0);
    }
}
