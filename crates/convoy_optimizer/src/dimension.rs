use fxhash::FxHashMap;
use serde::Serialize;

use crate::problem::{
    node::NodeIdx,
    routing_problem::RoutingProblem,
    travel_matrices::{Duration, Load},
    validation::ValidationError,
};

pub const CAPACITY_DIMENSION: &str = "Capacity";
pub const TIME_DIMENSION: &str = "Time";

/// Transit evaluator of a dimension: the amount added to the cumulative
/// value when a vehicle crosses the arc `from -> to`.
#[derive(Debug, Clone, Copy)]
pub enum Transit {
    /// Demand of the node being entered.
    EnteredDemand,
    /// Travel duration between consecutive nodes.
    TravelDuration,
}

impl Transit {
    #[inline(always)]
    pub fn evaluate(&self, problem: &RoutingProblem, from: NodeIdx, to: NodeIdx) -> i64 {
        match self {
            Transit::EnteredDemand => problem.demand(to),
            Transit::TravelDuration => problem.duration(from, to),
        }
    }
}

/// Inclusive range a cumulative value may occupy at one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CumulBounds {
    pub min: i64,
    pub max: i64,
}

/// A named cumulative quantity tracked along every route.
///
/// Walking a route, the value at the next node is
/// `cumul(next) = cumul(current) + transit(current, next) + waiting`, where
/// `waiting` is the smallest non-negative amount that lifts the value to the
/// node's lower bound. A route is feasible for the dimension only if the
/// value stays within every visited node's bounds and no single waiting step
/// exceeds `slack_max`. Violations reject the route, they are never clamped.
#[derive(Debug, Clone)]
pub struct Dimension {
    name: &'static str,
    transit: Transit,
    slack_max: i64,
    default_bounds: CumulBounds,
    windows: FxHashMap<NodeIdx, CumulBounds>,
    start_forced_to_zero: bool,
}

impl Dimension {
    pub fn new(
        name: &'static str,
        transit: Transit,
        slack_max: i64,
        upper_bound: i64,
        start_forced_to_zero: bool,
    ) -> Self {
        Dimension {
            name,
            transit,
            slack_max,
            default_bounds: CumulBounds {
                min: 0,
                max: upper_bound,
            },
            windows: FxHashMap::default(),
            start_forced_to_zero,
        }
    }

    /// Load tracker: rigid accumulation of the entered node's demand,
    /// starting at zero, never above the vehicle capacity.
    pub fn capacity(capacity: Load) -> Self {
        Dimension::new(CAPACITY_DIMENSION, Transit::EnteredDemand, 0, capacity, true)
    }

    /// Elapsed-time tracker: travel durations plus waiting, free start,
    /// never above the horizon.
    pub fn time(horizon: Duration) -> Self {
        Dimension::new(TIME_DIMENSION, Transit::TravelDuration, horizon, horizon, false)
    }

    /// Narrows the admissible range at one node below the dimension default.
    pub fn set_window(&mut self, node: NodeIdx, min: i64, max: i64) {
        self.windows.insert(node, CumulBounds { min, max });
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn slack_max(&self) -> i64 {
        self.slack_max
    }

    #[inline(always)]
    pub fn transit(&self, problem: &RoutingProblem, from: NodeIdx, to: NodeIdx) -> i64 {
        self.transit.evaluate(problem, from, to)
    }

    #[inline]
    pub fn bounds(&self, node: NodeIdx) -> CumulBounds {
        self.windows
            .get(&node)
            .copied()
            .unwrap_or(self.default_bounds)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.slack_max < 0 {
            return Err(ValidationError::NegativeSlack {
                name: self.name,
                slack: self.slack_max,
            });
        }

        let all_bounds = std::iter::once(&self.default_bounds).chain(self.windows.values());
        for bounds in all_bounds {
            if bounds.min > bounds.max {
                return Err(ValidationError::InvertedBounds {
                    name: self.name,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }

        Ok(())
    }

    fn start_cumul(&self, depot: NodeIdx) -> Option<i64> {
        let bounds = self.bounds(depot);

        if self.start_forced_to_zero {
            (bounds.min <= 0 && 0 <= bounds.max).then_some(0)
        } else {
            Some(bounds.min)
        }
    }

    #[inline]
    fn advance(&self, problem: &RoutingProblem, cumul: i64, from: NodeIdx, to: NodeIdx) -> Option<i64> {
        let reached = cumul + self.transit.evaluate(problem, from, to);
        let bounds = self.bounds(to);
        let lifted = reached.max(bounds.min);

        if lifted - reached > self.slack_max || lifted > bounds.max {
            return None;
        }

        Some(lifted)
    }

    /// Whether the route `depot -> stops -> depot` admits a feasible
    /// cumulative schedule. Forward pass only, no allocation.
    pub fn admits(&self, problem: &RoutingProblem, stops: &[NodeIdx]) -> bool {
        let depot = problem.depot();

        let Some(mut cumul) = self.start_cumul(depot) else {
            return false;
        };

        let mut prev = depot;
        for &stop in stops.iter().chain(std::iter::once(&depot)) {
            match self.advance(problem, cumul, prev, stop) {
                Some(next) => {
                    cumul = next;
                    prev = stop;
                }
                None => return false,
            }
        }

        true
    }

    /// Resolves the earliest and latest feasible cumulative value at the
    /// route start, at every stop and at the return to the depot, or `None`
    /// when the route violates a bound.
    pub fn resolve(&self, problem: &RoutingProblem, stops: &[NodeIdx]) -> Option<DimensionValues> {
        let depot = problem.depot();

        let mut cumul_min = self.start_cumul(depot)?;
        let mut cumul_max = if self.start_forced_to_zero {
            0
        } else {
            self.bounds(depot).max
        };

        let mut mins = Vec::with_capacity(stops.len() + 2);
        let mut maxs = Vec::with_capacity(stops.len() + 2);
        let mut transits = Vec::with_capacity(stops.len() + 1);

        mins.push(cumul_min);
        maxs.push(cumul_max);

        let mut prev = depot;
        for &stop in stops.iter().chain(std::iter::once(&depot)) {
            let transit = self.transit.evaluate(problem, prev, stop);

            cumul_min = self.advance(problem, cumul_min, prev, stop)?;
            cumul_max = cumul_max
                .saturating_add(transit)
                .saturating_add(self.slack_max)
                .min(self.bounds(stop).max);

            mins.push(cumul_min);
            maxs.push(cumul_max);
            transits.push(transit);
            prev = stop;
        }

        // Latest feasible value at each node, walking back from the end.
        for i in (0..transits.len()).rev() {
            let latest = maxs[i + 1] - transits[i];
            if latest < maxs[i] {
                maxs[i] = latest;
            }
        }

        let cumuls = mins
            .into_iter()
            .zip(maxs)
            .map(|(min, max)| {
                debug_assert!(min <= max);
                CumulBounds { min, max }
            })
            .collect();

        Some(DimensionValues { cumuls })
    }
}

/// Resolved cumulative ranges along one route, positions `0..num_stops`
/// bracketed by the route start and the return to the depot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionValues {
    cumuls: Vec<CumulBounds>,
}

impl DimensionValues {
    pub fn start(&self) -> CumulBounds {
        self.cumuls[0]
    }

    pub fn end(&self) -> CumulBounds {
        self.cumuls[self.cumuls.len() - 1]
    }

    pub fn stop(&self, position: usize) -> CumulBounds {
        self.cumuls[position + 1]
    }

    pub fn num_stops(&self) -> usize {
        self.cumuls.len() - 2
    }

    /// Net accumulation over the whole route.
    pub fn total(&self) -> i64 {
        self.end().min - self.start().min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn nodes(indices: &[usize]) -> Vec<NodeIdx> {
        indices.iter().map(|&i| NodeIdx::new(i)).collect()
    }

    #[test]
    fn test_capacity_accumulates_entered_demand() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 1, 2, 3]),
            vec![0, 2, 3, 4],
            1,
            10,
        );
        let dimension = Dimension::capacity(10);

        let values = dimension.resolve(&problem, &nodes(&[1, 2, 3])).unwrap();

        assert_eq!(values.start(), CumulBounds { min: 0, max: 0 });
        assert_eq!(values.stop(0), CumulBounds { min: 2, max: 2 });
        assert_eq!(values.stop(1), CumulBounds { min: 5, max: 5 });
        assert_eq!(values.stop(2), CumulBounds { min: 9, max: 9 });
        assert_eq!(values.end(), CumulBounds { min: 9, max: 9 });
        assert_eq!(values.total(), 9);
    }

    #[test]
    fn test_capacity_rejects_overload() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 1, 2]),
            vec![0, 6, 5],
            1,
            10,
        );
        let dimension = Dimension::capacity(10);

        assert!(dimension.admits(&problem, &nodes(&[1])));
        assert!(!dimension.admits(&problem, &nodes(&[1, 2])));
        assert!(dimension.resolve(&problem, &nodes(&[1, 2])).is_none());
    }

    #[test]
    fn test_time_earliest_and_latest() {
        // Nodes on a line at 0, 4, 10; durations equal distances.
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 4, 10]),
            vec![0, 1, 1],
            1,
            10,
        );
        let dimension = Dimension::time(100);

        let values = dimension.resolve(&problem, &nodes(&[1, 2])).unwrap();

        // Round trip 0 -> 4 -> 10 -> 0 takes 20, so the start may float
        // anywhere in [0, 80].
        assert_eq!(values.start(), CumulBounds { min: 0, max: 80 });
        assert_eq!(values.stop(0), CumulBounds { min: 4, max: 84 });
        assert_eq!(values.stop(1), CumulBounds { min: 10, max: 90 });
        assert_eq!(values.end(), CumulBounds { min: 20, max: 100 });
    }

    #[test]
    fn test_time_rejects_horizon_overrun() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 4, 10]),
            vec![0, 1, 1],
            1,
            10,
        );
        let dimension = Dimension::time(15);

        assert!(dimension.admits(&problem, &nodes(&[1])));
        assert!(!dimension.admits(&problem, &nodes(&[1, 2])));
    }

    #[test]
    fn test_window_introduces_waiting() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 3, 6]),
            vec![0, 1, 1],
            1,
            10,
        );
        let mut dimension = Dimension::time(100);
        dimension.set_window(NodeIdx::new(2), 20, 40);

        let values = dimension.resolve(&problem, &nodes(&[1, 2])).unwrap();

        // Arriving at node 2 straight from node 1 would read 6; the window
        // lifts the earliest value to 20.
        assert_eq!(values.stop(1).min, 20);
        assert_eq!(values.stop(1).max, 40);
        // The start can be delayed to remove the waiting entirely.
        assert_eq!(values.start().max, 34);
    }

    #[test]
    fn test_slack_cap_rejects_forced_waiting() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 3, 6]),
            vec![0, 1, 1],
            1,
            10,
        );
        let mut dimension = Dimension::new(TIME_DIMENSION, Transit::TravelDuration, 5, 100, true);
        dimension.set_window(NodeIdx::new(2), 20, 40);

        // Forced start at zero reads 6 at node 2; waiting 14 exceeds the
        // slack cap of 5.
        assert!(!dimension.admits(&problem, &nodes(&[1, 2])));
    }

    #[test]
    fn test_forced_zero_start_outside_depot_window() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 3]),
            vec![0, 1],
            1,
            10,
        );
        let mut dimension = Dimension::capacity(10);
        dimension.set_window(problem.depot(), 5, 10);

        assert!(!dimension.admits(&problem, &nodes(&[1])));
        assert!(dimension.resolve(&problem, &nodes(&[1])).is_none());
    }

    #[test]
    fn test_empty_route_resolves() {
        let problem = test_utils::create_problem(
            test_utils::line_distances(&[0, 3]),
            vec![0, 1],
            1,
            10,
        );
        let dimension = Dimension::time(50);

        let values = dimension.resolve(&problem, &[]).unwrap();

        assert_eq!(values.num_stops(), 0);
        assert_eq!(values.total(), 0);
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut dimension = Dimension::time(50);
        dimension.set_window(NodeIdx::new(1), 30, 10);

        assert_eq!(
            dimension.validate().unwrap_err(),
            ValidationError::InvertedBounds {
                name: TIME_DIMENSION,
                min: 30,
                max: 10
            }
        );
    }

    #[test]
    fn test_validate_rejects_negative_slack() {
        let dimension = Dimension::new("Custom", Transit::TravelDuration, -1, 10, false);

        assert_eq!(
            dimension.validate().unwrap_err(),
            ValidationError::NegativeSlack {
                name: "Custom",
                slack: -1
            }
        );
    }
}
