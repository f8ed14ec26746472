use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use fxhash::FxHashSet;
use jiff::Timestamp;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{Level, info, instrument};

use crate::{
    dimension::Dimension,
    problem::{routing_problem::RoutingProblem, travel_matrices::Objective, validation::ValidationError},
    solver::{
        assignment::{Assignment, SearchSummary},
        construction::construct_solution,
        ls::local_search::LocalSearch,
        search_params::{LocalSearchStrategy, SearchParams, Threads},
        solve_error::SolveError,
    },
};

#[derive(Copy, Clone, Debug, Serialize)]
pub enum EngineStatus {
    Pending,
    Running,
    Completed,
}

/// Lets another thread ask an in-flight solve to stop. The solve checks the
/// flag at every improvement iteration and returns the best feasible
/// solution found so far.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Owns one solve at a time: validates the inputs, constructs a solution,
/// optionally improves it and hands out the immutable [`Assignment`].
pub struct RoutingEngine {
    status: RwLock<EngineStatus>,
    is_stopped: Arc<AtomicBool>,
}

impl Default for RoutingEngine {
    fn default() -> Self {
        RoutingEngine::new()
    }
}

impl RoutingEngine {
    pub fn new() -> Self {
        RoutingEngine {
            status: RwLock::new(EngineStatus::Pending),
            is_stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn status(&self) -> EngineStatus {
        *self.status.read()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.is_stopped))
    }

    pub fn stop(&self) {
        self.is_stopped.store(true, Ordering::Relaxed);
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn solve(
        &self,
        problem: &RoutingProblem,
        dimensions: &[Dimension],
        objective: Objective,
        params: &SearchParams,
    ) -> Result<Assignment, SolveError> {
        validate_search_inputs(dimensions, params)?;

        *self.status.write() = EngineStatus::Running;
        let start = Timestamp::now();

        info!(
            nodes = problem.num_nodes(),
            vehicles = problem.num_vehicles(),
            ?objective,
            "solve started"
        );

        let result = self.run_search(problem, dimensions, objective, params, start);
        *self.status.write() = EngineStatus::Completed;

        match &result {
            Ok(assignment) => info!(
                cost = assignment.total_cost(),
                improved = assignment.summary().improved,
                stop = ?assignment.summary().stop,
                "solve finished"
            ),
            Err(error) => info!(%error, "solve failed"),
        }

        result
    }

    fn run_search(
        &self,
        problem: &RoutingProblem,
        dimensions: &[Dimension],
        objective: Objective,
        params: &SearchParams,
        start: Timestamp,
    ) -> Result<Assignment, SolveError> {
        let mut solution = construct_solution(problem, dimensions, objective)?;
        let constructed_cost = solution.total_cost();

        let summary = match params.local_search {
            None => SearchSummary::construction_only(Timestamp::now().duration_since(start)),
            Some(strategy) => {
                let outcome = self
                    .create_thread_pool(&params.threads)
                    .install(|| {
                        let mut search = LocalSearch::new(
                            problem,
                            dimensions,
                            objective,
                            strategy,
                            &params.terminations,
                            params.gls_lambda_factor,
                            &solution,
                        );
                        search.run(&mut solution, &self.is_stopped)
                    });

                SearchSummary {
                    improved: solution.total_cost() < constructed_cost,
                    iterations: outcome.iterations,
                    accepted_moves: outcome.accepted_moves,
                    elapsed: Timestamp::now().duration_since(start),
                    stop: outcome.stop,
                }
            }
        };

        Ok(Assignment::from_solution(
            problem, dimensions, objective, &solution, summary,
        ))
    }

    fn create_thread_pool(&self, threads: &Threads) -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads.number_of_threads())
            .build()
            .unwrap()
    }
}

fn validate_search_inputs(
    dimensions: &[Dimension],
    params: &SearchParams,
) -> Result<(), ValidationError> {
    let mut names = FxHashSet::default();
    for dimension in dimensions {
        dimension.validate()?;
        if !names.insert(dimension.name()) {
            return Err(ValidationError::DuplicateDimension(dimension.name()));
        }
    }

    if let Some(strategy) = params.local_search {
        if params.terminations.is_empty() {
            return Err(ValidationError::NoTermination);
        }

        if strategy == LocalSearchStrategy::GuidedLocalSearch
            && !(params.gls_lambda_factor.is_finite() && params.gls_lambda_factor > 0.0)
        {
            return Err(ValidationError::InvalidLambdaFactor(params.gls_lambda_factor));
        }
    }

    Ok(())
}
