use jiff::SignedDuration;

/// Improvement strategy applied after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalSearchStrategy {
    /// Accept strictly improving moves until a local optimum.
    Greedy,
    /// Escape local optima by penalizing high-utility arcs.
    GuidedLocalSearch,
}

#[derive(Clone, Debug)]
pub enum Termination {
    Duration(SignedDuration),
    Iterations(usize),
    /// Stop after this many accepted solutions.
    Solutions(usize),
}

#[derive(Clone, Debug)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => *num,
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchParams {
    pub terminations: Vec<Termination>,
    /// `None` runs construction only.
    pub local_search: Option<LocalSearchStrategy>,
    pub threads: Threads,
    pub gls_lambda_factor: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            terminations: vec![
                Termination::Solutions(20),
                Termination::Duration(SignedDuration::from_secs(30)),
            ],
            local_search: Some(LocalSearchStrategy::GuidedLocalSearch),
            threads: Threads::Auto,
            gls_lambda_factor: 0.1,
        }
    }
}

impl SearchParams {
    pub fn construction_only() -> Self {
        Self {
            local_search: None,
            ..Self::default()
        }
    }
}
