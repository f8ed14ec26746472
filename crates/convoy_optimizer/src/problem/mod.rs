pub mod fleet;
pub mod node;
pub mod routing_problem;
pub mod travel_matrices;
pub mod validation;
