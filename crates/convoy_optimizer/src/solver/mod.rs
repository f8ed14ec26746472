pub mod assignment;
pub mod construction;
pub mod engine;
pub mod ls;
pub mod search_params;
pub mod solution;
pub mod solve_error;
