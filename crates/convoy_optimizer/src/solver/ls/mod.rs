pub mod inter_relocate;
pub mod inter_swap;
pub mod local_search;
pub mod r#move;
pub mod penalties;
pub mod relocate;
pub mod swap;
pub mod two_opt;
