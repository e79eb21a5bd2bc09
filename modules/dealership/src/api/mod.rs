pub mod problem;

pub use problem::{Problem, domain_error_to_problem};
