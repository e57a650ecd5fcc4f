//! Custom problem type for an online exercise platform.
//!
//! A custom problem is an ordered set of boxes (text, input, multiline, file)
//! declared in JSON. Boxes validate and render their own field; the problem
//! aggregates them and shapes a submission for the grading backend.

pub mod boxes;
pub mod config;
pub mod error;
pub mod logic;
pub mod plugin;
pub mod problem;
pub mod protocol;
pub mod render;
pub mod routes;
pub mod state;
pub mod submission;
pub mod telemetry;
pub mod util;

pub use error::{ProblemError, Result};
pub use problem::CustomProblem;
pub use submission::{InputValue, TaskInput};
