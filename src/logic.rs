//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Processing a submission (adapt for the backend, then check consistency)
//!   - Rendering a problem's input fragment and the task editor box

use tracing::{info, warn, instrument};
use uuid::Uuid;

use crate::problem::CustomProblem;
use crate::protocol::SubmissionOut;
use crate::state::AppState;
use crate::submission::TaskInput;

/// Run a submission through the problem. `None` when the problem is unknown.
///
/// Raw web input is adapted first (file uploads become `{filename, value}`
/// records), then checked; the check may fill defaults for optional boxes.
#[instrument(level = "info", skip(state, input), fields(%problem_id, fields = input.len()))]
pub async fn process_submission(state: &AppState, problem_id: &str, mut input: TaskInput) -> Option<SubmissionOut> {
  let problem = state.get_problem(problem_id).await?;

  problem.adapt_input_for_backend(&mut input);
  let consistent = problem.input_is_consistent(
    &mut input,
    &state.config.default_allowed_extensions,
    state.config.default_max_size,
  );
  let result = problem.check_answer(&input);
  let submission_id = Uuid::new_v4();

  if consistent {
    info!(target: "problem", %problem_id, %submission_id, "Submission accepted for backend");
  } else {
    warn!(target: "problem", %problem_id, %submission_id, "Submission input is inconsistent");
  }

  Some(SubmissionOut {
    submission_id,
    problem_id: problem_id.to_string(),
    consistent,
    input,
    result,
  })
}

#[instrument(level = "debug", skip(state), fields(%problem_id))]
pub async fn render_problem_input(state: &AppState, problem_id: &str) -> Option<String> {
  let problem = state.get_problem(problem_id).await?;
  Some(problem.show_input(&state.templates))
}

pub fn render_editbox(state: &AppState, key: &str) -> String {
  CustomProblem::show_editbox(&state.templates, key)
}
