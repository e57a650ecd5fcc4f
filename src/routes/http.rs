//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument};

use crate::logic::*;
use crate::plugin::manifest;
use crate::problem::ProblemContent;
use crate::protocol::*;
use crate::state::AppState;
use crate::submission::{InputValue, TaskInput, UploadedFile};

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info")]
pub async fn http_get_plugin() -> impl IntoResponse { Json(manifest()) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_problems(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let problems = state.list_problems().await;
  Json(problems.iter().map(|p| to_out(p)).collect::<Vec<_>>())
}

#[instrument(level = "info", skip(state), fields(%problem_id))]
pub async fn http_get_problem_input(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
) -> Response {
  match render_problem_input(&state, &problem_id).await {
    Some(html) => Html(html).into_response(),
    None => unknown_problem(&problem_id),
  }
}

/// Editor fragment keyed by the problem id; the problem need not exist yet.
#[instrument(level = "info", skip(state), fields(%problem_id))]
pub async fn http_get_editbox(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
) -> impl IntoResponse {
  Html(render_editbox(&state, &problem_id))
}

/// Task edit. The raw body goes to the box decoder, which reports repeated
/// box ids; any decode or construction error is a 400.
#[instrument(level = "info", skip(state, body), fields(%problem_id, bytes = body.len()))]
pub async fn http_put_problem(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
  body: String,
) -> Response {
  let replaced = match ProblemContent::from_json(&problem_id, &body) {
    Ok(content) => state.replace_problem(&problem_id, &content).await,
    Err(e) => Err(e),
  };
  match replaced {
    Ok(problem) => Json(to_out(&problem)).into_response(),
    Err(e) => {
      error!(target: "problem", %problem_id, error = %e, "Task edit rejected");
      (StatusCode::BAD_REQUEST, Json(ErrorOut { message: e.to_string() })).into_response()
    }
  }
}

#[instrument(level = "info", skip(state, multipart), fields(%problem_id))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
  multipart: Multipart,
) -> Response {
  let input = match read_multipart(multipart).await {
    Ok(input) => input,
    Err(message) => {
      error!(target: "problem", %problem_id, %message, "Unreadable multipart submission");
      return (StatusCode::BAD_REQUEST, Json(ErrorOut { message })).into_response();
    }
  };
  submission_response(&problem_id, process_submission(&state, &problem_id, input).await)
}

#[instrument(level = "info", skip(state, body), fields(%problem_id, fields = body.input.len()))]
pub async fn http_post_check(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
  Json(body): Json<SubmissionIn>,
) -> Response {
  submission_response(&problem_id, process_submission(&state, &problem_id, body.input).await)
}

/// Text parts become text answers; parts carrying a filename or a content
/// type become raw uploads.
async fn read_multipart(mut multipart: Multipart) -> Result<TaskInput, String> {
  let mut input = TaskInput::new();
  while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
    let Some(name) = field.name().map(str::to_string) else { continue };
    let filename = field.file_name().map(str::to_string);
    let value = if filename.is_some() || field.content_type().is_some() {
      let data = field.bytes().await.map_err(|e| e.to_string())?.to_vec();
      InputValue::Upload(UploadedFile { filename, data })
    } else {
      InputValue::Text(field.text().await.map_err(|e| e.to_string())?)
    };
    input.insert(name, value);
  }
  Ok(input)
}

fn submission_response(problem_id: &str, out: Option<SubmissionOut>) -> Response {
  match out {
    Some(out) if out.consistent => {
      info!(target: "problem", %problem_id, submission_id = %out.submission_id, "HTTP submission served");
      Json(out).into_response()
    }
    Some(out) => (StatusCode::BAD_REQUEST, Json(out)).into_response(),
    None => unknown_problem(problem_id),
  }
}

fn unknown_problem(problem_id: &str) -> Response {
  (
    StatusCode::NOT_FOUND,
    Json(ErrorOut { message: format!("Unknown problem: {}", problem_id) }),
  )
    .into_response()
}
