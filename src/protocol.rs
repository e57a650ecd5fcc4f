//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::problem::{CheckResult, CustomProblem};
use crate::submission::TaskInput;

/// DTO describing a loaded problem and its boxes.
#[derive(Debug, Serialize)]
pub struct ProblemOut {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub boxes: Vec<BoxOut>,
}

#[derive(Debug, Serialize)]
pub struct BoxOut {
    pub id: String,
    #[serde(rename = "completeId")]
    pub complete_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Convert a loaded problem to the public DTO.
pub fn to_out(p: &CustomProblem) -> ProblemOut {
    ProblemOut {
        id: p.get_id().to_string(),
        name: p.name().to_string(),
        kind: CustomProblem::get_type(),
        boxes: p
            .get_boxes()
            .iter()
            .map(|b| BoxOut {
                id: b.get_id().to_string(),
                complete_id: b.get_complete_id(),
                kind: b.get_type(),
            })
            .collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct SubmissionIn {
    #[serde(default)]
    pub input: TaskInput,
}

/// Outcome of a submission: the adapted input is what the grading backend receives.
#[derive(Debug, Serialize)]
pub struct SubmissionOut {
    #[serde(rename = "submissionId")]
    pub submission_id: Uuid,
    #[serde(rename = "problemId")]
    pub problem_id: String,
    pub consistent: bool,
    pub input: TaskInput,
    pub result: CheckResult,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
