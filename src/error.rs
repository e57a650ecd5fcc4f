//! Task-authoring errors: everything that can go wrong while a problem and its
//! boxes are built from a task definition.
//!
//! Submission-time checks never produce these; they resolve to `false`.

use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("invalid problem id {0:?}")]
    InvalidProblemId(String),

    #[error("invalid box id {0:?}")]
    InvalidBoxId(String),

    #[error("box {0:?} must be described by a JSON object")]
    NotAnObject(String),

    #[error("box {0:?} does not have a type")]
    MissingType(String),

    #[error("unknown box type {kind:?} for box id {box_id:?}")]
    UnknownType { box_id: String, kind: String },

    #[error("box id {0:?} with type=text does not have content")]
    MissingContent(String),

    #[error("invalid maxChars value in box {0:?}")]
    InvalidMaxChars(String),

    #[error("invalid lines value in box {0:?}")]
    InvalidLines(String),

    #[error("invalid language {language:?} in box {box_id:?}")]
    InvalidLanguage { box_id: String, language: String },

    #[error("invalid {field} value in box {box_id:?}")]
    InvalidField { box_id: String, field: &'static str },

    #[error("invalid JSON in boxes content of problem {problem_id:?}: {message}")]
    InvalidJson { problem_id: String, message: String },

    #[error("duplicate box id {box_id:?} in problem {problem_id:?}")]
    DuplicateBox { problem_id: String, box_id: String },

    #[error("problem {problem_id:?} has type {kind:?}, expected \"custom\"")]
    WrongProblemType { problem_id: String, kind: String },
}

pub type Result<T> = core::result::Result<T, ProblemError>;
