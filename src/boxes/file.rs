//! File box: a single upload, checked by filename suffix and payload size.
//!
//! Once adapted for the backend, the entry of this box is either
//! `{"filename": ..., "value": ...}` or `{}` when no usable upload came in.

use serde_json::Value;

use super::{check_box_id, BasicBox, BoxConfig, DisplayableBox};
use crate::error::{ProblemError, Result};
use crate::render::TemplateHelper;
use crate::submission::{FileRecord, InputValue, TaskInput, UploadedFile};
use crate::util::escape_html;

#[derive(Clone, Debug)]
pub struct FileBox {
    id: String,
    problem_id: String,
    allowed_exts: Option<Vec<String>>,
    max_size: Option<u64>,
}

impl FileBox {
    pub fn new(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Self> {
        check_box_id(box_id)?;
        let invalid = |field| ProblemError::InvalidField { box_id: box_id.to_string(), field };

        let allowed_exts = match config.get("allowed_exts") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("allowed_exts"))?,
            ),
            Some(_) => return Err(invalid("allowed_exts")),
        };
        let max_size = match config.get("max_size") {
            None | Some(Value::Null) => None,
            Some(v) => Some(read_size(v).ok_or_else(|| invalid("max_size"))?),
        };

        Ok(Self {
            id: box_id.to_string(),
            problem_id: problem_id.to_string(),
            allowed_exts,
            max_size,
        })
    }

    pub(crate) fn boxed(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Box<dyn DisplayableBox>> {
        Ok(Box::new(Self::new(problem_id, box_id, config)?))
    }

    pub fn allowed_exts(&self) -> Option<&[String]> {
        self.allowed_exts.as_deref()
    }

    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }
}

/// Byte count from a JSON number: a non-negative integer, possibly written
/// as a float (`1000.0`).
fn read_size(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

impl BasicBox for FileBox {
    fn get_type(&self) -> &'static str {
        "file"
    }

    fn get_id(&self) -> &str {
        &self.id
    }

    fn problem_id(&self) -> &str {
        &self.problem_id
    }

    fn input_is_consistent(
        &self,
        task_input: &mut TaskInput,
        default_allowed_extensions: &[String],
        default_max_size: u64,
    ) -> bool {
        let Some(InputValue::File(record)) = task_input.get(&self.get_complete_id()) else {
            return false;
        };

        // An empty list or a zero size counts as unset.
        let exts = match self.allowed_exts.as_deref() {
            Some(exts) if !exts.is_empty() => exts,
            _ => default_allowed_extensions,
        };
        if !exts.iter().any(|ext| record.filename.ends_with(ext.as_str())) {
            return false;
        }

        let max_size = self.max_size.filter(|s| *s > 0).unwrap_or(default_max_size);
        record.value.len() as u64 <= max_size
    }
}

impl DisplayableBox for FileBox {
    fn adapt_input_for_backend(&self, input: &mut TaskInput) {
        let key = self.get_complete_id();
        let raw = input
            .get_mut(&key)
            .map(|v| std::mem::replace(v, InputValue::Empty));
        let adapted = match raw {
            Some(InputValue::Upload(UploadedFile { filename: Some(filename), data })) => {
                InputValue::File(FileRecord { filename, value: data })
            }
            _ => InputValue::Empty,
        };
        input.insert(key, adapted);
    }

    fn show(&self, templates: &TemplateHelper) -> String {
        let input_id = escape_html(&self.get_complete_id());
        let max_size = escape_html(&serde_json::to_string(&self.max_size).unwrap_or_default());
        let allowed_exts = escape_html(&serde_json::to_string(&self.allowed_exts).unwrap_or_default());
        let accept = match self.allowed_exts.as_deref() {
            Some(exts) if !exts.is_empty() => format!("accept=\"{}\"", escape_html(&exts.join(","))),
            _ => String::new(),
        };
        templates.render(
            "box_file.html",
            &[
                ("inputId", input_id.as_str()),
                ("max_size", max_size.as_str()),
                ("allowed_exts", allowed_exts.as_str()),
                ("accept", accept.as_str()),
            ],
        )
    }
}
