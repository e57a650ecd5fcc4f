//! Input box: a one-line answer, read as text, integer or decimal.

use super::{check_box_id, read_max_chars, read_optional, BasicBox, BoxConfig, DisplayableBox};
use crate::error::{ProblemError, Result};
use crate::render::TemplateHelper;
use crate::submission::{InputValue, TaskInput};
use crate::util::escape_html;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Integer,
    Decimal,
}

impl InputKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "input-text" => Some(InputKind::Text),
            "input-integer" => Some(InputKind::Integer),
            "input-decimal" => Some(InputKind::Decimal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Integer => "integer",
            InputKind::Decimal => "decimal",
        }
    }

    /// Value stored for an empty optional answer.
    pub fn default_value(self) -> &'static str {
        match self {
            InputKind::Text => "",
            InputKind::Integer => "0",
            InputKind::Decimal => "0.0",
        }
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            InputKind::Text => true,
            InputKind::Integer => parses_as_integer(value),
            InputKind::Decimal => parses_as_decimal(value),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InputBox {
    id: String,
    problem_id: String,
    kind: InputKind,
    optional: bool,
    max_chars: usize,
}

impl InputBox {
    pub fn new(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Self> {
        check_box_id(box_id)?;
        let tag = config.get("type").and_then(|t| t.as_str()).unwrap_or_default();
        let kind = InputKind::from_tag(tag).ok_or_else(|| ProblemError::UnknownType {
            box_id: box_id.to_string(),
            kind: tag.to_string(),
        })?;
        Ok(Self {
            id: box_id.to_string(),
            problem_id: problem_id.to_string(),
            kind,
            optional: read_optional(box_id, config)?,
            max_chars: read_max_chars(box_id, config)?,
        })
    }

    pub(crate) fn boxed(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Box<dyn DisplayableBox>> {
        Ok(Box::new(Self::new(problem_id, box_id, config)?))
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl BasicBox for InputBox {
    fn get_type(&self) -> &'static str {
        "input"
    }

    fn get_id(&self) -> &str {
        &self.id
    }

    fn problem_id(&self) -> &str {
        &self.problem_id
    }

    fn input_is_consistent(&self, task_input: &mut TaskInput, _: &[String], _: u64) -> bool {
        let key = self.get_complete_id();
        let len = match task_input.get(&key) {
            Some(InputValue::Text(v)) => v.chars().count(),
            _ => return false,
        };

        if self.max_chars != 0 && len > self.max_chars {
            return false;
        }

        if len == 0 {
            if !self.optional {
                return false;
            }
            task_input.insert(key.clone(), InputValue::text(self.kind.default_value()));
        }

        match task_input.get(&key) {
            Some(InputValue::Text(v)) => self.kind.accepts(v),
            _ => false,
        }
    }
}

impl DisplayableBox for InputBox {
    fn show(&self, templates: &TemplateHelper) -> String {
        let input_id = escape_html(&self.get_complete_id());
        let max_chars = self.max_chars.to_string();
        let maxlength = if self.max_chars > 0 {
            format!("maxlength=\"{}\"", self.max_chars)
        } else {
            String::new()
        };
        templates.render(
            "box_input.html",
            &[
                ("inputId", input_id.as_str()),
                ("type", self.kind.as_str()),
                ("maxChars", max_chars.as_str()),
                ("optional", if self.optional { "true" } else { "false" }),
                ("maxlength", maxlength.as_str()),
            ],
        )
    }
}

/// Integer literal: optional sign, digits, single `_` between digits,
/// surrounding whitespace ignored.
fn parses_as_integer(value: &str) -> bool {
    let t = value.trim();
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// Floating-point literal, including exponents, `inf` and `nan`.
fn parses_as_decimal(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok()
}
