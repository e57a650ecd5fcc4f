//! Boxes: the input and display widgets a custom problem is made of.
//!
//! Two capabilities, layered:
//! - [`BasicBox`]: identity and the consistency check on submitted input
//! - [`DisplayableBox`]: HTML rendering and input adaptation for the backend
//!
//! Boxes are built from their JSON configuration through [`create_box`],
//! which dispatches on the `type` tag using [`BOX_TYPES`].

use std::fmt::Debug;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ProblemError, Result};
use crate::render::TemplateHelper;
use crate::submission::TaskInput;
use crate::util::id_checker;

pub mod file;
pub mod input;
pub mod multiline;
pub mod text;

pub use file::FileBox;
pub use input::{InputBox, InputKind};
pub use multiline::MultilineBox;
pub use text::TextBox;

/// Configuration record of a single box, as found in the task definition.
pub type BoxConfig = Map<String, Value>;

pub trait BasicBox: Debug + Send + Sync {
    /// Type tag reported for this box ("text", "input", "multiline", "file").
    fn get_type(&self) -> &'static str;

    /// Box id, possibly empty.
    fn get_id(&self) -> &str;

    /// Id of the problem this box belongs to.
    fn problem_id(&self) -> &str;

    /// Key of this box in a submission, unique among all problems of a task.
    fn get_complete_id(&self) -> String {
        complete_id(self.problem_id(), self.get_id())
    }

    /// Whether the submitted input is acceptable for this box. May rewrite
    /// this box's own entry (defaults for optional fields).
    fn input_is_consistent(
        &self,
        task_input: &mut TaskInput,
        _default_allowed_extensions: &[String],
        _default_max_size: u64,
    ) -> bool {
        task_input.contains_key(&self.get_complete_id())
    }
}

pub trait DisplayableBox: BasicBox {
    /// Reshape this box's entry of the raw web input for the grading backend.
    fn adapt_input_for_backend(&self, _input: &mut TaskInput) {}

    /// HTML fragment for this box.
    fn show(&self, templates: &TemplateHelper) -> String;
}

pub type BoxConstructor = fn(&str, &str, &BoxConfig) -> Result<Box<dyn DisplayableBox>>;

/// Recognised `type` tags and the constructor each one dispatches to.
pub const BOX_TYPES: &[(&str, BoxConstructor)] = &[
    ("input-text", InputBox::boxed),
    ("input-decimal", InputBox::boxed),
    ("input-integer", InputBox::boxed),
    ("multiline", MultilineBox::boxed),
    ("text", TextBox::boxed),
    ("file", FileBox::boxed),
];

/// Build the box described by `config` for problem `problem_id`.
pub fn create_box(problem_id: &str, box_id: &str, config: &Value) -> Result<Box<dyn DisplayableBox>> {
    check_box_id(box_id)?;
    let config = config
        .as_object()
        .ok_or_else(|| ProblemError::NotAnObject(box_id.to_string()))?;
    let kind = match config.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => {
            return Err(ProblemError::UnknownType {
                box_id: box_id.to_string(),
                kind: other.to_string(),
            })
        }
        None => return Err(ProblemError::MissingType(box_id.to_string())),
    };
    let ctor = BOX_TYPES
        .iter()
        .find(|(tag, _)| *tag == kind)
        .map(|(_, ctor)| *ctor)
        .ok_or_else(|| ProblemError::UnknownType {
            box_id: box_id.to_string(),
            kind: kind.to_string(),
        })?;
    ctor(problem_id, box_id, config)
}

pub fn complete_id(problem_id: &str, box_id: &str) -> String {
    if box_id.is_empty() {
        problem_id.to_string()
    } else {
        format!("{problem_id}/{box_id}")
    }
}

/// Box ids follow the identifier rule, except that the empty id is allowed.
pub fn check_box_id(box_id: &str) -> Result<()> {
    if box_id.is_empty() || id_checker(box_id) {
        Ok(())
    } else {
        Err(ProblemError::InvalidBoxId(box_id.to_string()))
    }
}

static LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\A[a-z0-9\-_.]+\z").expect("valid language regex"));

// Configuration readers shared by the box variants.

pub(crate) fn read_optional(box_id: &str, config: &BoxConfig) -> Result<bool> {
    match config.get("optional") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ProblemError::InvalidField {
            box_id: box_id.to_string(),
            field: "optional",
        }),
    }
}

/// `maxChars`: a positive integer; 0 (unlimited) when absent.
pub(crate) fn read_max_chars(box_id: &str, config: &BoxConfig) -> Result<usize> {
    match config.get("maxChars") {
        None => Ok(0),
        Some(v) => positive_int(v).ok_or_else(|| ProblemError::InvalidMaxChars(box_id.to_string())),
    }
}

/// `lines`: a positive integer; 8 when absent.
pub(crate) fn read_lines(box_id: &str, config: &BoxConfig) -> Result<usize> {
    match config.get("lines") {
        None => Ok(8),
        Some(v) => positive_int(v).ok_or_else(|| ProblemError::InvalidLines(box_id.to_string())),
    }
}

/// `language`: highlighting tag; "plain" when absent or empty.
pub(crate) fn read_language(box_id: &str, config: &BoxConfig) -> Result<String> {
    match config.get("language") {
        None | Some(Value::Null) => Ok("plain".to_string()),
        Some(Value::String(s)) if s.is_empty() => Ok("plain".to_string()),
        Some(Value::String(s)) if LANGUAGE_RE.is_match(s) => Ok(s.clone()),
        Some(other) => Err(ProblemError::InvalidLanguage {
            box_id: box_id.to_string(),
            language: match other {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            },
        }),
    }
}

fn positive_int(v: &Value) -> Option<usize> {
    v.as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(box_id: &str, config: Value) -> Result<Box<dyn DisplayableBox>> {
        create_box("p1", box_id, &config)
    }

    #[test]
    fn dispatches_on_type_tag() {
        let cases = [
            (json!({"type": "text", "content": "hi"}), "text"),
            (json!({"type": "input-text"}), "input"),
            (json!({"type": "input-integer"}), "input"),
            (json!({"type": "input-decimal"}), "input"),
            (json!({"type": "multiline"}), "multiline"),
            (json!({"type": "file"}), "file"),
        ];
        for (config, expected) in cases {
            let b = build("b", config).unwrap();
            assert_eq!(b.get_type(), expected);
            assert_eq!(b.get_complete_id(), "p1/b");
        }
    }

    #[test]
    fn missing_or_unknown_type_is_rejected() {
        assert_eq!(
            build("b", json!({"content": "x"})).unwrap_err(),
            ProblemError::MissingType("b".into())
        );
        assert_eq!(
            build("b", json!({"type": "radio"})).unwrap_err(),
            ProblemError::UnknownType { box_id: "b".into(), kind: "radio".into() }
        );
        assert!(matches!(
            build("b", json!({"type": 3})).unwrap_err(),
            ProblemError::UnknownType { .. }
        ));
        assert_eq!(
            build("b", json!("input-text")).unwrap_err(),
            ProblemError::NotAnObject("b".into())
        );
    }

    #[test]
    fn box_ids_follow_identifier_rule() {
        assert!(build("", json!({"type": "input-text"})).is_ok());
        assert!(build("a-b_1", json!({"type": "input-text"})).is_ok());
        for bad in ["a/b", "a b", "x.y", "ü"] {
            assert_eq!(
                build(bad, json!({"type": "input-text"})).unwrap_err(),
                ProblemError::InvalidBoxId(bad.into())
            );
        }
    }

    #[test]
    fn empty_box_id_uses_bare_problem_id() {
        let b = build("", json!({"type": "input-text"})).unwrap();
        assert_eq!(b.get_complete_id(), "p1");
        assert_eq!(complete_id("p1", "x"), "p1/x");
    }

    #[test]
    fn language_accepts_tag_charset_only() {
        let cfg = |v: Value| json!({"language": v}).as_object().cloned().unwrap();
        assert_eq!(read_language("b", &cfg(json!("cpp"))).unwrap(), "cpp");
        assert_eq!(read_language("b", &cfg(json!("Python3.8"))).unwrap(), "Python3.8");
        assert_eq!(read_language("b", &cfg(json!(""))).unwrap(), "plain");
        assert_eq!(read_language("b", &BoxConfig::new()).unwrap(), "plain");
        assert!(read_language("b", &cfg(json!("c++"))).is_err());
        assert!(read_language("b", &cfg(json!("ocaml\n"))).is_err());
        assert!(read_language("b", &cfg(json!(12))).is_err());
    }

    #[test]
    fn max_chars_must_be_a_positive_integer() {
        let cfg = |v: Value| json!({"maxChars": v}).as_object().cloned().unwrap();
        assert_eq!(read_max_chars("b", &BoxConfig::new()).unwrap(), 0);
        assert_eq!(read_max_chars("b", &cfg(json!(12))).unwrap(), 12);
        for bad in [json!(0), json!(-3), json!(2.5), json!("10"), json!(null)] {
            assert_eq!(
                read_max_chars("b", &cfg(bad)).unwrap_err(),
                ProblemError::InvalidMaxChars("b".into())
            );
        }
    }
}
