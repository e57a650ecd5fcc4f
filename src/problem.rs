//! The "custom" problem type: an ordered list of boxes built from a JSON box
//! specification, validated and adapted as a whole.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::boxes::{create_box, DisplayableBox};
use crate::error::{ProblemError, Result};
use crate::render::TemplateHelper;
use crate::submission::TaskInput;
use crate::util::id_checker;

pub const PROBLEM_TYPE: &str = "custom";

/// Box entries exactly as written, in declaration order. Repeated ids are
/// kept so that they can be reported instead of silently merged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxEntries(Vec<(String, Value)>);

impl BoxEntries {
    /// Keep the entries as [`BoxSpecs`], failing on the first repeated id.
    pub fn into_specs(self) -> std::result::Result<BoxSpecs, String> {
        let mut specs = IndexMap::with_capacity(self.0.len());
        for (box_id, config) in self.0 {
            if specs.contains_key(&box_id) {
                return Err(box_id);
            }
            specs.insert(box_id, config);
        }
        Ok(BoxSpecs(specs))
    }
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = BoxEntries;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of box id to box configuration")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<BoxEntries, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry::<String, Value>()? {
            entries.push(entry);
        }
        Ok(BoxEntries(entries))
    }
}

impl<'de> Deserialize<'de> for BoxEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Box id → box configuration, in declaration order. Duplicate ids are
/// rejected while decoding.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoxSpecs(IndexMap<String, Value>);

impl BoxSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, box_id: impl Into<String>, config: Value) -> Option<Value> {
        self.0.insert(box_id.into(), config)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn get(&self, box_id: &str) -> Option<&Value> {
        self.0.get(box_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for BoxSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        BoxEntries::deserialize(deserializer)?
            .into_specs()
            .map_err(|box_id| serde::de::Error::custom(format!("duplicate box id {box_id:?}")))
    }
}

/// The `boxes` field of a problem content record: either the mapping itself
/// or the mapping encoded as a JSON string (as the task editor sends it).
#[derive(Clone, Debug, PartialEq)]
pub enum BoxesField {
    Encoded(String),
    Decoded(BoxEntries),
}

impl<'de> Deserialize<'de> for BoxesField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = BoxesField;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a box mapping or a JSON-encoded box mapping")
            }

            fn visit_str<E: serde::de::Error>(self, raw: &str) -> std::result::Result<BoxesField, E> {
                Ok(BoxesField::Encoded(raw.to_string()))
            }

            fn visit_string<E: serde::de::Error>(self, raw: String) -> std::result::Result<BoxesField, E> {
                Ok(BoxesField::Encoded(raw))
            }

            fn visit_map<A: MapAccess<'de>>(self, access: A) -> std::result::Result<BoxesField, A::Error> {
                EntriesVisitor.visit_map(access).map(BoxesField::Decoded)
            }
        }

        deserializer.deserialize_any(FieldVisitor)
    }
}

/// Stored content record of a problem. Fields other than these are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProblemContent {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub boxes: Option<BoxesField>,
}

impl ProblemContent {
    /// Decode a content record from its JSON text.
    pub fn from_json(problem_id: &str, raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProblemError::InvalidJson {
            problem_id: problem_id.to_string(),
            message: e.to_string(),
        })
    }

    pub fn is_custom(&self) -> bool {
        self.kind.as_ref().and_then(Value::as_str) == Some(PROBLEM_TYPE)
    }
}

/// Grading outcome of a problem that defers grading to the backend:
/// every field neutral.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub valid: Option<bool>,
    pub need_emul: Option<bool>,
    pub text: Option<String>,
    pub error_count: u32,
    pub state: String,
}

#[derive(Debug)]
pub struct CustomProblem {
    id: String,
    name: String,
    boxes: Vec<Box<dyn DisplayableBox>>,
}

impl CustomProblem {
    /// Build a problem from its stored content record (`type`, `name`, `boxes`).
    #[instrument(level = "debug", skip(content), fields(%problem_id))]
    pub fn new(problem_id: &str, content: &ProblemContent) -> Result<Self> {
        if let Some(kind) = &content.kind {
            if kind.as_str() != Some(PROBLEM_TYPE) {
                return Err(ProblemError::WrongProblemType {
                    problem_id: problem_id.to_string(),
                    kind: kind.as_str().map(str::to_string).unwrap_or_else(|| kind.to_string()),
                });
            }
        }
        let name = content
            .name
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let specs = match &content.boxes {
            None => BoxSpecs::new(),
            Some(BoxesField::Encoded(raw)) => Self::parse_problem(problem_id, raw)?,
            Some(BoxesField::Decoded(entries)) => Self::check_unique(problem_id, entries.clone())?,
        };
        let mut problem = Self::from_specs(problem_id, &specs)?;
        problem.name = name;
        Ok(problem)
    }

    /// Build a problem straight from its box specification.
    pub fn from_specs(problem_id: &str, specs: &BoxSpecs) -> Result<Self> {
        if !id_checker(problem_id) {
            return Err(ProblemError::InvalidProblemId(problem_id.to_string()));
        }
        let boxes = specs
            .iter()
            .map(|(box_id, config)| create_box(problem_id, box_id, config))
            .collect::<Result<Vec<_>>>()?;
        debug!(target: "problem", %problem_id, boxes = boxes.len(), "Problem built");
        Ok(Self {
            id: problem_id.to_string(),
            name: String::new(),
            boxes,
        })
    }

    /// Decode the JSON box specification of `problem_id`, keeping declaration order.
    pub fn parse_problem(problem_id: &str, raw_boxes: &str) -> Result<BoxSpecs> {
        let entries = serde_json::from_str::<BoxEntries>(raw_boxes).map_err(|e| ProblemError::InvalidJson {
            problem_id: problem_id.to_string(),
            message: e.to_string(),
        })?;
        Self::check_unique(problem_id, entries)
    }

    fn check_unique(problem_id: &str, entries: BoxEntries) -> Result<BoxSpecs> {
        entries.into_specs().map_err(|box_id| ProblemError::DuplicateBox {
            problem_id: problem_id.to_string(),
            box_id,
        })
    }

    /// Decode the `boxes` field of a problem content record in place, as
    /// submitted by the task editor (where it arrives as a string).
    pub fn parse_problem_content(problem_id: &str, mut content: Map<String, Value>) -> Result<Map<String, Value>> {
        if let Some(Value::String(raw)) = content.get("boxes") {
            let specs = Self::parse_problem(problem_id, raw)?;
            let decoded = serde_json::to_value(&specs).map_err(|e| ProblemError::InvalidJson {
                problem_id: problem_id.to_string(),
                message: e.to_string(),
            })?;
            content.insert("boxes".into(), decoded);
        }
        Ok(content)
    }

    pub fn get_type() -> &'static str {
        PROBLEM_TYPE
    }

    pub fn get_type_name() -> &'static str {
        PROBLEM_TYPE
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Boxes in declaration order.
    pub fn get_boxes(&self) -> &[Box<dyn DisplayableBox>] {
        &self.boxes
    }

    /// True when every box accepts the input. Stops at the first box that
    /// does not, so later boxes leave their entries untouched.
    pub fn input_is_consistent(
        &self,
        task_input: &mut TaskInput,
        default_allowed_extensions: &[String],
        default_max_size: u64,
    ) -> bool {
        self.boxes
            .iter()
            .all(|b| b.input_is_consistent(task_input, default_allowed_extensions, default_max_size))
    }

    pub fn adapt_input_for_backend(&self, input: &mut TaskInput) {
        for b in &self.boxes {
            b.adapt_input_for_backend(input);
        }
    }

    /// Grading is left to the backend.
    pub fn check_answer(&self, _task_input: &TaskInput) -> CheckResult {
        CheckResult::default()
    }

    pub fn show_input(&self, templates: &TemplateHelper) -> String {
        self.boxes.iter().map(|b| b.show(templates)).collect()
    }

    pub fn show_editbox(templates: &TemplateHelper, key: &str) -> String {
        let key = crate::util::escape_html(key);
        templates.render("custom_edit.html", &[("key", key.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{InputValue, UploadedFile};
    use serde_json::json;

    fn problem(boxes: Value) -> Result<CustomProblem> {
        let specs: BoxSpecs = serde_json::from_value(boxes).unwrap();
        CustomProblem::from_specs("q1", &specs)
    }

    fn defaults() -> Vec<String> {
        vec![".txt".into()]
    }

    #[test]
    fn parse_problem_preserves_declaration_order() {
        let raw = r#"{"zeta": {"type": "text", "content": "z"}, "alpha": {"type": "input-text"}, "mid": {"type": "file"}}"#;
        let specs = CustomProblem::parse_problem("q1", raw).unwrap();
        let keys: Vec<&str> = specs.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        let p = CustomProblem::from_specs("q1", &specs).unwrap();
        let ids: Vec<&str> = p.get_boxes().iter().map(|b| b.get_id()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn parse_problem_round_trips_serialized_specs() {
        let mut specs = BoxSpecs::new();
        specs.insert("b", json!({"type": "multiline", "language": "cpp"}));
        specs.insert("a", json!({"type": "input-integer", "optional": true}));
        specs.insert("", json!({"type": "text", "content": "hello"}));

        let encoded = serde_json::to_string(&specs).unwrap();
        let decoded = CustomProblem::parse_problem("q1", &encoded).unwrap();
        assert_eq!(decoded, specs);
        let tags: Vec<&str> = decoded.iter().map(|(_, c)| c["type"].as_str().unwrap()).collect();
        assert_eq!(tags, ["multiline", "input-integer", "text"]);
    }

    #[test]
    fn malformed_json_names_the_problem() {
        let err = CustomProblem::parse_problem("q7", "{not json").unwrap_err();
        assert!(matches!(&err, ProblemError::InvalidJson { problem_id, .. } if problem_id == "q7"));
        assert!(err.to_string().contains("q7"));
    }

    #[test]
    fn duplicate_box_ids_are_rejected() {
        let err = CustomProblem::parse_problem("q1", r#"{"": {"type": "input-text"}, "": {"type": "multiline"}}"#)
            .unwrap_err();
        assert_eq!(err, ProblemError::DuplicateBox { problem_id: "q1".into(), box_id: "".into() });
        assert!(err.to_string().contains("duplicate box id"));

        let err = serde_json::from_str::<BoxSpecs>(r#"{"a": {"type": "file"}, "a": {"type": "file"}}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate box id \"a\""));
    }

    #[test]
    fn duplicate_box_ids_in_object_form_are_rejected() {
        let raw = r#"{"type": "custom", "boxes": {"": {"type": "input-text"}, "": {"type": "file"}}}"#;
        let content = ProblemContent::from_json("q1", raw).unwrap();
        assert_eq!(
            CustomProblem::new("q1", &content).unwrap_err(),
            ProblemError::DuplicateBox { problem_id: "q1".into(), box_id: "".into() }
        );
    }

    #[test]
    fn construction_errors_propagate() {
        assert_eq!(
            problem(json!({"ok": {"type": "input-text"}, "bad/id": {"type": "input-text"}})).unwrap_err(),
            ProblemError::InvalidBoxId("bad/id".into())
        );
        assert!(CustomProblem::from_specs("bad id", &BoxSpecs::new()).is_err());
    }

    #[test]
    fn consistency_is_the_conjunction_of_boxes() {
        let p = problem(json!({
            "intro": {"type": "text", "content": "Answer below"},
            "n": {"type": "input-integer"},
            "s": {"type": "input-text"}
        }))
        .unwrap();

        let mut good = TaskInput::new();
        good.insert("q1/n".into(), InputValue::text("4"));
        good.insert("q1/s".into(), InputValue::text("four"));
        assert!(p.input_is_consistent(&mut good, &defaults(), 100));

        let mut bad = good.clone();
        bad.insert("q1/n".into(), InputValue::text("4.5"));
        assert!(!p.input_is_consistent(&mut bad, &defaults(), 100));

        let mut missing = good.clone();
        missing.shift_remove("q1/s");
        assert!(!p.input_is_consistent(&mut missing, &defaults(), 100));
    }

    #[test]
    fn first_failure_skips_later_defaulting() {
        let p = problem(json!({
            "first": {"type": "input-integer"},
            "second": {"type": "input-integer", "optional": true}
        }))
        .unwrap();

        let mut input = TaskInput::new();
        input.insert("q1/first".into(), InputValue::text("nope"));
        input.insert("q1/second".into(), InputValue::text(""));
        assert!(!p.input_is_consistent(&mut input, &defaults(), 100));
        assert_eq!(input["q1/second"], InputValue::text(""));

        input.insert("q1/first".into(), InputValue::text("1"));
        assert!(p.input_is_consistent(&mut input, &defaults(), 100));
        assert_eq!(input["q1/second"], InputValue::text("0"));
    }

    #[test]
    fn adaptation_threads_through_every_box() {
        let p = problem(json!({
            "a": {"type": "file"},
            "b": {"type": "input-text"},
            "c": {"type": "file"}
        }))
        .unwrap();

        let mut input = TaskInput::new();
        input.insert(
            "q1/a".into(),
            InputValue::Upload(UploadedFile { filename: Some("x.txt".into()), data: b"1".to_vec() }),
        );
        input.insert("q1/b".into(), InputValue::text("hello"));
        p.adapt_input_for_backend(&mut input);

        assert!(matches!(input["q1/a"], InputValue::File(_)));
        assert_eq!(input["q1/b"], InputValue::text("hello"));
        assert_eq!(input["q1/c"], InputValue::Empty);
    }

    #[test]
    fn content_record_accepts_encoded_or_decoded_boxes() {
        let encoded = json!({"type": "custom", "name": "Q", "boxes": "{\"x\": {\"type\": \"input-text\"}}"});
        let content: ProblemContent = serde_json::from_value(encoded.clone()).unwrap();
        assert!(matches!(content.boxes, Some(BoxesField::Encoded(_))));
        let p = CustomProblem::new("q1", &content).unwrap();
        assert_eq!(p.name(), "Q");
        assert_eq!(p.get_boxes().len(), 1);

        let decoded = CustomProblem::parse_problem_content("q1", encoded.as_object().cloned().unwrap()).unwrap();
        assert_eq!(decoded["boxes"], json!({"x": {"type": "input-text"}}));
        let content: ProblemContent = serde_json::from_value(Value::Object(decoded)).unwrap();
        assert!(matches!(content.boxes, Some(BoxesField::Decoded(_))));
        assert_eq!(CustomProblem::new("q1", &content).unwrap().get_boxes()[0].get_id(), "x");

        let wrong = ProblemContent::from_json("q1", r#"{"type": "code", "boxes": {}}"#).unwrap();
        assert!(!wrong.is_custom());
        assert!(matches!(
            CustomProblem::new("q1", &wrong).unwrap_err(),
            ProblemError::WrongProblemType { .. }
        ));

        assert!(matches!(
            ProblemContent::from_json("q1", r#"{"type": "custom", "boxes": 3}"#).unwrap_err(),
            ProblemError::InvalidJson { .. }
        ));
    }

    #[test]
    fn check_answer_is_neutral() {
        let p = problem(json!({"a": {"type": "input-text"}})).unwrap();
        let res = p.check_answer(&TaskInput::new());
        assert_eq!(res, CheckResult { valid: None, need_emul: None, text: None, error_count: 0, state: String::new() });
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({"valid": null, "needEmul": null, "text": null, "errorCount": 0, "state": ""})
        );
        assert_eq!(CustomProblem::get_type(), "custom");
    }

    #[test]
    fn show_input_concatenates_boxes_in_order() {
        let p = problem(json!({
            "t": {"type": "text", "content": "Intro"},
            "i": {"type": "input-text"}
        }))
        .unwrap();
        let html = p.show_input(&TemplateHelper::builtin());
        let text_at = html.find("custom-box-text").unwrap();
        let input_at = html.find("custom-box-input").unwrap();
        assert!(text_at < input_at);

        let edit = CustomProblem::show_editbox(&TemplateHelper::builtin(), "q1");
        assert!(edit.contains("problem[q1][boxes]"));
    }
}
