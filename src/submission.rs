//! Submission input: the mapping from composite box id to the raw value a
//! student sent, as produced by the form layer and reshaped by the boxes.
//!
//! JSON form of a value:
//! - a string is a text answer
//! - `{"filename": "...", "value": "<base64>"}` is a file
//! - `{}` is the empty record left behind by a failed file adaptation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Composite box id → submitted value, in form order.
pub type TaskInput = IndexMap<String, InputValue>;

/// A raw uploaded file as received from the form layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Plain `{filename, value}` record expected by the grading backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub filename: String,
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Text(String),
    Upload(UploadedFile),
    File(FileRecord),
    /// `{}`
    Empty,
    /// Anything the form layer could not classify (numbers, arrays...).
    Unsupported(serde_json::Value),
}

impl InputValue {
    pub fn text(s: impl Into<String>) -> Self {
        InputValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for InputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InputValue::Text(s) => serializer.serialize_str(s),
            InputValue::Upload(up) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("filename", &up.filename)?;
                map.serialize_entry("value", &STANDARD.encode(&up.data))?;
                map.end()
            }
            InputValue::File(rec) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("filename", &rec.filename)?;
                map.serialize_entry("value", &STANDARD.encode(&rec.value))?;
                map.end()
            }
            InputValue::Empty => serializer.serialize_map(Some(0))?.end(),
            InputValue::Unsupported(v) => v.serialize(serializer),
        }
    }
}

/// Incoming JSON files are treated as raw uploads, exactly like multipart parts,
/// so they go through the same adaptation before validation.
impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::String(s) => Ok(InputValue::Text(s)),
            serde_json::Value::Object(obj) if obj.is_empty() => Ok(InputValue::Empty),
            serde_json::Value::Object(obj) => {
                let filename = match obj.get("filename") {
                    Some(serde_json::Value::String(s)) => Some(Some(s.clone())),
                    Some(serde_json::Value::Null) | None => Some(None),
                    Some(_) => None,
                };
                let payload = match obj.get("value") {
                    Some(serde_json::Value::String(b64)) => Some(Some(b64.clone())),
                    None => Some(None),
                    Some(_) => None,
                };
                let (Some(filename), Some(payload)) = (filename, payload) else {
                    return Ok(InputValue::Unsupported(serde_json::Value::Object(obj)));
                };
                let data = match payload {
                    Some(b64) => STANDARD
                        .decode(b64)
                        .map_err(|e| D::Error::custom(format!("file value is not base64: {e}")))?,
                    None => Vec::new(),
                };
                Ok(InputValue::Upload(UploadedFile { filename, data }))
            }
            other => Ok(InputValue::Unsupported(other)),
        }
    }
}
