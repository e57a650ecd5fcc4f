//! Multiline box: a code/text area with optional syntax highlighting.

use super::{
    check_box_id, read_language, read_lines, read_max_chars, read_optional, BasicBox, BoxConfig,
    DisplayableBox,
};
use crate::error::Result;
use crate::render::TemplateHelper;
use crate::submission::{InputValue, TaskInput};
use crate::util::escape_html;

#[derive(Clone, Debug)]
pub struct MultilineBox {
    id: String,
    problem_id: String,
    max_chars: usize,
    optional: bool,
    lines: usize,
    language: String,
}

impl MultilineBox {
    pub fn new(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Self> {
        check_box_id(box_id)?;
        Ok(Self {
            id: box_id.to_string(),
            problem_id: problem_id.to_string(),
            max_chars: read_max_chars(box_id, config)?,
            optional: read_optional(box_id, config)?,
            lines: read_lines(box_id, config)?,
            language: read_language(box_id, config)?,
        })
    }

    pub(crate) fn boxed(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Box<dyn DisplayableBox>> {
        Ok(Box::new(Self::new(problem_id, box_id, config)?))
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl BasicBox for MultilineBox {
    fn get_type(&self) -> &'static str {
        "multiline"
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
            task_input.insert(key, InputValue::text(""));
        }
        true
    }
}

impl DisplayableBox for MultilineBox {
    fn show(&self, templates: &TemplateHelper) -> String {
        let input_id = escape_html(&self.get_complete_id());
        let lines = self.lines.to_string();
        let max_chars = self.max_chars.to_string();
        let language = escape_html(&self.language);
        let maxlength = if self.max_chars > 0 {
            format!("maxlength=\"{}\"", self.max_chars)
        } else {
            String::new()
        };
        templates.render(
            "box_multiline.html",
            &[
                ("inputId", input_id.as_str()),
                ("lines", lines.as_str()),
                ("maxChars", max_chars.as_str()),
                ("language", language.as_str()),
                ("optional", if self.optional { "true" } else { "false" }),
                ("maxlength", maxlength.as_str()),
            ],
        )
    }
}
