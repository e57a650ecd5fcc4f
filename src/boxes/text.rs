//! Text box: shows rich text, expects no input.

use serde_json::Value;

use super::{check_box_id, BasicBox, BoxConfig, DisplayableBox};
use crate::error::{ProblemError, Result};
use crate::render::{render_rich_text, TemplateHelper};
use crate::submission::TaskInput;

#[derive(Clone, Debug)]
pub struct TextBox {
    id: String,
    problem_id: String,
    content: String,
}

impl TextBox {
    pub fn new(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Self> {
        check_box_id(box_id)?;
        let content = match config.get("content") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(ProblemError::MissingContent(box_id.to_string())),
        };
        Ok(Self {
            id: box_id.to_string(),
            problem_id: problem_id.to_string(),
            content,
        })
    }

    pub(crate) fn boxed(problem_id: &str, box_id: &str, config: &BoxConfig) -> Result<Box<dyn DisplayableBox>> {
        Ok(Box::new(Self::new(problem_id, box_id, config)?))
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl BasicBox for TextBox {
    fn get_type(&self) -> &'static str {
        "text"
    }

    fn get_id(&self) -> &str {
        &self.id
    }

    fn problem_id(&self) -> &str {
        &self.problem_id
    }

    fn input_is_consistent(&self, _: &mut TaskInput, _: &[String], _: u64) -> bool {
        true
    }
}

impl DisplayableBox for TextBox {
    fn show(&self, templates: &TemplateHelper) -> String {
        let text = render_rich_text(&self.content);
        templates.render("box_text.html", &[("text", text.as_str())])
    }
}
