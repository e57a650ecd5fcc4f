//! HTML rendering for boxes: a tiny template helper (named template + search
//! folder + named parameters) and a rich-text renderer for text box content.
//!
//! Templates use the `{key}` placeholders of `util::fill_template`. Every
//! template ships with the crate; a file with the same name in the configured
//! folder overrides the built-in copy.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::util::{escape_html, fill_template};

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("box_text.html", include_str!("../templates/box_text.html")),
    ("box_input.html", include_str!("../templates/box_input.html")),
    ("box_multiline.html", include_str!("../templates/box_multiline.html")),
    ("box_file.html", include_str!("../templates/box_file.html")),
    ("custom_edit.html", include_str!("../templates/custom_edit.html")),
];

#[derive(Clone, Debug)]
pub struct TemplateHelper {
    template_folder: PathBuf,
    templates: HashMap<String, String>,
}

impl TemplateHelper {
    /// Load templates, preferring files found in `template_folder`.
    pub fn new(template_folder: impl Into<PathBuf>) -> Self {
        let template_folder = template_folder.into();
        let mut templates = HashMap::new();
        for (name, builtin) in BUILTIN_TEMPLATES {
            let path = template_folder.join(name);
            let body = match std::fs::read_to_string(&path) {
                Ok(s) => {
                    debug!(target: "custom_problems", path = %path.display(), "Template override loaded");
                    s
                }
                Err(_) => (*builtin).to_string(),
            };
            templates.insert((*name).to_string(), body);
        }
        Self { template_folder, templates }
    }

    /// Built-in templates only.
    pub fn builtin() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, body)| ((*name).to_string(), (*body).to_string()))
            .collect();
        Self { template_folder: PathBuf::new(), templates }
    }

    pub fn template_folder(&self) -> &Path {
        &self.template_folder
    }

    /// Render `name` with already-escaped parameter values.
    /// An unknown template renders as an empty fragment.
    pub fn render(&self, name: &str, params: &[(&str, &str)]) -> String {
        match self.templates.get(name) {
            Some(tpl) => fill_template(tpl, params),
            None => {
                warn!(target: "custom_problems", template = name, "Unknown template requested");
                String::new()
            }
        }
    }
}

/// Render text box content to HTML.
///
/// Supports the subset of reStructuredText that task authors actually use in
/// boxes: paragraphs separated by blank lines, ``inline literals`` and literal
/// blocks introduced by a trailing `::`. Everything else is escaped text.
pub fn render_rich_text(content: &str) -> String {
    let mut out = String::new();
    let mut literal_next = false;

    for block in split_blocks(content) {
        if literal_next {
            literal_next = false;
            out.push_str("<pre>");
            out.push_str(&escape_html(&dedent(&block)));
            out.push_str("</pre>\n");
            continue;
        }

        let mut text = block.iter().map(|l| l.trim()).collect::<Vec<_>>().join(" ");
        if let Some(head) = text.strip_suffix("::") {
            literal_next = true;
            let head = head.trim_end();
            if head.is_empty() {
                continue;
            }
            text = format!("{head}:");
        }
        out.push_str("<p>");
        out.push_str(&render_inline(&text));
        out.push_str("</p>\n");
    }
    out
}

fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| &l[indent..])
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_inline(text: &str) -> String {
    let parts: Vec<&str> = text.split("``").collect();
    // Unbalanced markers stay literal.
    if parts.len() % 2 == 0 {
        return escape_html(text);
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                format!("<code>{}</code>", escape_html(part))
            } else {
                escape_html(part)
            }
        })
        .collect()
}
