//! Application state: plugin configuration, templates and the loaded problems.
//!
//! Problems are built once from the task file at startup. A problem whose
//! definition is broken is logged and left out, so it cannot be submitted to
//! until the task is fixed. The task editor replaces problems one at a time.

use std::{path::Path, sync::Arc};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::config::{load_plugin_config_from_env, PluginConfig};
use crate::error::Result;
use crate::problem::{CustomProblem, ProblemContent, PROBLEM_TYPE};
use crate::render::TemplateHelper;
use crate::util::trunc_for_log;

pub type ProblemStore = IndexMap<String, Arc<CustomProblem>>;

/// Task file layout: `{"problems": {<problem id>: <problem content>}}`.
/// Contents stay raw until their type is known, so repeated box ids survive
/// to the box decoder.
#[derive(Debug, Deserialize)]
struct TaskFile {
    #[serde(default)]
    problems: IndexMap<String, Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct ProblemKind {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
}

#[derive(Clone)]
pub struct AppState {
    pub problems: Arc<RwLock<ProblemStore>>,
    pub config: Arc<PluginConfig>,
    pub templates: Arc<TemplateHelper>,
}

impl AppState {
    /// Build state from env: load config, templates and the task file.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_plugin_config_from_env().unwrap_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: PluginConfig) -> Self {
        let templates = TemplateHelper::new(&config.templates_dir);
        let problems = match &config.tasks_path {
            Some(path) => load_task_file(path),
            None => {
                info!(target: "custom_problems", "No tasks_path configured; starting without problems.");
                ProblemStore::new()
            }
        };
        Self::with_problems(config, templates, problems)
    }

    pub fn with_problems(config: PluginConfig, templates: TemplateHelper, problems: ProblemStore) -> Self {
        info!(
            target: "custom_problems",
            problems = problems.len(),
            static_dir = %config.static_dir.display(),
            templates_dir = %config.templates_dir.display(),
            "Plugin state ready"
        );
        Self {
            problems: Arc::new(RwLock::new(problems)),
            config: Arc::new(config),
            templates: Arc::new(templates),
        }
    }

    /// Read-only access to a problem by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_problem(&self, id: &str) -> Option<Arc<CustomProblem>> {
        self.problems.read().await.get(id).cloned()
    }

    /// Loaded problems, in task file order.
    pub async fn list_problems(&self) -> Vec<Arc<CustomProblem>> {
        self.problems.read().await.values().cloned().collect()
    }

    /// Task edit: build the new problem first, swap it in only if it is valid.
    #[instrument(level = "info", skip(self, content), fields(%id))]
    pub async fn replace_problem(&self, id: &str, content: &ProblemContent) -> Result<Arc<CustomProblem>> {
        let problem = Arc::new(CustomProblem::new(id, content)?);
        let previous = self
            .problems
            .write()
            .await
            .insert(id.to_string(), problem.clone());
        info!(target: "problem", %id, boxes = problem.get_boxes().len(), replaced = previous.is_some(), "Problem stored");
        Ok(problem)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_problems(PluginConfig::default(), TemplateHelper::builtin(), ProblemStore::new())
    }
}

/// Read the task file at `path`. IO and JSON errors leave the store empty.
pub fn load_task_file(path: &Path) -> ProblemStore {
    match std::fs::read_to_string(path) {
        Ok(s) => match load_problems(&s) {
            Ok(store) => {
                info!(target: "custom_problems", path = %path.display(), problems = store.len(), "Loaded task file");
                store
            }
            Err(e) => {
                error!(target: "custom_problems", path = %path.display(), error = %e, "Failed to parse task file");
                ProblemStore::new()
            }
        },
        Err(e) => {
            error!(target: "custom_problems", path = %path.display(), error = %e, "Failed to read task file");
            ProblemStore::new()
        }
    }
}

/// Build every custom problem of a task document. Problems of other types are
/// ignored; broken ones are skipped.
pub fn load_problems(document: &str) -> std::result::Result<ProblemStore, serde_json::Error> {
    let task: TaskFile = serde_json::from_str(document)?;
    let mut store = ProblemStore::new();
    for (id, raw) in task.problems {
        let kind = serde_json::from_str::<ProblemKind>(raw.get()).ok().and_then(|k| k.kind);
        match kind.as_ref().and_then(Value::as_str) {
            Some(PROBLEM_TYPE) => {}
            other => {
                debug!(target: "problem", %id, kind = ?other, "Skipping problem of another type");
                continue;
            }
        }
        match ProblemContent::from_json(&id, raw.get()).and_then(|content| CustomProblem::new(&id, &content)) {
            Ok(problem) => {
                store.insert(id, Arc::new(problem));
            }
            Err(e) => {
                error!(target: "problem", %id, error = %e, content = %trunc_for_log(raw.get(), 200), "Skipping unusable problem");
            }
        }
    }
    Ok(store)
}
