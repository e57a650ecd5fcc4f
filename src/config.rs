//! Loading plugin configuration (upload defaults, asset folders, task file) from TOML.
//!
//! See `PluginConfig` for the expected schema. Every key is optional.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
  /// Filename suffixes accepted by file boxes that do not declare their own.
  pub default_allowed_extensions: Vec<String>,
  /// Byte limit for file boxes that do not declare their own.
  pub default_max_size: u64,
  /// Served under `/plugins/custom/static/`.
  pub static_dir: PathBuf,
  /// Searched for template overrides.
  pub templates_dir: PathBuf,
  /// JSON task file holding the problems to load at startup.
  pub tasks_path: Option<PathBuf>,
}

impl Default for PluginConfig {
  fn default() -> Self {
    Self {
      default_allowed_extensions: [".c", ".cpp", ".java", ".oz", ".zip", ".tar.gz", ".tar.bz2", ".txt"]
        .into_iter()
        .map(String::from)
        .collect(),
      default_max_size: 1024 * 1024,
      static_dir: PathBuf::from("./static"),
      templates_dir: PathBuf::from("./templates"),
      tasks_path: None,
    }
  }
}

/// Parse a TOML document into `PluginConfig`.
pub fn parse_plugin_config(s: &str) -> Result<PluginConfig, toml::de::Error> {
  toml::from_str::<PluginConfig>(s)
}

/// Attempt to load `PluginConfig` from PLUGIN_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_plugin_config_from_env() -> Option<PluginConfig> {
  let path = std::env::var("PLUGIN_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_plugin_config(&s) {
      Ok(cfg) => {
        info!(target: "custom_problems", %path, "Loaded plugin config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "custom_problems", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "custom_problems", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_gives_defaults() {
    let cfg = parse_plugin_config("").unwrap();
    assert_eq!(cfg.default_max_size, 1024 * 1024);
    assert!(cfg.default_allowed_extensions.contains(&".zip".to_string()));
    assert_eq!(cfg.static_dir, PathBuf::from("./static"));
    assert!(cfg.tasks_path.is_none());
  }

  #[test]
  fn keys_override_defaults() {
    let cfg = parse_plugin_config(
      r#"
        default_allowed_extensions = [".py"]
        default_max_size = 2048
        tasks_path = "/srv/tasks.json"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.default_allowed_extensions, vec![".py".to_string()]);
    assert_eq!(cfg.default_max_size, 2048);
    assert_eq!(cfg.tasks_path, Some(PathBuf::from("/srv/tasks.json")));
    assert_eq!(cfg.templates_dir, PathBuf::from("./templates"));
  }

  #[test]
  fn wrong_types_are_rejected() {
    assert!(parse_plugin_config("default_max_size = \"big\"").is_err());
  }
}
