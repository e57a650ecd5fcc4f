//! What this plugin registers with the host: the problem type, the two asset
//! hooks and the static file route they point into.

use serde::Serialize;

use crate::boxes::BOX_TYPES;
use crate::problem::PROBLEM_TYPE;

pub const STATIC_ROUTE: &str = "/plugins/custom/static";
pub const CSS_HOOK: &str = "/plugins/custom/static/custom.css";
pub const JAVASCRIPT_HEADER_HOOK: &str = "/plugins/custom/static/custom.js";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub problem_type: &'static str,
    pub box_types: Vec<&'static str>,
    pub css: &'static str,
    pub javascript_header: &'static str,
    pub static_route: &'static str,
}

pub fn manifest() -> PluginManifest {
    PluginManifest {
        problem_type: PROBLEM_TYPE,
        box_types: BOX_TYPES.iter().map(|(tag, _)| *tag).collect(),
        css: CSS_HOOK,
        javascript_header: JAVASCRIPT_HEADER_HOOK,
        static_route: STATIC_ROUTE,
    }
}
