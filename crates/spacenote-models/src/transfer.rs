//! Space export/import payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::space::Space;

/// Exported space, optionally with its notes and comments.
///
/// Notes and comments stay opaque JSON: the backend owns their export shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub space: Space,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub space_id: String,
    #[serde(default)]
    pub notes_imported: u64,
    #[serde(default)]
    pub comments_imported: u64,
    #[serde(default)]
    pub warnings: Vec<String>,
}
