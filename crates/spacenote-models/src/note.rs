use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Read snapshot of a note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub author: String,
    /// ISO 8601 timestamp as sent by the backend.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_comment_at: Option<String>,
}

impl Note {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// One page of notes plus the backend's pagination facts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub total_count: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Create/update payload: every visible field, stringified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteFieldsRequest {
    pub fields: BTreeMap<String, String>,
}
