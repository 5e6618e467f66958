//! Note list/table rendering.
//!
//! Column selection and cell formatting live here so the list table and the
//! per-field detail view format values identically.

use serde::Serialize;
use spacenote_models::{FieldType, Filter, Note, Space};

use crate::fields::{self, DEFAULT_LIST_FIELDS};
use crate::markdown;
use crate::routes::Route;

/// Columns for a note list: the filter's override when it has one, else the
/// space's list fields, else `id`, `author`, `created_at`.
pub fn effective_list_fields(space: &Space, filter: Option<&Filter>) -> Vec<String> {
    if let Some(filter) = filter
        && !filter.list_fields.is_empty()
    {
        return filter.list_fields.clone();
    }
    if !space.list_fields.is_empty() {
        return space.list_fields.clone();
    }
    DEFAULT_LIST_FIELDS.iter().map(|name| name.to_string()).collect()
}

/// A formatted cell. Markdown cells keep their source so each output can
/// render it appropriately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Text(String),
    Markdown(String),
}

impl Cell {
    /// Terminal rendering.
    pub fn plain(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Markdown(source) => markdown::render_plain(source),
        }
    }

    pub fn html(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Markdown(source) => markdown::render_html(source),
        }
    }
}

/// Format one field of a note.
pub fn cell(space: &Space, note: &Note, name: &str) -> Cell {
    match name {
        "id" => Cell::Text(format!("#{}", note.id)),
        "author" => Cell::Text(note.author.clone()),
        "created_at" => Cell::Text(
            fields::format_datetime(&note.created_at, true)
                .unwrap_or_else(|| note.created_at.clone()),
        ),
        _ => {
            let value = note.field(name);
            let is_markdown = space
                .field(name)
                .is_some_and(|field| field.field_type == FieldType::Markdown);
            match value.and_then(|v| v.as_str()) {
                Some(source) if is_markdown => Cell::Markdown(source.to_string()),
                _ => Cell::Text(fields::format_value(value)),
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteRow {
    pub note_id: i64,
    /// Where activating the row navigates.
    #[serde(skip)]
    pub route: Route,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteTable {
    pub columns: Vec<String>,
    pub rows: Vec<NoteRow>,
}

impl NoteTable {
    pub fn build(space: &Space, filter: Option<&Filter>, notes: &[Note]) -> Self {
        let columns = effective_list_fields(space, filter);
        let rows = notes
            .iter()
            .map(|note| NoteRow {
                note_id: note.id,
                route: Route::note_detail(space.id.clone(), note.id),
                cells: columns
                    .iter()
                    .map(|column| cell(space, note, column))
                    .collect(),
            })
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Label/value pairs for the default note detail view: built-ins, then every
/// field of the space in schema order.
pub fn detail_rows(space: &Space, note: &Note) -> Vec<(String, Cell)> {
    let mut rows = vec![
        ("id".to_string(), cell(space, note, "id")),
        ("author".to_string(), cell(space, note, "author")),
        (
            "created_at".to_string(),
            Cell::Text(
                fields::format_datetime(&note.created_at, false)
                    .unwrap_or_else(|| note.created_at.clone()),
            ),
        ),
    ];
    if let Some(edited_at) = &note.edited_at {
        rows.push((
            "edited_at".to_string(),
            Cell::Text(fields::format_datetime(edited_at, false).unwrap_or_else(|| edited_at.clone())),
        ));
    }
    rows.extend(
        space
            .fields
            .iter()
            .map(|field| (field.name.clone(), cell(space, note, &field.name))),
    );
    rows
}
