//! Note form generated from a space's field schema.
//!
//! Create mode leaves out the space's `hidden_create_fields`; edit mode shows
//! every field. Submission hands back a flat `name -> string` map with one
//! entry per visible field, empty values included.

use serde_json::Value;
use spacenote_models::{FieldType, Note, Space, SpaceField};
use std::collections::BTreeMap;

use crate::error::{ClientError, Result};
use crate::fields::{self, InputControl};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub field: SpaceField,
    pub control: InputControl,
    pub value: String,
}

impl FormField {
    pub fn name(&self) -> &str {
        &self.field.name
    }
}

#[derive(Debug, Clone)]
pub struct NoteForm {
    mode: FormMode,
    fields: Vec<FormField>,
}

impl NoteForm {
    /// Build the form. Each input starts at the initial value (edit), else the
    /// field default, else empty.
    pub fn new(space: &Space, mode: FormMode, initial: Option<&BTreeMap<String, Value>>) -> Self {
        let fields = space
            .fields
            .iter()
            .filter(|field| {
                mode == FormMode::Edit || !space.hidden_create_fields.contains(&field.name)
            })
            .map(|field| {
                let start = initial
                    .and_then(|values| values.get(&field.name))
                    .filter(|value| !value.is_null())
                    .or(field.default.as_ref());
                let mut value = start.map(input_text).unwrap_or_default();
                if field.field_type == FieldType::Boolean {
                    value = normalize_bool(&value).to_string();
                }
                FormField {
                    control: fields::input_control(field, &space.members),
                    field: field.clone(),
                    value,
                }
            })
            .collect();

        Self { mode, fields }
    }

    pub fn create(space: &Space) -> Self {
        Self::new(space, FormMode::Create, None)
    }

    pub fn edit(space: &Space, note: &Note) -> Self {
        Self::new(space, FormMode::Edit, Some(&note.fields))
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.find(name).map(|field| field.value.as_str())
    }

    /// Set a raw input. Fails for fields that are not part of this form.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let Some(field) = self.fields.iter_mut().find(|f| f.field.name == name) else {
            return Err(ClientError::NotFound(format!("Field '{name}' is not in this form")));
        };
        let value = value.into();
        field.value = if field.field.field_type == FieldType::Boolean {
            normalize_bool(&value).to_string()
        } else {
            value
        };
        Ok(())
    }

    /// Every failed rule, in form order.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for form_field in &self.fields {
            if let Err(message) = fields::validate_input(&form_field.field, &form_field.value) {
                errors.push(form_field.name(), message);
            }
        }
        errors
    }

    /// The payload for the create/update call, or the validation errors that
    /// block it.
    pub fn submit(&self) -> std::result::Result<BTreeMap<String, String>, ValidationErrors> {
        self.validate().into_result()?;
        Ok(self
            .fields
            .iter()
            .map(|field| (field.field.name.clone(), field.value.clone()))
            .collect())
    }

    fn find(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.field.name == name)
    }
}

/// Text shown in an input for a stored value.
fn input_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn normalize_bool(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => "true",
        _ => "false",
    }
}
