use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Closed set of field types a space schema can use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Markdown,
    Boolean,
    Choice,
    Tags,
    User,
    Datetime,
    Int,
    Float,
    Image,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::String,
        FieldType::Markdown,
        FieldType::Boolean,
        FieldType::Choice,
        FieldType::Tags,
        FieldType::User,
        FieldType::Datetime,
        FieldType::Int,
        FieldType::Float,
        FieldType::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Markdown => "markdown",
            FieldType::Boolean => "boolean",
            FieldType::Choice => "choice",
            FieldType::Tags => "tags",
            FieldType::User => "user",
            FieldType::Datetime => "datetime",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Image => "image",
        }
    }

    /// Capitalised name used in schema listings ("String", "Datetime").
    pub fn label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FieldType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("Unknown field type: {s}"))
    }
}

/// Type-dependent field options.
///
/// `values` applies to choice fields, `min`/`max` to numeric ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
}

impl FieldOptions {
    pub fn is_empty(&self) -> bool {
        self.values.is_none() && self.min.is_none() && self.max.is_none()
    }
}

/// A named, typed attribute of every note in a space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpaceField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: FieldOptions,
    #[serde(default)]
    pub default: Option<Value>,
}

impl SpaceField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            options: FieldOptions::default(),
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}
