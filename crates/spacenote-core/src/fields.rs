//! Field-type registry.
//!
//! One table per concern over the closed [`FieldType`] set: which input
//! control edits a field, how a raw input is validated, how a stored value is
//! displayed and which filter operators apply.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};
use spacenote_models::{FieldOptions, FieldType, FilterOperator, Space, SpaceField};

/// Fields every note has, filterable in every space.
pub const BUILTIN_FIELDS: [(&str, FieldType); 3] = [
    ("id", FieldType::Int),
    ("author", FieldType::User),
    ("created_at", FieldType::Datetime),
];

/// Columns shown when neither the filter nor the space configures any.
pub const DEFAULT_LIST_FIELDS: [&str; 3] = ["id", "author", "created_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStep {
    Integer,
    Decimal,
}

impl NumberStep {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberStep::Integer => "1",
            NumberStep::Decimal => "0.01",
        }
    }
}

/// Input widget used to edit a field.
#[derive(Debug, Clone, PartialEq)]
pub enum InputControl {
    Text { hint: Option<&'static str> },
    Multiline,
    Checkbox,
    Select { options: Vec<String> },
    DateTime,
    Number {
        step: NumberStep,
        min: Option<Number>,
        max: Option<Number>,
    },
}

/// Pick the control for a field. User fields select among `members`.
pub fn input_control(field: &SpaceField, members: &[String]) -> InputControl {
    match field.field_type {
        FieldType::String => InputControl::Text { hint: None },
        FieldType::Markdown => InputControl::Multiline,
        FieldType::Boolean => InputControl::Checkbox,
        FieldType::Choice => InputControl::Select {
            options: field.options.values.clone().unwrap_or_default(),
        },
        FieldType::Tags => InputControl::Text {
            hint: Some("comma separated"),
        },
        FieldType::User => InputControl::Select {
            options: members.to_vec(),
        },
        FieldType::Datetime => InputControl::DateTime,
        FieldType::Int => InputControl::Number {
            step: NumberStep::Integer,
            min: field.options.min.clone(),
            max: field.options.max.clone(),
        },
        FieldType::Float => InputControl::Number {
            step: NumberStep::Decimal,
            min: field.options.min.clone(),
            max: field.options.max.clone(),
        },
        FieldType::Image => InputControl::Text {
            hint: Some("attachment id"),
        },
    }
}

/// Operators a filter condition may use on a field of this type.
pub fn operators(field_type: FieldType) -> &'static [FilterOperator] {
    use FilterOperator::*;

    match field_type {
        FieldType::String | FieldType::Markdown => {
            &[Eq, Ne, Contains, Startswith, Endswith, In]
        }
        FieldType::Boolean => &[Eq, Ne],
        FieldType::Choice => &[Eq, Ne, In],
        FieldType::Tags => &[Contains, In, All],
        FieldType::User => &[Eq, Ne, In],
        FieldType::Datetime => &[Eq, Ne, Gt, Gte, Lt, Lte],
        FieldType::Int | FieldType::Float => &[Eq, Ne, Gt, Gte, Lt, Lte, In],
        FieldType::Image => &[Eq, Ne],
    }
}

/// Type of a filterable field: a built-in or one of the space's own fields.
pub fn filterable_type(space: &Space, name: &str) -> Option<FieldType> {
    BUILTIN_FIELDS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, field_type)| *field_type)
        .or_else(|| space.field(name).map(|field| field.field_type))
}

/// Built-ins first, then the space's fields in schema order.
pub fn filterable_fields(space: &Space) -> Vec<(String, FieldType)> {
    BUILTIN_FIELDS
        .iter()
        .map(|(name, field_type)| (name.to_string(), *field_type))
        .chain(
            space
                .fields
                .iter()
                .map(|field| (field.name.clone(), field.field_type)),
        )
        .collect()
}

/// Client-side check of one raw form input. Booleans always pass.
pub fn validate_input(field: &SpaceField, raw: &str) -> Result<(), String> {
    if field.field_type == FieldType::Boolean {
        return Ok(());
    }

    let value = raw.trim();
    if value.is_empty() {
        return if field.required {
            Err(format!("{} is required", field.name))
        } else {
            Ok(())
        };
    }

    match field.field_type {
        FieldType::Int => {
            let parsed: i64 = value
                .parse()
                .map_err(|_| format!("{} must be a whole number", field.name))?;
            check_bounds(field, parsed as f64)
        }
        FieldType::Float => {
            let parsed: f64 = value
                .parse()
                .ok()
                .filter(|n: &f64| n.is_finite())
                .ok_or_else(|| format!("{} must be a number", field.name))?;
            check_bounds(field, parsed)
        }
        FieldType::Choice => match &field.options.values {
            Some(values) if !values.iter().any(|v| v == value) => Err(format!(
                "{} must be one of: {}",
                field.name,
                values.join(", ")
            )),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_bounds(field: &SpaceField, value: f64) -> Result<(), String> {
    if let Some(min) = field.options.min.as_ref().and_then(Number::as_f64)
        && value < min
    {
        return Err(format!("{} must be at least {}", field.name, format_number(min)));
    }
    if let Some(max) = field.options.max.as_ref().and_then(Number::as_f64)
        && value > max
    {
        return Err(format!("{} must be at most {}", field.name, format_number(max)));
    }
    Ok(())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Coerce raw filter-condition text into the JSON value sent to the backend.
///
/// List operators split on commas. Otherwise `true`/`false` become booleans
/// and numeric text becomes a number; anything else stays a string.
pub fn coerce_filter_value(operator: FilterOperator, raw: &str) -> Value {
    if operator.takes_list() {
        return Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        );
    }

    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    parse_number(raw)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Surrounding whitespace is ignored, so `" 42 "` is the number 42.
/// Whitespace-only input is not a number and stays a string.
fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .and_then(Number::from_f64)
}

/// Generic scalar formatter shared by tables, detail views and defaults.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) if items.is_empty() => "-".to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

pub fn format_default(field: &SpaceField) -> String {
    format_value(field.default.as_ref())
}

/// e.g. `values: ['low', 'high'], min: 1`. Empty options render as `-`.
pub fn format_options(options: &FieldOptions) -> String {
    let mut parts = Vec::new();
    if let Some(values) = &options.values {
        let quoted: Vec<String> = values.iter().map(|v| format!("'{v}'")).collect();
        parts.push(format!("values: [{}]", quoted.join(", ")));
    }
    if let Some(min) = &options.min {
        parts.push(format!("min: {min}"));
    }
    if let Some(max) = &options.max {
        parts.push(format!("max: {max}"));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format an ISO 8601 timestamp. Offset-aware values are shown in local
/// time; naive ones are shown as sent. `None` when the text is not a date.
pub fn format_datetime(raw: &str, date_only: bool) -> Option<String> {
    let format = if date_only { DATE_FORMAT } else { DATETIME_FORMAT };
    let raw = raw.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Some(aware.with_timezone(&Local).format(format).to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.format(format).to_string());
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN).format(format).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spacenote_models::FilterOperator::{
        All, Contains, Endswith, Eq, Gt, Gte, In, Lt, Lte, Ne, Startswith,
    };

    #[test]
    fn test_operator_table() {
        let ops = |t| operators(t).to_vec();
        assert_eq!(
            ops(FieldType::String),
            vec![Eq, Ne, Contains, Startswith, Endswith, In]
        );
        assert_eq!(ops(FieldType::Markdown), ops(FieldType::String));
        assert_eq!(ops(FieldType::Boolean), vec![Eq, Ne]);
        assert_eq!(ops(FieldType::Choice), vec![Eq, Ne, In]);
        assert_eq!(ops(FieldType::Tags), vec![Contains, In, All]);
        assert_eq!(ops(FieldType::User), vec![Eq, Ne, In]);
        assert_eq!(ops(FieldType::Datetime), vec![Eq, Ne, Gt, Gte, Lt, Lte]);
        assert_eq!(ops(FieldType::Int), vec![Eq, Ne, Gt, Gte, Lt, Lte, In]);
        assert_eq!(ops(FieldType::Float), ops(FieldType::Int));
        assert_eq!(ops(FieldType::Image), vec![Eq, Ne]);
    }

    #[test]
    fn test_builtin_fields_are_filterable_everywhere() {
        let mut space = Space::new("s", "S");
        space.fields.push(SpaceField::new("tags", FieldType::Tags));

        assert_eq!(filterable_type(&space, "id"), Some(FieldType::Int));
        assert_eq!(filterable_type(&space, "author"), Some(FieldType::User));
        assert_eq!(filterable_type(&space, "created_at"), Some(FieldType::Datetime));
        assert_eq!(filterable_type(&space, "tags"), Some(FieldType::Tags));
        assert_eq!(filterable_type(&space, "nope"), None);
        assert_eq!(filterable_fields(&space).len(), 4);
    }

    #[test]
    fn test_coerce_filter_value() {
        assert_eq!(coerce_filter_value(Eq, "true"), json!(true));
        assert_eq!(coerce_filter_value(Eq, "false"), json!(false));
        assert_eq!(coerce_filter_value(Gt, "3.14"), json!(3.14));
        assert_eq!(coerce_filter_value(Eq, "42"), json!(42));
        assert_eq!(coerce_filter_value(In, "a, b, c"), json!(["a", "b", "c"]));
        assert_eq!(coerce_filter_value(All, " x,,y "), json!(["x", "y"]));
        assert_eq!(coerce_filter_value(Contains, "hello"), json!("hello"));
        assert_eq!(coerce_filter_value(Eq, ""), json!(""));
        assert_eq!(coerce_filter_value(Eq, " 42 "), json!(42));
        assert_eq!(coerce_filter_value(Eq, "   "), json!("   "));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "-");
        assert_eq!(format_value(Some(&Value::Null)), "-");
        assert_eq!(format_value(Some(&json!([]))), "-");
        assert_eq!(format_value(Some(&json!(["a", "b"]))), "a, b");
        assert_eq!(format_value(Some(&json!(true))), "Yes");
        assert_eq!(format_value(Some(&json!(false))), "No");
        assert_eq!(format_value(Some(&json!(7))), "7");
        assert_eq!(format_value(Some(&json!("text"))), "text");
    }

    #[test]
    fn test_validate_input() {
        let title = SpaceField::new("title", FieldType::String).required();
        assert!(validate_input(&title, "  ").is_err());
        assert!(validate_input(&title, "x").is_ok());

        let done = SpaceField::new("done", FieldType::Boolean).required();
        assert!(validate_input(&done, "").is_ok());

        let priority = SpaceField {
            options: FieldOptions {
                min: Some(Number::from(1)),
                max: Some(Number::from(5)),
                ..FieldOptions::default()
            },
            ..SpaceField::new("priority", FieldType::Int)
        };
        assert!(validate_input(&priority, "").is_ok());
        assert!(validate_input(&priority, "abc").is_err());
        assert!(validate_input(&priority, "9").unwrap_err().contains("at most 5"));
        assert!(validate_input(&priority, "3").is_ok());

        let status = SpaceField::new("status", FieldType::Choice).with_choices(["open", "closed"]);
        assert!(validate_input(&status, "open").is_ok());
        assert!(validate_input(&status, "other").is_err());
    }

    #[test]
    fn test_input_controls() {
        let members = vec!["alice".to_string(), "bob".to_string()];
        let assignee = SpaceField::new("assignee", FieldType::User);
        assert_eq!(
            input_control(&assignee, &members),
            InputControl::Select { options: members.clone() }
        );
        let size = SpaceField::new("size", FieldType::Float);
        assert!(matches!(
            input_control(&size, &members),
            InputControl::Number { step: NumberStep::Decimal, .. }
        ));
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(
            format_datetime("2025-03-04T10:20:30.123456", false).as_deref(),
            Some("2025-03-04 10:20:30")
        );
        assert_eq!(
            format_datetime("2025-03-04T10:20:30", true).as_deref(),
            Some("2025-03-04")
        );
        assert_eq!(format_datetime("2025-03-04", true).as_deref(), Some("2025-03-04"));
        assert!(format_datetime("2025-03-04T10:20:30Z", false).is_some());
        assert_eq!(format_datetime("yesterday", true), None);
    }

    #[test]
    fn test_format_options() {
        let options = FieldOptions {
            values: Some(vec!["a".into(), "b".into()]),
            min: Some(Number::from(1)),
            max: None,
        };
        assert_eq!(format_options(&options), "values: ['a', 'b'], min: 1");
        assert_eq!(format_options(&FieldOptions::default()), "-");
    }
}
