//! Client-side checks for admin input: space creation, field lists,
//! templates, saved filters and password changes.
//!
//! The backend stays the authority; these rules only stop obviously bad
//! submissions early.

use spacenote_models::{Filter, FilterCondition, FilterOperator, Space};

use crate::fields;
use crate::template::TemplateRenderer;
use crate::validation::ValidationErrors;

pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Split comma-separated input into trimmed, non-empty names.
pub fn parse_name_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Space ids are URL slugs: lowercase ASCII letters, digits and hyphens.
pub fn validate_new_space(id: &str, name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if id.is_empty() {
        errors.push("id", "Space ID is required");
    } else if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        let suggestion = slug::slugify(id);
        let message = if suggestion.is_empty() {
            "Only lowercase letters, numbers, and hyphens allowed".to_string()
        } else {
            format!("Only lowercase letters, numbers, and hyphens allowed (try '{suggestion}')")
        };
        errors.push("id", message);
    }

    if name.trim().is_empty() {
        errors.push("name", "Space name is required");
    }

    errors.into_result()
}

/// Suggested id for a space name, e.g. `Our Tasks` -> `our-tasks`.
pub fn suggest_space_id(name: &str) -> String {
    slug::slugify(name)
}

pub fn validate_password_change(
    current: &str,
    new: &str,
    confirm: Option<&str>,
) -> Result<(), ValidationErrors> {
    if current.is_empty() || new.is_empty() {
        return Err(ValidationErrors::single("password", "Please fill in all fields"));
    }
    if new.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationErrors::single(
            "new_password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    if let Some(confirm) = confirm
        && confirm != new
    {
        return Err(ValidationErrors::single("confirm_password", "Passwords do not match"));
    }
    Ok(())
}

/// Template payload for saving: blank input clears the template, anything
/// else must pass validation first.
pub fn prepare_template(
    renderer: &TemplateRenderer,
    input: &str,
) -> Result<Option<String>, ValidationErrors> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let check = renderer.validate(input);
    match check.error {
        Some(error) if !check.valid => Err(ValidationErrors::single("template", error)),
        _ => Ok(Some(input.to_string())),
    }
}

/// Field names that are not defined in the space.
pub fn unknown_field_names<'a>(space: &Space, names: &'a [String]) -> Vec<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|name| fields::filterable_type(space, name).is_none())
        .collect()
}

/// One condition row as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionDraft {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl ConditionDraft {
    /// Parse `field:operator:value`. The value may itself contain colons.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.splitn(3, ':');
        let field = parts.next()?.trim().to_string();
        let operator = parts.next()?.trim().to_string();
        let value = parts.next().unwrap_or_default().trim().to_string();
        Some(Self {
            field,
            operator,
            value,
        })
    }
}

/// A filter as entered in the create-filter screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub conditions: Vec<ConditionDraft>,
    /// Comma-separated, `-` prefix for descending.
    pub sort: String,
    /// Comma-separated column override.
    pub list_fields: String,
}

impl FilterDraft {
    /// Validate against the space and produce the filter to send.
    pub fn build(&self, space: &Space) -> Result<Filter, ValidationErrors> {
        let id = self.id.trim();
        let title = self.title.trim();
        if id.is_empty() || title.is_empty() {
            return Err(ValidationErrors::single("filter", "ID and title are required"));
        }

        let mut errors = ValidationErrors::default();
        let mut conditions = Vec::with_capacity(self.conditions.len());

        for draft in &self.conditions {
            if draft.field.is_empty() || draft.operator.is_empty() {
                return Err(ValidationErrors::single(
                    "conditions",
                    "All conditions must have a field and operator",
                ));
            }

            let Some(field_type) = fields::filterable_type(space, &draft.field) else {
                errors.push("conditions", format!("Unknown field: {}", draft.field));
                continue;
            };
            let operator: FilterOperator = match draft.operator.parse() {
                Ok(operator) => operator,
                Err(message) => {
                    errors.push("conditions", message);
                    continue;
                }
            };
            if !fields::operators(field_type).contains(&operator) {
                errors.push(
                    "conditions",
                    format!(
                        "Operator '{}' is not valid for {} field '{}'",
                        operator,
                        field_type.as_str(),
                        draft.field
                    ),
                );
                continue;
            }

            conditions.push(FilterCondition {
                field: draft.field.clone(),
                operator,
                value: fields::coerce_filter_value(operator, &draft.value),
            });
        }

        let sort = parse_name_list(&self.sort);
        for entry in &sort {
            let name = entry.strip_prefix('-').unwrap_or(entry);
            if fields::filterable_type(space, name).is_none() {
                errors.push("sort", format!("Unknown sort field: {name}"));
            }
        }

        let list_fields = parse_name_list(&self.list_fields);
        for name in unknown_field_names(space, &list_fields) {
            errors.push("list_fields", format!("Unknown field: {name}"));
        }

        errors.into_result()?;
        Ok(Filter {
            id: id.to_string(),
            title: title.to_string(),
            description: self.description.trim().to_string(),
            conditions,
            sort,
            list_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spacenote_models::{FieldType, SpaceField};

    fn space() -> Space {
        let mut space = Space::new("tasks", "Tasks");
        space.fields = vec![
            SpaceField::new("title", FieldType::String),
            SpaceField::new("tags", FieldType::Tags),
            SpaceField::new("done", FieldType::Boolean),
        ];
        space
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(parse_name_list(" a, b ,,c "), ["a", "b", "c"]);
        assert!(parse_name_list("  ").is_empty());
    }

    #[test]
    fn test_space_id_rules() {
        assert!(validate_new_space("our-tasks-2", "Tasks").is_ok());
        let errors = validate_new_space("Our Tasks", "").unwrap_err();
        assert!(errors.for_field("id").unwrap().message.contains("our-tasks"));
        assert!(errors.for_field("name").is_some());
        assert!(validate_new_space("", "x").is_err());
        assert_eq!(suggest_space_id("Our Tasks!"), "our-tasks");
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password_change("old", "abcd", Some("abcd")).is_ok());
        assert!(validate_password_change("old", "abc", None).is_err());
        assert!(validate_password_change("", "abcd", None).is_err());
        assert!(validate_password_change("old", "abcd", Some("abce")).is_err());
    }

    #[test]
    fn test_prepare_template() {
        let renderer = TemplateRenderer::new().unwrap();
        assert_eq!(prepare_template(&renderer, "  "), Ok(None));
        assert_eq!(
            prepare_template(&renderer, "{{ note.id }}"),
            Ok(Some("{{ note.id }}".to_string()))
        );
        assert!(prepare_template(&renderer, "{{ note.id | nope }}").is_err());
    }

    #[test]
    fn test_filter_draft_builds_coerced_conditions() {
        let draft = FilterDraft {
            id: "open".into(),
            title: "Open".into(),
            conditions: vec![
                ConditionDraft::parse("done:eq:false").unwrap(),
                ConditionDraft::parse("tags:all:a, b").unwrap(),
                ConditionDraft::parse("id:gt:10").unwrap(),
            ],
            sort: "-created_at, title".into(),
            list_fields: "title, tags".into(),
            ..FilterDraft::default()
        };
        let filter = draft.build(&space()).unwrap();

        assert_eq!(filter.conditions[0].value, json!(false));
        assert_eq!(filter.conditions[1].value, json!(["a", "b"]));
        assert_eq!(filter.conditions[2].value, json!(10));
        assert_eq!(filter.sort, ["-created_at", "title"]);
        assert_eq!(filter.list_fields, ["title", "tags"]);
    }

    #[test]
    fn test_filter_draft_rejects_bad_input() {
        let missing_title = FilterDraft {
            id: "x".into(),
            ..FilterDraft::default()
        };
        assert!(missing_title.build(&space()).is_err());

        let bad_operator = FilterDraft {
            id: "x".into(),
            title: "X".into(),
            conditions: vec![ConditionDraft::parse("done:contains:yes").unwrap()],
            ..FilterDraft::default()
        };
        let errors = bad_operator.build(&space()).unwrap_err();
        assert!(errors.errors[0].message.contains("not valid for boolean"));

        let no_operator = FilterDraft {
            id: "x".into(),
            title: "X".into(),
            conditions: vec![ConditionDraft {
                field: "done".into(),
                ..ConditionDraft::default()
            }],
            ..FilterDraft::default()
        };
        assert!(no_operator.build(&space()).is_err());
    }
}
