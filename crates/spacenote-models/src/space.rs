use serde::{Deserialize, Serialize};

use crate::field::SpaceField;
use crate::filter::Filter;

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

/// A workspace with its own field schema, members and saved filters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Space {
    /// Globally unique URL-safe slug, e.g. `our-tasks`.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    /// Field order matters for display.
    #[serde(default)]
    pub fields: Vec<SpaceField>,
    #[serde(default)]
    pub list_fields: Vec<String>,
    #[serde(default)]
    pub hidden_create_fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_detail_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_list_template: Option<String>,
}

impl Space {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            fields: Vec::new(),
            list_fields: Vec::new(),
            hidden_create_fields: Vec::new(),
            filters: Vec::new(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            telegram: None,
            note_detail_template: None,
            note_list_template: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&SpaceField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn filter(&self, id: &str) -> Option<&Filter> {
        self.filters.iter().find(|filter| filter.id == id)
    }
}

/// Telegram notification settings. Delivery happens server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    pub bot_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub templates: TelegramTemplates,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TelegramTemplates {
    #[serde(default)]
    pub new_note: String,
    #[serde(default)]
    pub field_update: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpaceRequest {
    pub id: String,
    pub name: String,
}

/// Body of the list-fields and hidden-create-fields updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldNamesRequest {
    pub field_names: Vec<String>,
}

/// Body of the template updates; `None` clears the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldType;
    use serde_json::json;

    #[test]
    fn test_space_applies_backend_defaults() {
        let space: Space = serde_json::from_value(json!({
            "id": "our-tasks",
            "name": "Our Tasks",
            "fields": [{ "name": "title", "type": "string", "required": true }]
        }))
        .unwrap();

        assert_eq!(space.default_page_size, 20);
        assert_eq!(space.max_page_size, 100);
        assert!(space.filters.is_empty());
        assert_eq!(space.field("title").unwrap().field_type, FieldType::String);
        assert!(space.field("missing").is_none());
    }

    #[test]
    fn test_template_request_serializes_null() {
        let body = serde_json::to_value(TemplateRequest { template: None }).unwrap();
        assert_eq!(body, json!({ "template": null }));
    }
}
