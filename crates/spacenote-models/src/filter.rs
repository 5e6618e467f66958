use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    Startswith,
    Endswith,
    In,
    All,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 11] = [
        FilterOperator::Eq,
        FilterOperator::Ne,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Contains,
        FilterOperator::Startswith,
        FilterOperator::Endswith,
        FilterOperator::In,
        FilterOperator::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::Startswith => "startswith",
            FilterOperator::Endswith => "endswith",
            FilterOperator::In => "in",
            FilterOperator::All => "all",
        }
    }

    /// Human readable label shown next to the operator.
    pub fn label(self) -> &'static str {
        match self {
            FilterOperator::Eq => "equals",
            FilterOperator::Ne => "not equals",
            FilterOperator::Gt => "greater than",
            FilterOperator::Gte => "greater than or equal",
            FilterOperator::Lt => "less than",
            FilterOperator::Lte => "less than or equal",
            FilterOperator::Contains => "contains",
            FilterOperator::Startswith => "starts with",
            FilterOperator::Endswith => "ends with",
            FilterOperator::In => "in (has any)",
            FilterOperator::All => "has all",
        }
    }

    /// Operators whose value is a list of strings.
    pub fn takes_list(self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::All)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| format!("Unknown operator: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

/// A saved query scoped to one space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    /// Field names, `-` prefix for descending order.
    #[serde(default)]
    pub sort: Vec<String>,
    /// Overrides the space's list fields for this filter's results.
    #[serde(default)]
    pub list_fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_round_trips_as_lowercase() {
        let cond = FilterCondition {
            field: "tags".to_string(),
            operator: FilterOperator::Startswith,
            value: json!("ur"),
        };
        let encoded = serde_json::to_value(&cond).unwrap();
        assert_eq!(encoded["operator"], json!("startswith"));
    }

    #[test]
    fn test_operator_labels() {
        assert_eq!(FilterOperator::In.label(), "in (has any)");
        assert_eq!(FilterOperator::Gte.label(), "greater than or equal");
        assert_eq!("LTE".parse::<FilterOperator>().unwrap(), FilterOperator::Lte);
    }
}
