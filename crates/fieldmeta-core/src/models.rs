use serde::{Deserialize, Serialize};

/// Opaque identifier of a field within one issue type's schema
/// (e.g., "summary" or "customfield_10806")
pub type FieldKey = String;

/// One selectable value of an enumerable field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Choice {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Choice {
    /// Human-facing label: name, then value, then id
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.value.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Type description of a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Base type (e.g., "string", "array", "option")
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Custom field type identifier
    /// (e.g., "com.pyxis.greenhopper.jira:gh-epic-link")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    /// Numeric id of the custom field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<i64>,
    /// Item type for array fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,
    /// System field identifier (e.g., "summary")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl Schema {
    pub fn field_type(&self) -> FieldType {
        FieldType::parse(&self.kind)
    }

    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }
}

/// Known base types of a field schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Array,
    Date,
    DateTime,
    Number,
    User,
    Group,
    Object,
    Option,
    Any,
    Other(String),
}

impl FieldType {
    pub fn parse(s: &str) -> Self {
        match s {
            "string" => FieldType::String,
            "array" => FieldType::Array,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "number" => FieldType::Number,
            "user" => FieldType::User,
            "group" => FieldType::Group,
            "object" => FieldType::Object,
            "option" => FieldType::Option,
            "any" => FieldType::Any,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Array => "array",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Number => "number",
            FieldType::User => "user",
            FieldType::Group => "group",
            FieldType::Object => "object",
            FieldType::Option => "option",
            FieldType::Any => "any",
            FieldType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded attributes of a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub key: FieldKey,
    pub required: bool,
    /// Label shown in the create/edit form
    pub name: String,
    pub has_default_value: bool,
    pub schema: Schema,
    /// Only populated for enumerable fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Choice>,
    /// Operations the form allows on the field (e.g., "set", "add")
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<String>,
}

/// Field schema of one issue type within one project.
///
/// Field keys are unique. Display names are not: the platform lets distinct
/// custom fields share a label, see [`crate::FieldSchema::ambiguous_names`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueTypeMetadata {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subtask: bool,
    pub(crate) fields: Vec<FieldDefinition>,
}

impl IssueTypeMetadata {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Create metadata for one project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub id: String,
    /// Project key (e.g., "OPS")
    pub key: String,
    pub name: String,
    pub issue_types: Vec<IssueTypeMetadata>,
}

/// Create metadata response: one entry per project visible to the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand: Option<String>,
    pub projects: Vec<ProjectMetadata>,
}

/// Edit metadata for a single issue.
///
/// Same field model as [`IssueTypeMetadata`], without the project and issue
/// type nesting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditMetaInfo {
    pub(crate) fields: Vec<FieldDefinition>,
}
