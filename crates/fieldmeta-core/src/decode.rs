//! Decoding of create/edit metadata payloads into the typed schema store.
//!
//! Decoding is two-step: the envelope (projects, issue types) goes through
//! serde, then every field entry is decoded on its own by
//! [`FieldDefinition::decode`] so a broken entry is reported with its key.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::models::*;

#[derive(Deserialize)]
struct RawMetaInfo {
    #[serde(default)]
    expand: Option<String>,
    #[serde(default)]
    projects: Vec<RawProject>,
}

#[derive(Deserialize)]
struct RawProject {
    #[serde(default)]
    id: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "issuetypes")]
    issue_types: Vec<RawIssueType>,
}

#[derive(Deserialize)]
struct RawIssueType {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    subtask: bool,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawEditMeta {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// One page of `createmeta/{project}/issuetypes`
#[derive(Deserialize)]
struct RawIssueTypePage {
    #[serde(default)]
    values: Vec<RawIssueType>,
}

/// One page of `createmeta/{project}/issuetypes/{id}`
#[derive(Deserialize)]
struct RawFieldPage {
    #[serde(default)]
    values: Vec<Value>,
}

fn envelope<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| SchemaError::Payload(e.to_string()))
}

fn missing(field: &str, attribute: &'static str) -> SchemaError {
    SchemaError::MissingAttribute {
        field: field.to_string(),
        attribute,
    }
}

fn invalid(field: &str, attribute: &'static str, expected: &'static str) -> SchemaError {
    SchemaError::InvalidAttribute {
        field: field.to_string(),
        attribute,
        expected,
    }
}

/// Absent and null both degrade to the default; any other mismatch is an error
fn optional<T: DeserializeOwned + Default>(
    field: &str,
    entry: &Map<String, Value>,
    attribute: &'static str,
    expected: &'static str,
) -> Result<T> {
    match entry.get(attribute) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => T::deserialize(v).map_err(|_| invalid(field, attribute, expected)),
    }
}

impl FieldDefinition {
    /// Decode a single field entry keyed by `key`.
    ///
    /// `required` and `name` must be present with the right type; a missing
    /// required flag is never read as "not required".
    pub fn decode(key: &str, value: &Value) -> Result<Self> {
        let entry = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
            field: key.to_string(),
        })?;

        let required = match entry.get("required") {
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid(key, "required", "a boolean")),
            None => return Err(missing(key, "required")),
        };
        let name = match entry.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(invalid(key, "name", "a string")),
            None => return Err(missing(key, "name")),
        };

        Ok(Self {
            key: key.to_string(),
            required,
            name,
            has_default_value: optional(key, entry, "hasDefaultValue", "a boolean")?,
            schema: optional(key, entry, "schema", "a schema object")?,
            allowed_values: optional(key, entry, "allowedValues", "a list of choices")?,
            operations: optional(key, entry, "operations", "a list of strings")?,
        })
    }
}

/// Decode a `fieldKey -> entry` mapping, keeping payload order
pub(crate) fn decode_fields(fields: &Map<String, Value>) -> Result<Vec<FieldDefinition>> {
    fields
        .iter()
        .map(|(key, value)| {
            trace!(field = %key, "decoding field entry");
            FieldDefinition::decode(key, value)
        })
        .collect()
}

impl IssueTypeMetadata {
    /// Decode one `issuetypes[]` entry of a create metadata response
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: RawIssueType = envelope(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawIssueType) -> Result<Self> {
        let fields = decode_fields(&raw.fields)?;
        debug!(
            issue_type = %raw.name,
            fields = fields.len(),
            "decoded issue type metadata"
        );
        Ok(Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            subtask: raw.subtask,
            fields,
        })
    }

    /// Decode one page of the per-issue-type field listing, where each entry
    /// carries its own `fieldId` instead of being keyed by it.
    ///
    /// Only the given page is decoded.
    pub fn from_field_page(id: &str, name: &str, page: &Value) -> Result<Self> {
        let raw: RawFieldPage = envelope(page)?;
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(raw.values.len());

        for (index, entry) in raw.values.iter().enumerate() {
            let key = match entry.get("fieldId") {
                Some(Value::String(s)) => s.clone(),
                Some(_) => return Err(invalid(&format!("values[{}]", index), "fieldId", "a string")),
                None => return Err(missing(&format!("values[{}]", index), "fieldId")),
            };
            if !seen.insert(key.clone()) {
                return Err(SchemaError::Payload(format!("duplicate field key '{}'", key)));
            }
            fields.push(FieldDefinition::decode(&key, entry)?);
        }

        debug!(issue_type = %name, fields = fields.len(), "decoded field page");
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            subtask: false,
            fields,
        })
    }
}

impl IssueTypeMetadata {
    /// Decode one page of a project's issue type listing.
    ///
    /// The listing carries no field schemas, so the issue types come back
    /// without fields; fetch those per issue type with the returned id.
    pub fn list_from_page(page: &Value) -> Result<Vec<Self>> {
        let raw: RawIssueTypePage = envelope(page)?;
        let issue_types = raw
            .values
            .into_iter()
            .map(Self::from_raw)
            .collect::<Result<Vec<_>>>()?;
        debug!(issue_types = issue_types.len(), "decoded issue type page");
        Ok(issue_types)
    }
}

impl ProjectMetadata {
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: RawProject = envelope(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawProject) -> Result<Self> {
        let issue_types = raw
            .issue_types
            .into_iter()
            .map(IssueTypeMetadata::from_raw)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: raw.id,
            key: raw.key,
            name: raw.name,
            issue_types,
        })
    }
}

impl MetaInfo {
    /// Decode a full create metadata response
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: RawMetaInfo = envelope(value)?;
        let projects = raw
            .projects
            .into_iter()
            .map(ProjectMetadata::from_raw)
            .collect::<Result<Vec<_>>>()?;
        debug!(projects = projects.len(), "decoded create metadata");
        Ok(Self {
            expand: raw.expand,
            projects,
        })
    }
}

impl EditMetaInfo {
    /// Decode an edit metadata response (`{"fields": {...}}`)
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: RawEditMeta = envelope(value)?;
        let fields = decode_fields(&raw.fields)?;
        debug!(fields = fields.len(), "decoded edit metadata");
        Ok(Self { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FieldSchema;
    use serde_json::json;

    fn epic_link() -> Value {
        json!({
            "required": true,
            "schema": {
                "type": "any",
                "custom": "com.pyxis.greenhopper.jira:gh-epic-link",
                "customId": 10806
            },
            "name": "Epic Link",
            "hasDefaultValue": false,
            "operations": ["set"]
        })
    }

    #[test]
    fn decode_full_field_entry() {
        let field = FieldDefinition::decode("customfield_10806", &epic_link()).unwrap();

        assert_eq!(field.key, "customfield_10806");
        assert!(field.required);
        assert_eq!(field.name, "Epic Link");
        assert!(!field.has_default_value);
        assert_eq!(field.schema.field_type(), FieldType::Any);
        assert_eq!(field.schema.custom_id, Some(10806));
        assert!(field.schema.is_custom());
        assert_eq!(field.operations, vec!["set"]);
        assert!(field.allowed_values.is_empty());
    }

    #[test]
    fn decode_minimal_field_entry() {
        let field =
            FieldDefinition::decode("labels", &json!({"required": false, "name": "Labels"}))
                .unwrap();

        assert!(!field.required);
        assert_eq!(field.schema, Schema::default());
        assert!(!field.has_default_value);
        assert!(field.operations.is_empty());
    }

    #[test]
    fn decode_allowed_values() {
        let field = FieldDefinition::decode(
            "priority",
            &json!({
                "required": false,
                "name": "Priority",
                "hasDefaultValue": true,
                "schema": {"type": "priority", "system": "priority"},
                "allowedValues": [
                    {"self": "https://jira/rest/api/2/priority/1", "id": "1", "name": "Blocker"},
                    {"id": "2", "value": "Major"},
                    {"id": "3"}
                ]
            }),
        )
        .unwrap();

        assert!(field.has_default_value);
        assert_eq!(field.schema.system.as_deref(), Some("priority"));
        let labels: Vec<_> = field.allowed_values.iter().map(Choice::label).collect();
        assert_eq!(labels, vec!["Blocker", "Major", "3"]);
    }

    #[test]
    fn null_optional_attributes_degrade_to_defaults() {
        let field = FieldDefinition::decode(
            "duedate",
            &json!({"required": false, "name": "Due Date", "schema": null, "allowedValues": null}),
        )
        .unwrap();

        assert_eq!(field.schema, Schema::default());
        assert!(field.allowed_values.is_empty());
    }

    #[test]
    fn missing_required_flag_is_an_error() {
        let err = FieldDefinition::decode("summary", &json!({"name": "Summary"})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingAttribute {
                field: "summary".into(),
                attribute: "required"
            }
        );
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = FieldDefinition::decode("summary", &json!({"required": true})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingAttribute {
                field: "summary".into(),
                attribute: "name"
            }
        );
    }

    #[test]
    fn wrongly_typed_required_flag_is_an_error() {
        let err = FieldDefinition::decode("summary", &json!({"required": "true", "name": "Summary"}))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidAttribute {
                attribute: "required",
                ..
            }
        ));

        let err = FieldDefinition::decode("summary", &json!({"required": true, "name": 7}))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidAttribute {
                attribute: "name",
                ..
            }
        ));
    }

    #[test]
    fn malformed_optional_attribute_is_an_error() {
        let err = FieldDefinition::decode(
            "labels",
            &json!({"required": false, "name": "Labels", "allowedValues": "none"}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidAttribute {
                field: "labels".into(),
                attribute: "allowedValues",
                expected: "a list of choices"
            }
        );
    }

    #[test]
    fn non_object_entry_is_an_error() {
        let err = FieldDefinition::decode("summary", &json!(true)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NotAnObject {
                field: "summary".into()
            }
        );
    }

    #[test]
    fn decode_create_meta_keeps_payload_order() {
        let meta = MetaInfo::from_value(&json!({
            "expand": "projects",
            "projects": [{
                "id": "10000",
                "key": "OPS",
                "name": "Operations",
                "issuetypes": [{
                    "id": "1",
                    "name": "Bug",
                    "subtask": false,
                    "fields": {
                        "summary": {"required": true, "name": "Summary"},
                        "customfield_10806": epic_link(),
                        "labels": {"required": false, "name": "Labels"}
                    }
                }]
            }]
        }))
        .unwrap();

        assert_eq!(meta.expand.as_deref(), Some("projects"));
        let project = &meta.projects[0];
        assert_eq!(project.key, "OPS");
        let bug = &project.issue_types[0];
        let keys: Vec<_> = bug.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["summary", "customfield_10806", "labels"]);
        assert_eq!(bug.field("labels").map(|f| f.name.as_str()), Some("Labels"));
    }

    #[test]
    fn broken_field_fails_the_whole_decode() {
        let err = MetaInfo::from_value(&json!({
            "projects": [{
                "id": "1", "key": "OPS", "name": "Operations",
                "issuetypes": [{
                    "id": "1", "name": "Bug",
                    "fields": {"summary": {"name": "Summary"}}
                }]
            }]
        }))
        .unwrap_err();

        assert!(matches!(err, SchemaError::MissingAttribute { .. }));
    }

    #[test]
    fn malformed_envelope_is_a_payload_error() {
        let err = MetaInfo::from_value(&json!({"projects": "OPS"})).unwrap_err();
        assert!(matches!(err, SchemaError::Payload(_)));
    }

    #[test]
    fn decode_edit_meta() {
        let meta = EditMetaInfo::from_value(&json!({
            "fields": {
                "summary": {"required": true, "name": "Summary", "operations": ["set"]},
                "customfield_10806": epic_link()
            }
        }))
        .unwrap();

        assert_eq!(meta.fields().len(), 2);
        assert!(meta.field("customfield_10806").unwrap().required);
    }

    #[test]
    fn decode_field_page() {
        let page = json!({
            "maxResults": 50,
            "startAt": 0,
            "total": 2,
            "isLast": true,
            "values": [
                {"fieldId": "summary", "required": true, "name": "Summary"},
                {"fieldId": "customfield_10806", "required": true, "name": "Epic Link",
                 "schema": {"type": "any", "customId": 10806}}
            ]
        });

        let meta = IssueTypeMetadata::from_field_page("1", "Bug", &page).unwrap();
        assert_eq!(meta.name, "Bug");
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.field("customfield_10806").unwrap().name, "Epic Link");
    }

    #[test]
    fn field_page_requires_field_id() {
        let page = json!({"values": [{"required": true, "name": "Summary"}]});
        let err = IssueTypeMetadata::from_field_page("1", "Bug", &page).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingAttribute {
                field: "values[0]".into(),
                attribute: "fieldId"
            }
        );
    }

    #[test]
    fn field_page_rejects_duplicate_keys() {
        let page = json!({"values": [
            {"fieldId": "summary", "required": true, "name": "Summary"},
            {"fieldId": "summary", "required": false, "name": "Summary"}
        ]});
        let err = IssueTypeMetadata::from_field_page("1", "Bug", &page).unwrap_err();
        assert!(matches!(err, SchemaError::Payload(_)));
    }

    #[test]
    fn decode_issue_type_page() {
        let page = json!({
            "maxResults": 50,
            "startAt": 0,
            "total": 2,
            "isLast": true,
            "values": [
                {"self": "https://jira.example.com/rest/api/2/issuetype/1", "id": "1",
                 "name": "Bug", "description": "A problem", "subtask": false},
                {"id": "5", "name": "Sub-task", "subtask": true}
            ]
        });

        let issue_types = IssueTypeMetadata::list_from_page(&page).unwrap();
        assert_eq!(issue_types.len(), 2);
        assert_eq!(issue_types[0].id, "1");
        assert_eq!(issue_types[0].description.as_deref(), Some("A problem"));
        assert!(issue_types[0].is_empty());
        assert!(issue_types[1].subtask);
    }

    #[test]
    fn malformed_issue_type_page_is_a_payload_error() {
        let err = IssueTypeMetadata::list_from_page(&json!({"values": "Bug"})).unwrap_err();
        assert!(matches!(err, SchemaError::Payload(_)));
    }
}
