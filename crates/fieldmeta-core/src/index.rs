use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{EditMetaInfo, FieldDefinition, FieldKey, IssueTypeMetadata};

/// Display name -> field key
pub type FieldNameIndex = BTreeMap<String, FieldKey>;

/// Read access to a decoded field schema plus the name indexes derived from it.
///
/// Index tables are rebuilt on every call; the schema itself never changes
/// after decoding, so every method is safe to call concurrently.
///
/// Display names are not unique. When several fields share a name, the one
/// that comes last in payload order wins in both indexes; use
/// [`FieldSchema::ambiguous_names`] to find such names.
pub trait FieldSchema {
    /// Field definitions in payload order
    fn fields(&self) -> &[FieldDefinition];

    /// Look up a field by its key
    fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields().iter().find(|f| f.key == key)
    }

    /// Look up a field by its display name, with the same tie-break as
    /// [`FieldSchema::all_fields`]
    fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().iter().rev().find(|f| f.name == name)
    }

    /// Name -> key for every field with `required == true`
    fn mandatory_fields(&self) -> FieldNameIndex {
        build_index(self.fields().iter().filter(|f| f.required))
    }

    /// Name -> key for every field, required or not
    fn all_fields(&self) -> FieldNameIndex {
        build_index(self.fields().iter())
    }

    /// Display names carried by more than one field key, with all of their
    /// keys in payload order
    fn ambiguous_names(&self) -> BTreeMap<String, Vec<FieldKey>> {
        let mut by_name: BTreeMap<String, Vec<FieldKey>> = BTreeMap::new();
        for field in self.fields() {
            by_name
                .entry(field.name.clone())
                .or_default()
                .push(field.key.clone());
        }
        by_name.retain(|_, keys| keys.len() > 1);
        by_name
    }
}

fn build_index<'a>(fields: impl Iterator<Item = &'a FieldDefinition>) -> FieldNameIndex {
    let mut index = FieldNameIndex::new();
    for field in fields {
        if let Some(previous) = index.insert(field.name.clone(), field.key.clone()) {
            warn!(
                name = %field.name,
                dropped = %previous,
                kept = %field.key,
                "display name shared by several fields, keeping the later one"
            );
        }
    }
    index
}

impl FieldSchema for IssueTypeMetadata {
    fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }
}

impl FieldSchema for EditMetaInfo {
    fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bug_meta() -> IssueTypeMetadata {
        IssueTypeMetadata::from_value(&json!({
            "id": "1",
            "name": "Bug",
            "fields": {
                "customfield_1": {"required": true, "name": "Epic Link"},
                "summary": {"required": true, "name": "Summary"},
                "labels": {"required": false, "name": "Labels"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn mandatory_fields_maps_required_names_to_keys() {
        let mandatory = bug_meta().mandatory_fields();

        assert_eq!(mandatory.len(), 2);
        assert_eq!(mandatory["Epic Link"], "customfield_1");
        assert_eq!(mandatory["Summary"], "summary");
        assert!(!mandatory.contains_key("Labels"));
    }

    #[test]
    fn all_fields_includes_optional_fields() {
        let all = bug_meta().all_fields();

        assert_eq!(all.len(), 3);
        assert_eq!(all["Labels"], "labels");
    }

    #[test]
    fn indexes_of_empty_schema_are_empty() {
        let meta = IssueTypeMetadata::from_value(&json!({"id": "1", "name": "Task"})).unwrap();

        assert!(meta.is_empty());
        assert!(meta.mandatory_fields().is_empty());
        assert!(meta.all_fields().is_empty());
    }

    #[test]
    fn duplicate_names_keep_the_later_field() {
        let meta = IssueTypeMetadata::from_value(&json!({
            "id": "1",
            "name": "Story",
            "fields": {
                "customfield_200": {"required": true, "name": "Team"},
                "customfield_100": {"required": true, "name": "Team"},
                "summary": {"required": true, "name": "Summary"}
            }
        }))
        .unwrap();

        assert_eq!(meta.mandatory_fields()["Team"], "customfield_100");
        assert_eq!(meta.all_fields()["Team"], "customfield_100");
        assert_eq!(meta.all_fields().len(), 2);
        assert_eq!(
            meta.field_by_name("Team").map(|f| f.key.as_str()),
            Some("customfield_100")
        );
        assert_eq!(
            meta.ambiguous_names()["Team"],
            vec!["customfield_200", "customfield_100"]
        );
    }

    #[test]
    fn duplicate_name_only_counts_required_fields_for_mandatory() {
        let meta = IssueTypeMetadata::from_value(&json!({
            "id": "1",
            "name": "Story",
            "fields": {
                "customfield_1": {"required": true, "name": "Team"},
                "customfield_2": {"required": false, "name": "Team"}
            }
        }))
        .unwrap();

        assert_eq!(meta.mandatory_fields()["Team"], "customfield_1");
        assert_eq!(meta.all_fields()["Team"], "customfield_2");
    }

    #[test]
    fn unique_names_are_not_ambiguous() {
        assert!(bug_meta().ambiguous_names().is_empty());
    }

    #[test]
    fn edit_meta_shares_the_indexer() {
        let meta = EditMetaInfo::from_value(&json!({
            "fields": {
                "summary": {"required": true, "name": "Summary"},
                "labels": {"required": false, "name": "Labels"}
            }
        }))
        .unwrap();

        assert_eq!(meta.mandatory_fields().len(), 1);
        assert_eq!(meta.all_fields().len(), 2);
        assert_eq!(meta.field("labels").map(|f| f.name.as_str()), Some("Labels"));
    }
}
