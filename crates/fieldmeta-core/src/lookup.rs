//! Case-insensitive lookups over create metadata.
//!
//! Project and issue type names are not guaranteed unique, so every lookup
//! returns the first match in response order.

use crate::models::{IssueTypeMetadata, MetaInfo, ProjectMetadata};

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// First issue type in `issue_types` whose name matches, ignoring case
pub fn find_issue_type_by_name<'a>(
    issue_types: &'a [IssueTypeMetadata],
    name: &str,
) -> Option<&'a IssueTypeMetadata> {
    issue_types.iter().find(|t| eq_ignore_case(&t.name, name))
}

impl MetaInfo {
    /// First project whose name matches, ignoring case
    pub fn project_by_name(&self, name: &str) -> Option<&ProjectMetadata> {
        self.projects.iter().find(|p| eq_ignore_case(&p.name, name))
    }

    /// First project whose key matches, ignoring case
    pub fn project_by_key(&self, key: &str) -> Option<&ProjectMetadata> {
        self.projects.iter().find(|p| eq_ignore_case(&p.key, key))
    }

    /// Project by key, falling back to name
    pub fn project(&self, key_or_name: &str) -> Option<&ProjectMetadata> {
        self.project_by_key(key_or_name)
            .or_else(|| self.project_by_name(key_or_name))
    }
}

impl ProjectMetadata {
    /// First issue type whose name matches, ignoring case
    pub fn issue_type_by_name(&self, name: &str) -> Option<&IssueTypeMetadata> {
        find_issue_type_by_name(&self.issue_types, name)
    }
}
