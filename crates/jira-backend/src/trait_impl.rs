//! Implementation of the fieldmeta-core transport seam for JiraClient

use fieldmeta_core::{CreateMetaQuery, MetaSource};
use serde_json::Value;

use crate::client::JiraClient;
use crate::error::JiraError;

impl MetaSource for JiraClient {
    type Error = JiraError;

    fn create_meta(&self, query: &CreateMetaQuery) -> Result<Value, JiraError> {
        self.get_create_meta(query)
    }

    fn edit_meta(&self, issue_key: &str) -> Result<Value, JiraError> {
        self.get_edit_meta(issue_key)
    }

    fn create_meta_issue_types(&self, project_key: &str) -> Result<Value, JiraError> {
        self.get_create_meta_issue_types(project_key)
    }

    fn create_meta_fields(&self, project_key: &str, issue_type_id: &str) -> Result<Value, JiraError> {
        self.get_create_meta_fields(project_key, issue_type_id)
    }
}
