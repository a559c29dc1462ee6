use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;
use crate::models::{EditMetaInfo, IssueTypeMetadata, MetaInfo};

/// Expansion that makes create metadata include the field schemas
pub const EXPAND_FIELDS: &str = "projects.issuetypes.fields";

/// Something that can produce raw metadata documents (usually an HTTP client).
///
/// Implementations own transport, authentication and paging; the decoded
/// JSON is handed back untouched.
pub trait MetaSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create metadata for the projects/issue types selected by `query`
    fn create_meta(&self, query: &CreateMetaQuery) -> Result<Value, Self::Error>;

    /// Edit metadata of an existing issue
    fn edit_meta(&self, issue_key: &str) -> Result<Value, Self::Error>;

    /// One page of the issue types a project offers for creation
    fn create_meta_issue_types(&self, project_key: &str) -> Result<Value, Self::Error>;

    /// One page of the field listing of a single issue type
    fn create_meta_fields(
        &self,
        project_key: &str,
        issue_type_id: &str,
    ) -> Result<Value, Self::Error>;
}

/// Filters for the create metadata request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMetaQuery {
    pub project_ids: Vec<String>,
    pub project_keys: Vec<String>,
    pub issue_type_ids: Vec<String>,
    pub issue_type_names: Vec<String>,
    pub expand: Option<String>,
}

impl Default for CreateMetaQuery {
    fn default() -> Self {
        Self {
            project_ids: Vec::new(),
            project_keys: Vec::new(),
            issue_type_ids: Vec::new(),
            issue_type_names: Vec::new(),
            expand: Some(EXPAND_FIELDS.to_string()),
        }
    }
}

impl CreateMetaQuery {
    pub fn for_project(project_key: impl Into<String>) -> Self {
        Self {
            project_keys: vec![project_key.into()],
            ..Self::default()
        }
    }

    pub fn issue_type_name(mut self, name: impl Into<String>) -> Self {
        self.issue_type_names.push(name.into());
        self
    }

    /// Query parameters in the API's comma-separated form; empty filters are
    /// left out
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let lists = [
            ("projectIds", &self.project_ids),
            ("projectKeys", &self.project_keys),
            ("issuetypeIds", &self.issue_type_ids),
            ("issuetypeNames", &self.issue_type_names),
        ];

        let mut pairs: Vec<(&'static str, String)> = lists
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| (name, values.join(",")))
            .collect();
        if let Some(expand) = &self.expand {
            pairs.push(("expand", expand.clone()));
        }
        pairs
    }
}

/// Fetch and decode create metadata
pub fn fetch_create_meta<S: MetaSource + ?Sized>(
    source: &S,
    query: &CreateMetaQuery,
) -> Result<MetaInfo, FetchError<S::Error>> {
    debug!(?query, "fetching create metadata");
    let raw = source.create_meta(query).map_err(FetchError::Transport)?;
    Ok(MetaInfo::from_value(&raw)?)
}

/// Fetch and decode edit metadata of one issue
pub fn fetch_edit_meta<S: MetaSource + ?Sized>(
    source: &S,
    issue_key: &str,
) -> Result<EditMetaInfo, FetchError<S::Error>> {
    debug!(issue = issue_key, "fetching edit metadata");
    let raw = source.edit_meta(issue_key).map_err(FetchError::Transport)?;
    Ok(EditMetaInfo::from_value(&raw)?)
}

/// Fetch and decode the issue types of one project, without their fields
pub fn fetch_issue_types<S: MetaSource + ?Sized>(
    source: &S,
    project_key: &str,
) -> Result<Vec<IssueTypeMetadata>, FetchError<S::Error>> {
    debug!(project = project_key, "fetching issue types");
    let raw = source
        .create_meta_issue_types(project_key)
        .map_err(FetchError::Transport)?;
    Ok(IssueTypeMetadata::list_from_page(&raw)?)
}

/// Fetch and decode the field listing of one issue type
pub fn fetch_issue_type_fields<S: MetaSource + ?Sized>(
    source: &S,
    project_key: &str,
    issue_type_id: &str,
    issue_type_name: &str,
) -> Result<IssueTypeMetadata, FetchError<S::Error>> {
    debug!(
        project = project_key,
        issue_type = issue_type_id,
        "fetching issue type fields"
    );
    let raw = source
        .create_meta_fields(project_key, issue_type_id)
        .map_err(FetchError::Transport)?;
    Ok(IssueTypeMetadata::from_field_page(
        issue_type_id,
        issue_type_name,
        &raw,
    )?)
}
