pub mod check;
pub mod field;
pub mod project;

use anyhow::{anyhow, Context, Result};
use fieldmeta_core::{
    fetch_create_meta, CreateMetaQuery, IssueTypeMetadata, MetaInfo, MetaSource,
};
use tracing::debug;

use crate::cli::Target;
use crate::config::Config;

/// Project key or name and issue type name, after applying config defaults
pub struct Selection {
    pub project: String,
    pub issue_type: Option<String>,
}

impl Selection {
    pub fn resolve(target: &Target, config: &Config) -> Result<Self> {
        let project = target
            .project
            .clone()
            .or_else(|| config.project.clone())
            .ok_or_else(|| anyhow!("No project given. Use --project or set 'project' in config"))?;
        let issue_type = target
            .issue_type
            .clone()
            .or_else(|| config.issue_type.clone());
        Ok(Self {
            project,
            issue_type,
        })
    }

    /// The selected issue type name, for commands that cannot do without one
    pub fn issue_type(&self) -> Result<&str> {
        self.issue_type.as_deref().ok_or_else(|| {
            anyhow!("No issue type given. Use --issue-type or set 'issue_type' in config")
        })
    }
}

pub fn fetch_meta<S: MetaSource>(
    source: &S,
    query: &CreateMetaQuery,
    project: &str,
) -> Result<MetaInfo> {
    fetch_create_meta(source, query)
        .with_context(|| format!("Failed to fetch create metadata for project '{}'", project))
}

/// Fetch the selected issue type together with the key of its project.
///
/// The server filters `projectKeys` and `issuetypeNames` by exact value, so
/// a project name or a differently cased issue type finds nothing there.
/// In that case the metadata is fetched again without filters and matched
/// locally.
pub fn load_issue_type<S: MetaSource>(
    source: &S,
    selection: &Selection,
) -> Result<(String, IssueTypeMetadata)> {
    let wanted = selection.issue_type()?;

    let query = CreateMetaQuery::for_project(&selection.project).issue_type_name(wanted);
    let meta = fetch_meta(source, &query, &selection.project)?;
    if let Ok((key, issue_type)) = find_issue_type(&meta, &selection.project, wanted) {
        return Ok((key.to_string(), issue_type.clone()));
    }

    debug!(
        project = %selection.project,
        issue_type = wanted,
        "no match in filtered create metadata, fetching unfiltered"
    );
    let meta = fetch_meta(source, &CreateMetaQuery::default(), &selection.project)?;
    let (key, issue_type) = find_issue_type(&meta, &selection.project, wanted)?;
    Ok((key.to_string(), issue_type.clone()))
}

/// Find an issue type in fetched metadata
fn find_issue_type<'a>(
    meta: &'a MetaInfo,
    project: &str,
    issue_type: &str,
) -> Result<(&'a str, &'a IssueTypeMetadata)> {
    let found = meta
        .project(project)
        .ok_or_else(|| anyhow!("Project '{}' not found", project))?;
    let issue_type = found.issue_type_by_name(issue_type).ok_or_else(|| {
        anyhow!(
            "Issue type '{}' not found in project {}. Available: {}",
            issue_type,
            found.key,
            available(&found.issue_types)
        )
    })?;
    Ok((found.key.as_str(), issue_type))
}

/// Comma-separated issue type names for error messages
pub fn available(issue_types: &[IssueTypeMetadata]) -> String {
    issue_types
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
