//! Field table command handlers

use crate::cli::{OutputFormat, Target};
use crate::commands::{available, load_issue_type, Selection};
use crate::config::Config;
use crate::output::{output_list, FieldRow, IssueTypeRow};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use fieldmeta_core::{
    fetch_edit_meta, fetch_issue_type_fields, fetch_issue_types, find_issue_type_by_name,
    FieldSchema, MetaSource,
};

/// How `fields` finds the issue type
pub enum Lookup<'a> {
    /// Expanded create metadata filtered to the selection
    CreateMeta,
    /// Per-issue-type listing; the id is looked up by name when not given
    PerIssueType { issue_type_id: Option<&'a str> },
}

pub fn handle_fields<S: MetaSource>(
    source: &S,
    config: &Config,
    target: &Target,
    lookup: Lookup<'_>,
    required_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let selection = Selection::resolve(target, config)?;

    let Lookup::PerIssueType { issue_type_id } = lookup else {
        let (_, issue_type) = load_issue_type(source, &selection)?;
        return print_fields(&issue_type, required_only, format);
    };

    let (id, name) = match issue_type_id {
        Some(id) => (
            id.to_string(),
            selection.issue_type.clone().unwrap_or_else(|| id.to_string()),
        ),
        None => {
            let wanted = selection.issue_type()?;
            let issue_types = fetch_issue_types(source, &selection.project).with_context(|| {
                format!("Failed to fetch issue types of project '{}'", selection.project)
            })?;
            let found = find_issue_type_by_name(&issue_types, wanted).ok_or_else(|| {
                anyhow!(
                    "Issue type '{}' not found in project {}. Available: {}",
                    wanted,
                    selection.project,
                    available(&issue_types)
                )
            })?;
            (found.id.clone(), found.name.clone())
        }
    };

    let meta = fetch_issue_type_fields(source, &selection.project, &id, &name).with_context(|| {
        format!(
            "Failed to fetch fields of issue type {} in project '{}'",
            id, selection.project
        )
    })?;
    print_fields(&meta, required_only, format)
}

pub fn handle_issue_types<S: MetaSource>(
    source: &S,
    config: &Config,
    project: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let project = project
        .map(str::to_string)
        .or_else(|| config.project.clone())
        .ok_or_else(|| anyhow!("No project given. Use --project or set 'project' in config"))?;

    let issue_types = fetch_issue_types(source, &project)
        .with_context(|| format!("Failed to fetch issue types of project '{}'", project))?;
    let rows: Vec<IssueTypeRow> = issue_types.iter().map(IssueTypeRow::from).collect();

    if rows.is_empty() && format == OutputFormat::Text {
        println!("No issue types.");
        return Ok(());
    }
    output_list(&rows, format);
    Ok(())
}

pub fn handle_edit_fields<S: MetaSource>(
    source: &S,
    issue: &str,
    required_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let meta = fetch_edit_meta(source, issue)
        .with_context(|| format!("Failed to fetch edit metadata for {}", issue))?;
    print_fields(&meta, required_only, format)
}

fn print_fields(schema: &dyn FieldSchema, required_only: bool, format: OutputFormat) -> Result<()> {
    let rows: Vec<FieldRow> = schema
        .fields()
        .iter()
        .filter(|f| !required_only || f.required)
        .map(FieldRow::from)
        .collect();

    if rows.is_empty() && format == OutputFormat::Text {
        println!("No fields.");
        return Ok(());
    }
    output_list(&rows, format);

    if format == OutputFormat::Text {
        for (name, keys) in schema.ambiguous_names() {
            eprintln!(
                "{}: '{}' is used by {}; lookups by name resolve to {}",
                "Warning".yellow().bold(),
                name,
                keys.join(", "),
                keys.last().map(String::as_str).unwrap_or_default()
            );
        }
    }
    Ok(())
}
