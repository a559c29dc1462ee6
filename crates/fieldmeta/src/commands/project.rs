use crate::cli::OutputFormat;
use crate::commands::fetch_meta;
use crate::output::{output_list, ProjectRow};
use anyhow::{anyhow, Context, Result};
use fieldmeta_core::{fetch_create_meta, CreateMetaQuery, MetaSource};

pub fn handle_projects<S: MetaSource>(
    source: &S,
    project: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let rows: Vec<ProjectRow> = match project {
        Some(p) => {
            // projectKeys only matches keys exactly; names need the full listing
            let meta = fetch_meta(source, &CreateMetaQuery::for_project(p), p)?;
            let row = match meta.project(p) {
                Some(found) => ProjectRow::from(found),
                None => {
                    let meta = fetch_meta(source, &CreateMetaQuery::default(), p)?;
                    let found = meta
                        .project(p)
                        .ok_or_else(|| anyhow!("Project '{}' not found", p))?;
                    ProjectRow::from(found)
                }
            };
            vec![row]
        }
        None => {
            let meta = fetch_create_meta(source, &CreateMetaQuery::default())
                .context("Failed to fetch create metadata")?;
            meta.projects.iter().map(ProjectRow::from).collect()
        }
    };

    if rows.is_empty() && format == OutputFormat::Text {
        println!("No projects visible.");
        return Ok(());
    }
    output_list(&rows, format);
    Ok(())
}
