use crate::cli::OutputFormat;
use colored::Colorize;
use fieldmeta_core::{FieldDefinition, IssueTypeMetadata, ProjectMetadata};
use serde::Serialize;

pub fn output_list<T: Serialize + Displayable>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            for item in items {
                println!("{}", item.display());
            }
        }
    }
}

pub fn output_json<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

#[derive(Serialize)]
pub struct JsonError {
    pub error: bool,
    pub code: String,
    pub message: String,
}

pub fn output_error(err: &anyhow::Error, format: OutputFormat) {
    let message = match format {
        OutputFormat::Json => {
            let json_err = JsonError {
                error: true,
                code: "error".to_string(),
                message: format!("{:#}", err),
            };
            serde_json::to_string_pretty(&json_err).unwrap_or_else(|_| {
                format!(r#"{{"error": true, "message": "{}"}}"#, err)
            })
        }
        OutputFormat::Text => format!("{}: {:#}", "Error".red().bold(), err),
    };
    eprintln!("{}", message);
}

pub trait Displayable {
    fn display(&self) -> String;
}

/// One line of a field table
#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub has_default_value: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl From<&FieldDefinition> for FieldRow {
    fn from(field: &FieldDefinition) -> Self {
        let mut field_type = field.schema.field_type().to_string();
        if let Some(items) = &field.schema.items {
            field_type = format!("{}<{}>", field_type, items);
        }
        Self {
            name: field.name.clone(),
            key: field.key.clone(),
            field_type,
            required: field.required,
            has_default_value: field.has_default_value,
            allowed_values: field
                .allowed_values
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
        }
    }
}

impl Displayable for FieldRow {
    fn display(&self) -> String {
        let name = if self.required {
            format!("{:<30}", self.name).white().bold()
        } else {
            format!("{:<30}", self.name).normal()
        };
        let mut output = format!(
            "{} {:<24} {:<16}",
            name,
            self.key.cyan(),
            self.field_type.dimmed()
        );
        if self.required {
            output.push_str(&format!(" {}", "required".yellow()));
        }
        if self.has_default_value {
            output.push_str(&format!(" {}", "(default)".dimmed()));
        }
        if !self.allowed_values.is_empty() {
            output.push_str(&format!(
                "\n{:>31}{}: {}",
                "",
                "Allowed".dimmed(),
                self.allowed_values.join(", ")
            ));
        }
        output
    }
}

/// Project with the names of its issue types
#[derive(Debug, Serialize)]
pub struct ProjectRow {
    pub id: String,
    pub key: String,
    pub name: String,
    pub issue_types: Vec<String>,
}

impl From<&ProjectMetadata> for ProjectRow {
    fn from(project: &ProjectMetadata) -> Self {
        Self {
            id: project.id.clone(),
            key: project.key.clone(),
            name: project.name.clone(),
            issue_types: project
                .issue_types
                .iter()
                .map(|t| {
                    if t.subtask {
                        format!("{} (subtask)", t.name)
                    } else {
                        t.name.clone()
                    }
                })
                .collect(),
        }
    }
}

impl Displayable for ProjectRow {
    fn display(&self) -> String {
        format!(
            "{} - {} ({})\n  {}: {}",
            self.key.cyan().bold(),
            self.name.white().bold(),
            self.id.dimmed(),
            "Issue types".dimmed(),
            self.issue_types.join(", ")
        )
    }
}

/// Issue type of a project, without its fields
#[derive(Debug, Serialize)]
pub struct IssueTypeRow {
    pub id: String,
    pub name: String,
    pub subtask: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&IssueTypeMetadata> for IssueTypeRow {
    fn from(issue_type: &IssueTypeMetadata) -> Self {
        Self {
            id: issue_type.id.clone(),
            name: issue_type.name.clone(),
            subtask: issue_type.subtask,
            description: issue_type
                .description
                .clone()
                .filter(|d| !d.is_empty()),
        }
    }
}

impl Displayable for IssueTypeRow {
    fn display(&self) -> String {
        let mut output = format!("{:<10} {}", self.id.cyan(), self.name.white().bold());
        if self.subtask {
            output.push_str(&format!(" {}", "(subtask)".dimmed()));
        }
        if let Some(description) = &self.description {
            output.push_str(&format!(" - {}", description.dimmed()));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmeta_core::{EditMetaInfo, FieldSchema};
    use serde_json::json;

    #[test]
    fn field_row_shows_item_type_and_choices() {
        let meta = EditMetaInfo::from_value(&json!({
            "fields": {
                "components": {
                    "required": true,
                    "name": "Component/s",
                    "schema": {"type": "array", "items": "component"},
                    "allowedValues": [{"id": "1", "name": "Backend"}, {"id": "2", "name": "Web"}]
                }
            }
        }))
        .unwrap();

        let row = FieldRow::from(&meta.fields()[0]);
        assert_eq!(row.field_type, "array<component>");
        assert_eq!(row.allowed_values, vec!["Backend", "Web"]);

        colored::control::set_override(false);
        let text = row.display();
        assert!(text.contains("Component/s"));
        assert!(text.contains("required"));
        assert!(text.contains("Backend, Web"));
    }
}
