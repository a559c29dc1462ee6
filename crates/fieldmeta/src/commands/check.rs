//! Completeness check command handler

use crate::cli::{OutputFormat, Target};
use crate::commands::{load_issue_type, Selection};
use crate::config::Config;
use crate::output::output_json;
use anyhow::{Context, Result};
use colored::Colorize;
use fieldmeta_core::{CompletenessCheck, MetaSource};
use serde_json::{json, Map, Value};

/// A `--field` argument split into name and optional value
#[derive(Debug, PartialEq)]
struct FieldArg {
    name: String,
    value: Option<Value>,
}

impl FieldArg {
    /// Parse `NAME` or `NAME=VALUE`; values that are valid JSON are taken as
    /// JSON, anything else as a string
    fn parse(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((name, raw)) => Self {
                name: name.trim().to_string(),
                value: Some(
                    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
                ),
            },
            None => Self {
                name: arg.trim().to_string(),
                value: None,
            },
        }
    }
}

pub fn handle_check<S: MetaSource>(
    source: &S,
    config: &Config,
    target: &Target,
    fields: &[String],
    format: OutputFormat,
) -> Result<()> {
    let selection = Selection::resolve(target, config)?;
    let (project_key, issue_type) = load_issue_type(source, &selection)?;

    let args: Vec<FieldArg> = fields.iter().map(|f| FieldArg::parse(f)).collect();
    let names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();

    if let Err(err) = issue_type.check_complete_and_available(&names) {
        if format == OutputFormat::Json {
            output_json(&json!({
                "complete": false,
                "project": project_key,
                "issueType": issue_type.name,
                "missingRequired": err.missing_required,
                "unknown": err.unknown,
            }));
        }
        return Err(err).with_context(|| {
            format!(
                "Fields do not fit {} / {}",
                project_key, issue_type.name
            )
        });
    }

    // Only build the request fields when every argument carried a value
    let values: Option<Map<String, Value>> = args
        .into_iter()
        .map(|a| a.value.map(|v| (a.name, v)))
        .collect();
    let resolved = match values {
        Some(values) if !values.is_empty() => Some(issue_type.resolve_fields(&values)?),
        _ => None,
    };

    match format {
        OutputFormat::Json => {
            let mut verdict = json!({
                "complete": true,
                "project": project_key,
                "issueType": issue_type.name,
            });
            if let Some(resolved) = resolved {
                verdict["fields"] = Value::Object(resolved);
            }
            output_json(&verdict);
        }
        OutputFormat::Text => {
            println!(
                "{} Fields are complete for {} / {}",
                "✓".green().bold(),
                project_key.cyan(),
                issue_type.name.white().bold()
            );
            if let Some(resolved) = resolved {
                let body = json!({ "fields": resolved });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_only() {
        assert_eq!(
            FieldArg::parse("Epic Link"),
            FieldArg {
                name: "Epic Link".into(),
                value: None
            }
        );
    }

    #[test]
    fn parse_string_and_json_values() {
        assert_eq!(
            FieldArg::parse("Summary=Disk full").value,
            Some(Value::String("Disk full".into()))
        );
        assert_eq!(FieldArg::parse("Story Points=3").value, Some(json!(3)));
        assert_eq!(
            FieldArg::parse(r#"Labels=["infra","db"]"#).value,
            Some(json!(["infra", "db"]))
        );
    }

    #[test]
    fn parse_keeps_equals_in_value() {
        let arg = FieldArg::parse("Description=a=b");
        assert_eq!(arg.name, "Description");
        assert_eq!(arg.value, Some(Value::String("a=b".into())));
    }
}
