mod cli;
mod color;
mod commands;
mod config;
mod output;
mod source;

use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use commands::field::Lookup;
use config::Config;
use fieldmeta_core::MetaSource;
use jira_backend::JiraClient;
use output::output_error;
use source::FileSource;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    color::init(cli.color);

    if let Err(e) = run(&cli) {
        output_error(&e, cli.format);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let format = cli.format;
    if let Commands::Completions { shell } = &cli.command {
        Cli::generate_completions(*shell);
        return Ok(());
    }

    let mut config = Config::load(cli.config.clone())?;
    config.merge_with_cli(cli.url.clone(), cli.user.clone(), cli.token.clone());

    if let Some(path) = &cli.input {
        return run_with_source(&FileSource::new(path), &config, cli, format);
    }

    config.validate()?;
    let (Some(url), Some(token)) = (config.url.as_deref(), config.token.as_deref()) else {
        return Err(anyhow!("Jira URL and token are required"));
    };
    let client = match config.user.as_deref() {
        Some(user) => JiraClient::new(url, user, token),
        None => JiraClient::with_token(url, token),
    };
    run_with_source(&client, &config, cli, format)
}

/// Run commands against any metadata source
fn run_with_source<S: MetaSource>(
    source: &S,
    config: &Config,
    cli: &Cli,
    format: OutputFormat,
) -> Result<()> {
    match &cli.command {
        Commands::Projects { project } => {
            commands::project::handle_projects(source, project.as_deref(), format)
        }
        Commands::Fields {
            target,
            per_issue_type,
            issue_type_id,
            required,
        } => {
            let lookup = if *per_issue_type || issue_type_id.is_some() {
                Lookup::PerIssueType {
                    issue_type_id: issue_type_id.as_deref(),
                }
            } else {
                Lookup::CreateMeta
            };
            commands::field::handle_fields(source, config, target, lookup, *required, format)
        }
        Commands::IssueTypes { project } => {
            commands::field::handle_issue_types(source, config, project.as_deref(), format)
        }
        Commands::Check { target, fields } => {
            commands::check::handle_check(source, config, target, fields, format)
        }
        Commands::EditFields { issue, required } => {
            commands::field::handle_edit_fields(source, issue, *required, format)
        }
        Commands::Completions { .. } => Ok(()),
    }
}
