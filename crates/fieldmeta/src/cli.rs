use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fieldmeta",
    version,
    about = "Inspect and check Jira create/edit field metadata"
)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML config file
    #[arg(long, env = "FIELDMETA_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Jira instance URL (overrides config file)
    #[arg(long, env = "FIELDMETA_URL", global = true)]
    pub url: Option<String>,

    /// Username for Basic Auth; without it the token is sent as a Bearer token
    #[arg(long, env = "FIELDMETA_USER", global = true)]
    pub user: Option<String>,

    /// API token, password or personal access token (overrides config file)
    #[arg(long, env = "FIELDMETA_TOKEN", global = true)]
    pub token: Option<String>,

    /// Read the metadata document from a JSON file instead of the server
    #[arg(long, short = 'i', global = true, value_name = "PATH")]
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum ColorChoice {
    /// Colorize output if stdout is a terminal
    #[default]
    Auto,
    /// Always colorize output
    Always,
    /// Never colorize output
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List projects and the issue types they offer
    #[command(visible_alias = "p")]
    Projects {
        /// Only show this project (key or name)
        #[arg(long, short = 'p')]
        project: Option<String>,
    },
    /// Show the name -> key table of an issue type
    #[command(visible_alias = "f")]
    Fields {
        #[command(flatten)]
        target: Target,

        /// Read the per-issue-type field listing instead of the expanded
        /// create metadata; the issue type id is looked up by name
        #[arg(long)]
        per_issue_type: bool,

        /// Issue type id for the per-issue-type listing (implies
        /// --per-issue-type; --issue-type then only labels the output)
        #[arg(long, value_name = "ID")]
        issue_type_id: Option<String>,

        /// Only show required fields
        #[arg(long, short = 'r')]
        required: bool,
    },
    /// List the issue types a project offers, with their ids
    #[command(visible_alias = "t")]
    IssueTypes {
        /// Project key
        #[arg(long, short = 'p')]
        project: Option<String>,
    },
    /// Check that a set of fields is complete and available for an issue type
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        target: Target,

        /// Field to include, as NAME or NAME=VALUE (repeatable). When values
        /// are given, the request fields keyed by field key are printed.
        #[arg(long = "field", short = 'f', value_name = "NAME[=VALUE]")]
        fields: Vec<String>,
    },
    /// Show the fields that can be edited on an existing issue
    EditFields {
        /// Issue key (e.g., OPS-42)
        issue: String,

        /// Only show required fields
        #[arg(long, short = 'r')]
        required: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Project and issue type selection; falls back to the configured defaults
#[derive(clap::Args, Debug, Clone)]
pub struct Target {
    /// Project key or name
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Issue type name (e.g., Bug)
    #[arg(long, short = 't')]
    pub issue_type: Option<String>,
}

impl Cli {
    /// Generate shell completions and write to stdout
    pub fn generate_completions(shell: Shell) {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "fieldmeta", &mut std::io::stdout());
    }
}
