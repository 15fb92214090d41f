//! CLI argument parsing for the scaffolding workflow.
//!
//! The CLI is intentionally thin: every command maps onto one core operation,
//! and interactive editing is out of scope. Process-level follow-ups (git
//! init, venv creation, dependency install) belong to the caller, which gets
//! the generated path list as its input.
use crate::diagram::DEFAULT_RENDER_ENDPOINT;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "pforge",
    version,
    about = "Configuration-driven project scaffolding and documentation builder",
    after_help = "Commands:\n  list        List registered configurations\n  generate    Generate a project tree from a configuration\n  register    Validate and register a configuration file\n  stub        Print a starter configuration JSON\n  build-docs  Validate requirement docs and build the HTML site\n\nExamples:\n  pforge list --configurations-root configurations\n  pforge generate --config web_app --dest /tmp --project-name Demo\n  pforge register --file my_config.json --force\n  pforge build-docs --docs Docs --offline",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    List(ListArgs),
    Generate(GenerateArgs),
    Register(RegisterArgs),
    Stub(StubArgs),
    BuildDocs(BuildDocsArgs),
}

/// List configurations from the registry index.
#[derive(Parser, Debug)]
#[command(about = "List registered configurations, owner scope first")]
pub struct ListArgs {
    /// Root directory holding index.json and configuration documents
    #[arg(long, value_name = "DIR", default_value = "configurations")]
    pub configurations_root: PathBuf,
}

/// Generate a new project tree from one configuration.
#[derive(Parser, Debug)]
#[command(about = "Generate a project tree from a registered configuration")]
pub struct GenerateArgs {
    /// Root directory holding index.json and configuration documents
    #[arg(long, value_name = "DIR", default_value = "configurations")]
    pub configurations_root: PathBuf,

    /// Root directory holding template artifacts referenced by file rules
    #[arg(long, value_name = "DIR", default_value = "artifacts")]
    pub artifacts_root: PathBuf,

    /// Configuration id to generate
    #[arg(long, value_name = "ID")]
    pub config: String,

    /// Parent directory for the new project
    #[arg(long, value_name = "DIR")]
    pub dest: PathBuf,

    /// Project name; becomes the project folder and the {project_name} placeholder
    #[arg(long, value_name = "NAME")]
    pub project_name: String,

    /// Language code for the {lang} placeholder
    #[arg(long, value_name = "CODE", default_value = "en")]
    pub lang: String,

    /// Folder name for the {lang_folder} placeholder (defaults to --lang)
    #[arg(long, value_name = "NAME")]
    pub lang_folder: Option<String>,
}

/// Register a configuration file into the index under user_generated scope.
#[derive(Parser, Debug)]
#[command(about = "Validate a configuration file and register it in the index")]
pub struct RegisterArgs {
    /// Root directory holding index.json and configuration documents
    #[arg(long, value_name = "DIR", default_value = "configurations")]
    pub configurations_root: PathBuf,

    /// Configuration JSON document to validate and register
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Overwrite an existing user_generated entry with the same id
    #[arg(long)]
    pub force: bool,
}

/// Print a starter configuration for editing.
#[derive(Parser, Debug)]
#[command(about = "Print a starter configuration JSON stub")]
pub struct StubArgs {
    /// Write the stub to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

/// Build the HTML documentation site for a project.
#[derive(Parser, Debug)]
#[command(about = "Validate requirement docs and build the HTML site")]
pub struct BuildDocsArgs {
    /// Docs directory containing requirements/ and architecture/
    #[arg(long, value_name = "DIR", default_value = "Docs")]
    pub docs: PathBuf,

    /// Diagram render endpoint (expects SVG at <endpoint>/<token>)
    #[arg(long, value_name = "URL", default_value = DEFAULT_RENDER_ENDPOINT)]
    pub render_endpoint: String,

    /// Skip diagram rendering entirely and embed text fallbacks
    #[arg(long)]
    pub offline: bool,
}
