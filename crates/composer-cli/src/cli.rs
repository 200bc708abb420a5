//! Argument parsing
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use composer_core::domain::DEFAULT_PASS_THRESHOLD;
use composer_core::ExportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "composer",
    version,
    about = "Research, draft, score and export articles through an automation backend",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// YAML file with backend settings; environment variables are used otherwise
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the whole wizard and write the exported article
    Run(RunArgs),
    /// Check links and sort them into valid, invalid and competitor
    ValidateLinks(ValidateLinksArgs),
    /// Show the backend status of an execution
    Status(ExecutionArgs),
    /// Ask the backend to cancel an execution
    Cancel(ExecutionArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Research question or keywords
    #[arg(long)]
    pub query: String,

    /// Use simulated steps only; no backend needed
    #[arg(long, conflicts_with = "fallback")]
    pub simulate: bool,

    /// Simulate any step the backend fails
    #[arg(long)]
    pub fallback: bool,

    /// Use the deep-research workflow instead of plain research
    #[arg(long)]
    pub deep: bool,

    /// Score and refine at the draft step
    #[arg(long)]
    pub fold_scoring: bool,

    #[arg(long, value_enum, default_value_t = FormatArg::Md)]
    pub format: FormatArg,

    /// Output path; defaults to the artifact's file name
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Keep every source without probing its link
    #[arg(long)]
    pub skip_link_check: bool,

    /// Minimum score every quality metric must reach before export
    #[arg(long, default_value_t = DEFAULT_PASS_THRESHOLD)]
    pub threshold: f64,

    /// Duration of each simulated step in milliseconds
    #[arg(long, value_name = "MS")]
    pub simulation_ms: Option<u64>,

    /// Wait this long for the backend's completion event after each live step
    #[arg(long, default_value_t = 0, value_name = "MS")]
    pub progress_wait_ms: u64,
}

#[derive(Args, Debug)]
pub struct ValidateLinksArgs {
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Check syntax and blocklist only
    #[arg(long)]
    pub offline: bool,

    /// Pause between probes
    #[arg(long, default_value_t = 0, value_name = "MS")]
    pub delay_ms: u64,

    /// Additional competitor domain; repeatable
    #[arg(long = "competitor", value_name = "DOMAIN")]
    pub competitors: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExecutionArgs {
    #[arg(value_name = "EXECUTION_ID")]
    pub execution_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Md,
    Html,
    Pdf,
    Docx,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Md => ExportFormat::Markdown,
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Docx => ExportFormat::Docx,
        }
    }
}
