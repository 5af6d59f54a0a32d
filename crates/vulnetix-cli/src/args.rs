use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "vulnetix",
    version,
    about = "Vulnetix CLI - automate vulnerability triage and remediation"
)]
pub struct Cli {
    /// Organization ID (UUID) for Vulnetix operations
    #[arg(long, global = true, env = "VULNETIX_ORG_ID")]
    pub org_id: Option<String>,

    /// Task to perform: scan, release, report, triage
    #[arg(long, global = true, default_value = "scan")]
    pub task: String,

    /// Project name for vulnerability management context
    #[arg(long, global = true)]
    pub project_name: Option<String>,

    /// Product name for vulnerability management context
    #[arg(long, global = true)]
    pub product_name: Option<String>,

    /// Team responsible for the project
    #[arg(long, global = true)]
    pub team_name: Option<String>,

    /// Group name for organizational hierarchy
    #[arg(long, global = true)]
    pub group_name: Option<String>,

    /// Tags, e.g. '["Public", "Crown Jewels"]' or 'Public,Critical'
    #[arg(long, global = true)]
    pub tags: Option<String>,

    /// YAML list of tool declarations
    #[arg(long, global = true)]
    pub tools: Option<String>,

    /// Production branch (release task)
    #[arg(long, global = true, default_value = "main")]
    pub production_branch: String,

    /// Release branch (release task)
    #[arg(long, global = true, default_value = "")]
    pub release_branch: String,

    /// Minutes to wait for sibling job artifacts (release task)
    #[arg(long, global = true, default_value_t = 30, allow_negative_numbers = true)]
    pub workflow_timeout: i64,

    /// Comma separated formats every release must include, e.g. SARIF,SBOM
    #[arg(long, global = true)]
    pub required_formats: Option<String>,

    /// Minimum number of accepted tool artifacts for a release
    #[arg(long, global = true)]
    pub min_tool_count: Option<usize>,

    /// Directory searched for release artifacts
    #[arg(long, global = true, default_value = ".")]
    pub artifacts_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a SARIF report and upload it
    Sarif(SarifArgs),
    /// Print the CLI version
    Version,
}

#[derive(Debug, Args)]
pub struct SarifArgs {
    /// SARIF file to upload (reads stdin when omitted)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Vulnetix API base URL
    #[arg(long, default_value = vulnetix_core::upload::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upload timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Validation report format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Validate only, do not upload
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
