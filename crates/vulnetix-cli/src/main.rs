use std::fs;
use std::io::{IsTerminal, Read};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};

use vulnetix_core::VERSION;
use vulnetix_core::ci::{ProcessEnv, load_context};
use vulnetix_core::config::{
    ReleaseConfig, TaskType, VulnetixConfig, parse_formats, parse_org_id, parse_tags, parse_tools,
};
use vulnetix_core::release::{self, SiblingJobsContext};
use vulnetix_core::report::{self, render_assessment, render_config_summary, render_validation};
use vulnetix_core::sarif::DualValidator;
use vulnetix_core::upload::{UploadConfig, Uploader};

mod args;
mod telemetry;

use args::{Cli, Command, OutputFormat, SarifArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json, telemetry::level_for(cli.verbose));

    match &cli.command {
        Some(Command::Version) => {
            println!("Vulnetix CLI v{VERSION}");
            Ok(())
        }
        Some(Command::Sarif(sarif)) => run_sarif(&cli, sarif),
        None => run_task(&cli),
    }
}

fn build_config(cli: &Cli) -> Result<VulnetixConfig> {
    let org_id = parse_org_id(cli.org_id.as_deref())?;
    let task: TaskType = cli.task.parse()?;
    let ci = load_context(&ProcessEnv, VERSION);

    let mut cfg = VulnetixConfig::new(org_id, task, ci, VERSION);
    cfg.project_name = cli.project_name.clone();
    cfg.product_name = cli.product_name.clone();
    cfg.team_name = cli.team_name.clone();
    cfg.group_name = cli.group_name.clone();
    cfg.tags = cli.tags.as_deref().map(parse_tags).unwrap_or_default();
    cfg.tools = parse_tools(cli.tools.as_deref().unwrap_or_default())?;
    cfg.release = ReleaseConfig {
        production_branch: cli.production_branch.clone(),
        release_branch: cli.release_branch.clone(),
        workflow_timeout: cli.workflow_timeout,
        required_formats: parse_formats(cli.required_formats.as_deref().unwrap_or_default())?,
        min_tool_count: cli.min_tool_count,
    };
    Ok(cfg)
}

fn run_task(cli: &Cli) -> Result<()> {
    let mut cfg = build_config(cli)?;

    cfg.validate_release_readiness()
        .context("release configuration error")?;

    print!("{}", render_config_summary(&cfg));
    println!("Vulnetix CLI v{VERSION}");
    println!("Organization ID: {}", cfg.org_id);
    println!("Task: {}", cfg.task);

    match cfg.task {
        TaskType::Release => run_release(cli, &cfg)?,
        other => info!(task = %other, org_id = %cfg.org_id, "task recorded"),
    }

    println!(
        "View results at: {}",
        report::dashboard_url(&cfg.org_id, None)
    );
    Ok(())
}

fn run_release(cli: &Cli, cfg: &VulnetixConfig) -> Result<()> {
    let sibling = SiblingJobsContext::new(&cfg.ci, &cfg.release);
    println!("Artifact pattern: {}", sibling.artifact_pattern);
    debug!(context = ?sibling, "sibling job context");

    let has_criteria =
        cfg.release.min_tool_count.is_some() || !cfg.release.required_formats.is_empty();
    if cfg.tools.is_empty() && !has_criteria {
        println!("No tools declared; skipping artifact validation");
        return Ok(());
    }

    let assessment = release::assess(&cfg.tools, &cli.artifacts_dir, &cfg.release);
    print!("{}", render_assessment(&assessment));

    if !assessment.is_ready() {
        bail!(
            "release readiness validation failed: {} violation(s)",
            assessment.violations.len()
        );
    }
    Ok(())
}

fn read_sarif_input(sarif: &SarifArgs) -> Result<Vec<u8>> {
    let data = match &sarif.file {
        Some(path) => fs::read(path)
            .with_context(|| format!("failed to open SARIF file {}", path.display()))?,
        None => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                bail!("no SARIF data provided. Use --file or pipe/redirect input");
            }
            let mut buf = Vec::new();
            stdin
                .read_to_end(&mut buf)
                .context("failed to read from stdin")?;
            buf
        }
    };

    if data.is_empty() {
        bail!("no SARIF data provided");
    }
    Ok(data)
}

fn run_sarif(cli: &Cli, sarif: &SarifArgs) -> Result<()> {
    let org_id = if sarif.dry_run {
        None
    } else {
        Some(parse_org_id(cli.org_id.as_deref())?)
    };

    let data = read_sarif_input(sarif)?;
    let validation = DualValidator::new().validate(&data);

    let Some(org_id) = org_id.filter(|_| validation.valid) else {
        match sarif.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&validation)?),
            OutputFormat::Text => print!("{}", render_validation(&validation)),
        }
        if !validation.valid {
            bail!("SARIF validation failed");
        }
        return Ok(());
    };

    let config = UploadConfig::new(sarif.base_url.clone(), org_id)
        .with_timeout(Duration::from_secs(sarif.timeout));
    let uploader = Uploader::new(config)?;

    if let OutputFormat::Text = sarif.format {
        print!("{}", render_validation(&validation));
        println!("Uploading SARIF to {}...", sarif.base_url);
    }

    let receipt = uploader
        .upload_validated(&data, &validation)
        .context("upload failed")?;
    let url = report::dashboard_url(&org_id, Some(&receipt.artifact_id));

    match sarif.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "validation": validation,
                "upload": receipt,
                "dashboardUrl": url,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("SARIF uploaded successfully");
            println!("Artifact UUID: {}", receipt.artifact_id);
            println!("View at: {url}");
        }
    }
    Ok(())
}
