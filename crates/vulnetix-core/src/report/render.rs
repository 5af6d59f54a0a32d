use uuid::Uuid;

use crate::config::VulnetixConfig;
use crate::release::{ArtifactStatus, ReleaseAssessment};
use crate::sarif::EnhancedValidationResult;

pub const DASHBOARD_URL: &str = "https://dashboard.vulnetix.com";

/// Dashboard link for an organization, or for one uploaded artifact.
pub fn dashboard_url(org_id: &Uuid, artifact_id: Option<&str>) -> String {
    match artifact_id {
        Some(id) => format!("{DASHBOARD_URL}/org/{org_id}/artifacts/{id}"),
        None => format!("{DASHBOARD_URL}/org/{org_id}"),
    }
}

pub fn render_validation(result: &EnhancedValidationResult) -> String {
    let mut out = String::new();
    if result.valid {
        out.push_str("SARIF validation successful\n");
    } else {
        out.push_str(&format!(
            "SARIF validation failed ({})\n",
            result.failed_passes().join(", ")
        ));
        for e in result.all_errors() {
            out.push_str(&format!("  - {e}\n"));
        }
    }

    let stats = result.stats();
    out.push_str(&format!("Version: {}\n", result.version()));
    out.push_str(&format!("Runs: {}\n", stats.run_count));
    out.push_str(&format!("Results: {}\n", stats.result_count));
    out.push_str(&format!("Tools: {}\n", stats.tool_count));
    out.push_str(&format!("Cross-check: {}\n", result.cross_check));
    out
}

pub fn render_config_summary(cfg: &VulnetixConfig) -> String {
    let mut out = String::new();
    out.push_str("Configuration Summary:\n");
    out.push_str(&format!("  Platform: {}\n", cfg.ci.platform));
    out.push_str(&format!("  Repository: {}\n", cfg.ci.repository));
    out.push_str(&format!("  Run ID: {}\n", cfg.ci.run_id));
    out.push_str(&format!("  Task: {}\n", cfg.task));

    let named = [
        ("Project", &cfg.project_name),
        ("Product", &cfg.product_name),
        ("Team", &cfg.team_name),
        ("Group", &cfg.group_name),
    ];
    for (label, value) in named {
        if let Some(v) = value {
            out.push_str(&format!("  {label}: {v}\n"));
        }
    }

    if !cfg.tags.is_empty() {
        out.push_str(&format!("  Tags: {}\n", cfg.tags.join(", ")));
    }

    if !cfg.tools.is_empty() {
        out.push_str(&format!("  Tools: {} configured\n", cfg.tools.len()));
        for t in &cfg.tools {
            out.push_str(&format!(
                "    - {} ({}): {}\n",
                t.category, t.format, t.artifact_name
            ));
        }
    }

    if cfg.is_release_task() {
        out.push_str(&format!(
            "  Release Branch: {}\n",
            cfg.release.release_branch
        ));
        out.push_str(&format!(
            "  Production Branch: {}\n",
            cfg.release.production_branch
        ));
    }

    out.push_str(&format!(
        "  Features: {}\n",
        cfg.ci.detected_features.join(", ")
    ));
    out
}

pub fn render_assessment(assessment: &ReleaseAssessment) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Release artifacts: {} declared, {} accepted\n",
        assessment.artifacts.len(),
        assessment.accepted().count()
    ));

    for a in &assessment.artifacts {
        let status = match a.status {
            ArtifactStatus::Valid => "valid",
            ArtifactStatus::Skipped => "skipped",
            ArtifactStatus::Invalid => "invalid",
            ArtifactStatus::Missing => "missing",
        };
        out.push_str(&format!(
            "  - {} ({}): {} [{status}]\n",
            a.category, a.format, a.artifact_name
        ));
        if let Some(sha) = &a.sha256 {
            out.push_str(&format!("      sha256: {sha}\n"));
        }
        if let Some(stats) = &a.stats {
            out.push_str(&format!(
                "      runs: {}, results: {}, tools: {}\n",
                stats.run_count, stats.result_count, stats.tool_count
            ));
        }
    }

    if assessment.is_ready() {
        out.push_str("Release readiness: ready\n");
    } else {
        out.push_str("Release readiness: blocked\n");
        for v in &assessment.violations {
            out.push_str(&format!("  - {v}\n"));
        }
    }
    out
}
