use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::model::{ReleaseConfig, Tool, ToolFormat};
use crate::sarif::{DualValidator, Stats};

/// Directories searched, after the root itself, for a declared artifact.
pub const SEARCH_DIRS: [&str; 4] = ["artifacts", "reports", "results", "output"];

/// Bytes of one artifact plus their fingerprint.
#[derive(Debug, Clone)]
pub struct ArtifactContext {
    pub path: PathBuf,

    /// Exact bytes read from disk.
    pub bytes: Vec<u8>,

    pub size_bytes: u64,

    pub hash_alg: String,

    /// Hex-encoded hash of the artifact bytes.
    pub hash_hex: String,
}

/// Read an artifact and fingerprint its bytes.
///
/// The fingerprint depends only on content, not on filesystem metadata.
pub fn read_artifact(path: &Path) -> Result<ArtifactContext> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read artifact: {}", path.display()))?;

    let digest = Sha256::digest(&bytes);

    Ok(ArtifactContext {
        path: path.to_path_buf(),
        size_bytes: bytes.len() as u64,
        bytes,
        hash_alg: "sha256".to_string(),
        hash_hex: hex::encode(digest),
    })
}

/// Every location checked for `name` under `root`, in search order.
pub fn candidate_paths(root: &Path, name: &str) -> Vec<PathBuf> {
    std::iter::once(root.join(name))
        .chain(SEARCH_DIRS.iter().map(|dir| root.join(dir).join(name)))
        .collect()
}

/// First existing file among [`candidate_paths`].
pub fn locate_artifact(root: &Path, name: &str) -> Option<PathBuf> {
    candidate_paths(root, name).into_iter().find(|p| p.is_file())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Valid,
    /// Found, but the format has no content check.
    Skipped,
    Invalid,
    Missing,
}

impl ArtifactStatus {
    /// Found and did not fail.
    pub fn counts_toward_release(&self) -> bool {
        matches!(self, Self::Valid | Self::Skipped)
    }
}

/// Result of checking one declared tool artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactOutcome {
    pub category: String,
    pub artifact_name: String,
    pub format: ToolFormat,
    pub status: ArtifactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sarif_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ArtifactOutcome {
    fn new(tool: &Tool, status: ArtifactStatus) -> Self {
        Self {
            category: tool.category.clone(),
            artifact_name: tool.artifact_name.clone(),
            format: tool.format,
            status,
            path: None,
            size_bytes: None,
            sha256: None,
            sarif_version: None,
            stats: None,
            errors: Vec::new(),
        }
    }

    fn with_artifact(mut self, artifact: &ArtifactContext) -> Self {
        self.path = Some(artifact.path.display().to_string());
        self.size_bytes = Some(artifact.size_bytes);
        self.sha256 = Some(artifact.hash_hex.clone());
        self
    }
}

/// Per-artifact outcomes plus every release violation found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReleaseAssessment {
    pub artifacts: Vec<ArtifactOutcome>,
    pub violations: Vec<String>,
}

impl ReleaseAssessment {
    pub fn is_ready(&self) -> bool {
        self.violations.is_empty()
    }

    /// Artifacts that were found and did not fail.
    pub fn accepted(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts
            .iter()
            .filter(|a| a.status.counts_toward_release())
    }
}

/// Locate, read and check every declared tool artifact under `root`, then
/// apply the release criteria from `release`.
pub fn assess(tools: &[Tool], root: &Path, release: &ReleaseConfig) -> ReleaseAssessment {
    let validator = DualValidator::new();
    let mut assessment = ReleaseAssessment::default();

    if tools.is_empty() {
        warn!("no tools declared for release validation");
    }

    for tool in tools {
        let outcome = assess_tool(&validator, tool, root);
        if outcome.status == ArtifactStatus::Invalid || outcome.status == ArtifactStatus::Missing {
            assessment.violations.extend(outcome.errors.iter().cloned());
        }
        assessment.artifacts.push(outcome);
    }

    apply_criteria(&mut assessment, release);

    if assessment.is_ready() {
        info!(artifacts = assessment.artifacts.len(), "release artifacts accepted");
    } else {
        warn!(
            violations = assessment.violations.len(),
            "release artifacts rejected"
        );
    }
    assessment
}

fn assess_tool(validator: &DualValidator, tool: &Tool, root: &Path) -> ArtifactOutcome {
    let Some(path) = locate_artifact(root, &tool.artifact_name) else {
        let searched = candidate_paths(root, &tool.artifact_name)
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut outcome = ArtifactOutcome::new(tool, ArtifactStatus::Missing);
        outcome.errors.push(format!(
            "Artifact not found: {} (searched in: {searched})",
            tool.artifact_name
        ));
        return outcome;
    };

    let artifact = match read_artifact(&path) {
        Ok(a) => a,
        Err(e) => {
            let mut outcome = ArtifactOutcome::new(tool, ArtifactStatus::Invalid);
            outcome.errors.push(format!("{e:#}"));
            return outcome;
        }
    };
    debug!(
        path = %artifact.path.display(),
        sha256 = %artifact.hash_hex,
        "read release artifact"
    );

    match tool.format {
        ToolFormat::Sarif => {
            let result = validator.validate(&artifact.bytes);
            let status = if result.valid {
                ArtifactStatus::Valid
            } else {
                ArtifactStatus::Invalid
            };
            let mut outcome = ArtifactOutcome::new(tool, status).with_artifact(&artifact);
            outcome.sarif_version = Some(result.version().to_string());
            outcome.stats = Some(result.stats());
            if !result.valid {
                outcome.errors.push(format!(
                    "SARIF validation failed for {}: {}",
                    tool.artifact_name,
                    result.all_errors().join("; ")
                ));
            }
            outcome
        }
        ToolFormat::PlainJson => {
            match serde_json::from_slice::<serde_json::Value>(&artifact.bytes) {
                Ok(_) => ArtifactOutcome::new(tool, ArtifactStatus::Valid).with_artifact(&artifact),
                Err(e) => {
                    let mut outcome =
                        ArtifactOutcome::new(tool, ArtifactStatus::Invalid).with_artifact(&artifact);
                    outcome.errors.push(format!(
                        "JSON validation failed for {}: invalid JSON format: {e}",
                        tool.artifact_name
                    ));
                    outcome
                }
            }
        }
        other => {
            warn!(
                format = %other,
                artifact = %tool.artifact_name,
                "skipping content validation for format"
            );
            ArtifactOutcome::new(tool, ArtifactStatus::Skipped).with_artifact(&artifact)
        }
    }
}

fn apply_criteria(assessment: &mut ReleaseAssessment, release: &ReleaseConfig) {
    let accepted = assessment.accepted().count();

    if let Some(min) = release.min_tool_count {
        if accepted < min {
            assessment.violations.push(format!(
                "release requires at least {min} validated tool artifacts, found {accepted}"
            ));
        }
    }

    for format in &release.required_formats {
        let covered = assessment.accepted().any(|a| a.format == *format);
        if !covered {
            assessment
                .violations
                .push(format!("required format {format} has no validated artifact"));
        }
    }
}
