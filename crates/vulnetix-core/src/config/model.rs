use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ci::CiContext;
use crate::config::error::ConfigError;
use crate::release::gate::{self, ReleaseError};
use crate::release::naming::ArtifactNaming;

/// Default minutes to wait for sibling-job artifacts.
pub const DEFAULT_WORKFLOW_TIMEOUT: i64 = 30;

/// Task selected for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Vulnerability scanning.
    #[default]
    Scan,
    /// Release readiness assessment.
    Release,
    Report,
    Triage,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Release => "release",
            Self::Report => "report",
            Self::Triage => "triage",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The empty string selects the default task (`scan`).
impl FromStr for TaskType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "scan" => Ok(Self::Scan),
            "release" => Ok(Self::Release),
            "report" => Ok(Self::Report),
            "triage" => Ok(Self::Triage),
            other => Err(ConfigError::UnsupportedTask(other.to_string())),
        }
    }
}

/// Artifact format declared for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolFormat {
    #[serde(rename = "SARIF")]
    Sarif,
    #[serde(rename = "SBOM")]
    Sbom,
    #[serde(rename = "CSAF_VEX")]
    CsafVex,
    #[serde(rename = "OpenVEX")]
    OpenVex,
    #[serde(rename = "CycloneDX_VEX")]
    CycloneDxVex,
    #[serde(rename = "VDR")]
    Vdr,
    #[serde(rename = "PLAIN_JSON")]
    PlainJson,
    #[serde(rename = "PLAIN_XML")]
    PlainXml,
    #[serde(rename = "BLOB")]
    Blob,
}

impl ToolFormat {
    pub const ALL: [ToolFormat; 9] = [
        Self::Sarif,
        Self::Sbom,
        Self::CsafVex,
        Self::OpenVex,
        Self::CycloneDxVex,
        Self::Vdr,
        Self::PlainJson,
        Self::PlainXml,
        Self::Blob,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sarif => "SARIF",
            Self::Sbom => "SBOM",
            Self::CsafVex => "CSAF_VEX",
            Self::OpenVex => "OpenVEX",
            Self::CycloneDxVex => "CycloneDX_VEX",
            Self::Vdr => "VDR",
            Self::PlainJson => "PLAIN_JSON",
            Self::PlainXml => "PLAIN_XML",
            Self::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ToolFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedFormat(s.to_string()))
    }
}

/// One external scanner and the artifact it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub category: String,
    pub artifact_name: String,
    pub format: ToolFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_identifier: Option<String>,
}

/// Release readiness settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    pub production_branch: String,
    pub release_branch: String,
    /// Minutes. Non-positive values are reset by the release gate.
    #[serde(rename = "workflow_timeout_minutes")]
    pub workflow_timeout: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_formats: Vec<ToolFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tool_count: Option<usize>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            production_branch: "main".to_string(),
            release_branch: String::new(),
            workflow_timeout: DEFAULT_WORKFLOW_TIMEOUT,
            required_formats: Vec::new(),
            min_tool_count: None,
        }
    }
}

/// Complete configuration for one invocation.
///
/// Built once at the entry point and passed explicitly to every component
/// that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnetixConfig {
    pub org_id: Uuid,
    pub task: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    pub release: ReleaseConfig,
    pub ci: CiContext,
    pub version: String,
}

impl VulnetixConfig {
    pub fn new(org_id: Uuid, task: TaskType, ci: CiContext, version: impl Into<String>) -> Self {
        Self {
            org_id,
            task,
            project_name: None,
            product_name: None,
            team_name: None,
            group_name: None,
            tags: Vec::new(),
            tools: Vec::new(),
            release: ReleaseConfig::default(),
            ci,
            version: version.into(),
        }
    }

    pub fn is_release_task(&self) -> bool {
        self.task == TaskType::Release
    }

    /// Check release prerequisites. A no-op for every task but `release`.
    ///
    /// May backfill the default workflow timeout.
    pub fn validate_release_readiness(&mut self) -> Result<(), ReleaseError> {
        gate::evaluate(self.task, &mut self.release, &self.ci)
    }

    /// Artifact naming convention for this run.
    pub fn artifact_naming(&self) -> ArtifactNaming {
        ArtifactNaming::from_context(&self.ci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_parsing() {
        assert_eq!("scan".parse::<TaskType>(), Ok(TaskType::Scan));
        assert_eq!("release".parse::<TaskType>(), Ok(TaskType::Release));
        assert_eq!("report".parse::<TaskType>(), Ok(TaskType::Report));
        assert_eq!("triage".parse::<TaskType>(), Ok(TaskType::Triage));
        assert_eq!("".parse::<TaskType>(), Ok(TaskType::Scan));
    }

    #[test]
    fn unsupported_task_lists_supported_ones() {
        let err = "deploy".parse::<TaskType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported task: deploy. Supported tasks: scan, release, report, triage"
        );
    }

    #[test]
    fn tool_format_uses_declared_spelling() {
        assert_eq!("CycloneDX_VEX".parse::<ToolFormat>(), Ok(ToolFormat::CycloneDxVex));
        assert_eq!("OpenVEX".parse::<ToolFormat>(), Ok(ToolFormat::OpenVex));
        assert!("sarif".parse::<ToolFormat>().is_err());

        let json = serde_json::to_string(&ToolFormat::PlainJson).unwrap();
        assert_eq!(json, "\"PLAIN_JSON\"");
    }

    #[test]
    fn release_config_defaults() {
        let cfg = ReleaseConfig::default();
        assert_eq!(cfg.production_branch, "main");
        assert_eq!(cfg.release_branch, "");
        assert_eq!(cfg.workflow_timeout, DEFAULT_WORKFLOW_TIMEOUT);
        assert!(cfg.required_formats.is_empty());
    }
}
