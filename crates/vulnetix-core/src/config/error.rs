use thiserror::Error;

/// Errors raised while assembling a [`VulnetixConfig`](super::VulnetixConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--org-id is required")]
    MissingOrgId,

    #[error("--org-id must be a valid UUID, got: {0}")]
    InvalidOrgId(String),

    #[error("unsupported task: {0}. Supported tasks: scan, release, report, triage")]
    UnsupportedTask(String),

    #[error("unsupported tool format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to parse tools YAML: {0}")]
    InvalidTools(String),
}
