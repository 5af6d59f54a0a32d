use uuid::Uuid;

use crate::config::error::ConfigError;
use crate::config::model::{Tool, ToolFormat};

/// Parse a tag list given either bracketed (`["a", "b"]`) or bare (`a,b`).
///
/// Whitespace and single or double quotes around each tag are stripped and
/// empty entries dropped. Never fails.
pub fn parse_tags(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let inner = trimmed.trim_start_matches('[').trim_end_matches(']');

    inner
        .split(',')
        .map(|t| t.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a YAML sequence of tool declarations.
///
/// Blank input yields no tools.
pub fn parse_tools(input: &str) -> Result<Vec<Tool>, ConfigError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tools: Option<Vec<Tool>> =
        serde_yaml::from_str(input).map_err(|e| ConfigError::InvalidTools(e.to_string()))?;
    Ok(tools.unwrap_or_default())
}

/// Comma separated list of format names, e.g. `SARIF,SBOM`.
pub fn parse_formats(input: &str) -> Result<Vec<ToolFormat>, ConfigError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

pub fn parse_org_id(input: Option<&str>) -> Result<Uuid, ConfigError> {
    let raw = input.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ConfigError::MissingOrgId);
    }
    Uuid::parse_str(raw).map_err(|_| ConfigError::InvalidOrgId(raw.to_string()))
}
