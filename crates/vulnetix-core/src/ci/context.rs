use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ci::platform::RuntimePlatform;

/// Normalized CI/CD context.
///
/// Built once per process by a platform provider and owned by the top-level
/// configuration. Fields whose source variable is absent are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiContext {
    pub platform: RuntimePlatform,
    pub repository: String,
    pub repository_owner: String,
    pub run_id: String,
    pub run_number: String,
    pub job_id: String,
    pub sha: String,
    pub ref_name: String,
    pub ref_type: String,
    pub head_ref: String,
    pub base_ref: String,
    pub event_name: String,
    pub server_url: String,
    pub api_url: String,
    /// Platform credential. Never serialized.
    #[serde(skip)]
    pub token: Token,
    pub workspace_path: String,
    pub runner_os: String,
    pub runner_arch: String,
    pub platform_version: String,
    pub detected_features: Vec<String>,
}

impl CiContext {
    /// Empty context for `platform`.
    pub fn empty(platform: RuntimePlatform) -> Self {
        Self {
            platform,
            repository: String::new(),
            repository_owner: String::new(),
            run_id: String::new(),
            run_number: String::new(),
            job_id: String::new(),
            sha: String::new(),
            ref_name: String::new(),
            ref_type: String::new(),
            head_ref: String::new(),
            base_ref: String::new(),
            event_name: String::new(),
            server_url: String::new(),
            api_url: String::new(),
            token: Token::default(),
            workspace_path: String::new(),
            runner_os: String::new(),
            runner_arch: String::new(),
            platform_version: String::new(),
            detected_features: Vec::new(),
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.detected_features.iter().any(|f| f == feature)
    }
}

/// Opaque credential. `Debug` output is redacted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Token(<empty>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

/// Classify a ref as `tag`, `branch` or `unknown`.
///
/// A tag value wins over a ref name.
pub fn ref_type(ref_name: &str, tag: &str) -> &'static str {
    if !tag.is_empty() {
        "tag"
    } else if !ref_name.is_empty() {
        "branch"
    } else {
        "unknown"
    }
}

/// Owner segment of a Git remote URL: the second-to-last `/`-separated part.
///
/// Returns an empty string for empty or single-segment input.
pub fn owner_from_git_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return String::new();
    }

    parts[parts.len() - 2].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_type_prefers_tag() {
        assert_eq!(ref_type("main", "v1.0.0"), "tag");
        assert_eq!(ref_type("", "v1.0.0"), "tag");
        assert_eq!(ref_type("main", ""), "branch");
        assert_eq!(ref_type("refs/heads/main", ""), "branch");
        assert_eq!(ref_type("", ""), "unknown");
    }

    #[test]
    fn owner_from_https_url() {
        assert_eq!(
            owner_from_git_url("https://github.com/octocat/Spoon-Knife.git"),
            "octocat"
        );
    }

    #[test]
    fn owner_from_malformed_url_is_empty() {
        assert_eq!(owner_from_git_url(""), "");
        assert_eq!(owner_from_git_url("no-slashes-here"), "");
    }

    #[test]
    fn owner_from_scp_style_url_takes_segment_before_last_slash() {
        assert_eq!(
            owner_from_git_url("git@github.com:octocat/repo.git"),
            "git@github.com:octocat"
        );
    }

    #[test]
    fn token_is_not_serialized_nor_debug_printed() {
        let mut ctx = CiContext::empty(RuntimePlatform::Github);
        ctx.token = Token::new("ghs_supersecret");

        let json = serde_json::to_string(&ctx).unwrap();
        assert!(!json.contains("ghs_supersecret"));
        assert!(!json.contains("\"token\""));

        let debug = format!("{ctx:?}");
        assert!(!debug.contains("ghs_supersecret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn platform_serializes_as_tag() {
        let ctx = CiContext::empty(RuntimePlatform::Cli);
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["platform"], "cli");
    }
}
