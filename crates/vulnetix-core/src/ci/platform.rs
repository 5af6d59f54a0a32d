use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ci::env::EnvSource;

/// Marker file created by the Docker runtime inside containers.
pub const DOCKER_ENV_FILE: &str = "/.dockerenv";

/// Runtime environment the process is executing in.
///
/// Exactly one value is active per process. Detection is total and falls
/// back to [`RuntimePlatform::Cli`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimePlatform {
    Github,
    Gitlab,
    AzureDevops,
    Bitbucket,
    Jenkins,
    Docker,
    Kubernetes,
    Podman,
    Cli,
}

impl RuntimePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::AzureDevops => "azure-devops",
            Self::Bitbucket => "bitbucket",
            Self::Jenkins => "jenkins",
            Self::Docker => "docker",
            Self::Kubernetes => "kubernetes",
            Self::Podman => "podman",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for RuntimePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the runtime platform from environment markers.
///
/// Predicates are evaluated in a fixed priority order and the first match
/// wins. Containerized CI runners satisfy several predicates at once, so CI
/// systems are checked before container runtimes, and the generic Docker
/// marker is checked last.
pub fn detect(env: &dyn EnvSource) -> RuntimePlatform {
    if env.var("GITHUB_ACTIONS").as_deref() == Some("true") || env.is_set("GITHUB_RUN_ID") {
        return RuntimePlatform::Github;
    }

    if env.var("GITLAB_CI").as_deref() == Some("true") || env.is_set("CI_JOB_ID") {
        return RuntimePlatform::Gitlab;
    }

    // Azure sets TF_BUILD with a capitalised value.
    if env.var("TF_BUILD").as_deref() == Some("True")
        || env.is_set("AZURE_HTTP_USER_AGENT")
        || env.is_set("SYSTEM_TEAMFOUNDATIONCOLLECTIONURI")
    {
        return RuntimePlatform::AzureDevops;
    }

    if env.is_set("BITBUCKET_BUILD_NUMBER") || env.is_set("BITBUCKET_COMMIT") {
        return RuntimePlatform::Bitbucket;
    }

    if env.is_set("JENKINS_URL") || env.is_set("BUILD_NUMBER") {
        return RuntimePlatform::Jenkins;
    }

    if env.is_set("KUBERNETES_SERVICE_HOST") || env.is_set("KUBERNETES_PORT") {
        return RuntimePlatform::Kubernetes;
    }

    if env.var("container").as_deref() == Some("podman") || env.is_set("PODMAN_SYSTEMD_UNIT") {
        return RuntimePlatform::Podman;
    }

    if env.path_exists(Path::new(DOCKER_ENV_FILE)) || env.is_set("DOCKER_CONTAINER") {
        return RuntimePlatform::Docker;
    }

    RuntimePlatform::Cli
}
