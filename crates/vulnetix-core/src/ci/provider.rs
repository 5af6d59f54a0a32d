//! Per-platform context providers.
//!
//! Each provider reads only its own platform's variables and maps them onto
//! the normalized [`CiContext`]. The detector selects exactly one provider per
//! process; callers go through [`load_context`].

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use crate::ci::context::{CiContext, Token, owner_from_git_url, ref_type};
use crate::ci::env::EnvSource;
use crate::ci::platform::{RuntimePlatform, detect};

/// Loads a [`CiContext`] for one platform.
pub trait ContextProvider {
    fn platform(&self) -> RuntimePlatform;

    /// Build the context from `env`. `version` is the tool's own version.
    fn load(&self, env: &dyn EnvSource, version: &str) -> CiContext;
}

/// Detect the platform and load its context.
pub fn load_context(env: &dyn EnvSource, version: &str) -> CiContext {
    let platform = detect(env);
    info!(%platform, "detected runtime platform");

    let ctx = provider_for(platform).load(env, version);
    debug!(
        repository = %ctx.repository,
        run_id = %ctx.run_id,
        ref_name = %ctx.ref_name,
        "loaded CI context"
    );
    ctx
}

/// Provider implementation for `platform`.
pub fn provider_for(platform: RuntimePlatform) -> Box<dyn ContextProvider> {
    match platform {
        RuntimePlatform::Github => Box::new(GithubProvider),
        RuntimePlatform::Gitlab => Box::new(GitlabProvider),
        RuntimePlatform::AzureDevops => Box::new(AzureDevopsProvider),
        RuntimePlatform::Bitbucket => Box::new(BitbucketProvider),
        RuntimePlatform::Jenkins => Box::new(JenkinsProvider),
        RuntimePlatform::Kubernetes => Box::new(KubernetesProvider),
        RuntimePlatform::Docker => Box::new(DockerProvider),
        RuntimePlatform::Podman => Box::new(PodmanProvider),
        RuntimePlatform::Cli => Box::new(CliProvider::default()),
    }
}

fn features(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn event_from_marker(env: &dyn EnvSource, pr_marker: &str) -> String {
    if env.is_set(pr_marker) {
        "pull_request".to_string()
    } else {
        "push".to_string()
    }
}

pub struct GithubProvider;

impl ContextProvider for GithubProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Github
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        CiContext {
            platform: self.platform(),
            repository: env.get("GITHUB_REPOSITORY"),
            repository_owner: env.get("GITHUB_REPOSITORY_OWNER"),
            run_id: env.get("GITHUB_RUN_ID"),
            run_number: env.get("GITHUB_RUN_NUMBER"),
            job_id: env.get("GITHUB_JOB"),
            sha: env.get("GITHUB_SHA"),
            ref_name: env.get("GITHUB_REF_NAME"),
            ref_type: env.get("GITHUB_REF_TYPE"),
            head_ref: env.get("GITHUB_HEAD_REF"),
            base_ref: env.get("GITHUB_BASE_REF"),
            event_name: env.get("GITHUB_EVENT_NAME"),
            server_url: env.get("GITHUB_SERVER_URL"),
            api_url: env.get("GITHUB_API_URL"),
            token: Token::new(env.get("GITHUB_TOKEN")),
            workspace_path: env.get("GITHUB_WORKSPACE"),
            runner_os: env.get("RUNNER_OS"),
            runner_arch: env.get("RUNNER_ARCH"),
            platform_version: env.get("GITHUB_ACTION_REF"),
            detected_features: features(&["actions", "workflows", "artifacts"]),
        }
    }
}

pub struct GitlabProvider;

impl ContextProvider for GitlabProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Gitlab
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        let ref_name = env.get("CI_COMMIT_REF_NAME");
        CiContext {
            platform: self.platform(),
            repository: env.get("CI_PROJECT_PATH"),
            repository_owner: env.get("CI_PROJECT_NAMESPACE"),
            run_id: env.get("CI_PIPELINE_ID"),
            run_number: env.get("CI_PIPELINE_IID"),
            job_id: env.get("CI_JOB_ID"),
            sha: env.get("CI_COMMIT_SHA"),
            ref_type: ref_type(&ref_name, &env.get("CI_COMMIT_TAG")).to_string(),
            ref_name,
            head_ref: env.get("CI_MERGE_REQUEST_SOURCE_BRANCH_NAME"),
            base_ref: env.get("CI_MERGE_REQUEST_TARGET_BRANCH_NAME"),
            event_name: env.get("CI_PIPELINE_SOURCE"),
            server_url: env.get("CI_SERVER_URL"),
            api_url: env.get("CI_API_V4_URL"),
            token: Token::new(env.get("CI_JOB_TOKEN")),
            workspace_path: env.get("CI_PROJECT_DIR"),
            runner_os: env.get("CI_RUNNER_TAGS"),
            runner_arch: env.get("CI_RUNNER_EXECUTABLE_ARCH"),
            platform_version: env.get("CI_SERVER_VERSION"),
            detected_features: features(&["pipelines", "jobs", "artifacts", "merge_requests"]),
        }
    }
}

pub struct AzureDevopsProvider;

impl ContextProvider for AzureDevopsProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::AzureDevops
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        let ref_name = env.get("BUILD_SOURCEBRANCHNAME");
        let collection_uri = env.get("SYSTEM_TEAMFOUNDATIONCOLLECTIONURI");
        CiContext {
            platform: self.platform(),
            repository: env.get("BUILD_REPOSITORY_NAME"),
            repository_owner: env.get("SYSTEM_TEAMPROJECT"),
            run_id: env.get("BUILD_BUILDID"),
            run_number: env.get("BUILD_BUILDNUMBER"),
            job_id: env.get("SYSTEM_JOBID"),
            sha: env.get("BUILD_SOURCEVERSION"),
            ref_type: ref_type(&ref_name, "").to_string(),
            ref_name,
            head_ref: env.get("SYSTEM_PULLREQUEST_SOURCEBRANCH"),
            base_ref: env.get("SYSTEM_PULLREQUEST_TARGETBRANCH"),
            event_name: env.get("BUILD_REASON"),
            server_url: collection_uri.clone(),
            api_url: collection_uri,
            token: Token::new(env.get("SYSTEM_ACCESSTOKEN")),
            workspace_path: env.get("BUILD_SOURCESDIRECTORY"),
            runner_os: env.get("AGENT_OS"),
            runner_arch: env.get("AGENT_OSARCHITECTURE"),
            platform_version: env.get("AZURE_HTTP_USER_AGENT"),
            detected_features: features(&["builds", "releases", "artifacts", "pull_requests"]),
        }
    }
}

pub struct BitbucketProvider;

impl ContextProvider for BitbucketProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Bitbucket
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        let ref_name = env.get("BITBUCKET_BRANCH");
        let build_number = env.get("BITBUCKET_BUILD_NUMBER");
        CiContext {
            platform: self.platform(),
            repository: env.get("BITBUCKET_REPO_FULL_NAME"),
            repository_owner: env.get("BITBUCKET_REPO_OWNER"),
            run_id: build_number.clone(),
            run_number: build_number,
            job_id: env.get("BITBUCKET_STEP_UUID"),
            sha: env.get("BITBUCKET_COMMIT"),
            ref_type: ref_type(&ref_name, &env.get("BITBUCKET_TAG")).to_string(),
            ref_name,
            head_ref: env.get("BITBUCKET_PR_ID"),
            base_ref: env.get("BITBUCKET_PR_DESTINATION_BRANCH"),
            event_name: event_from_marker(env, "BITBUCKET_PR_ID"),
            server_url: "https://bitbucket.org".to_string(),
            api_url: "https://api.bitbucket.org/2.0".to_string(),
            token: Token::new(env.get("BITBUCKET_ACCESS_TOKEN")),
            workspace_path: env.get("BITBUCKET_CLONE_DIR"),
            runner_os: env.get("BITBUCKET_STEP_RUNNER_TYPE"),
            runner_arch: String::new(),
            platform_version: env.get("BITBUCKET_PIPELINE_UUID"),
            detected_features: features(&["pipelines", "steps", "artifacts", "pull_requests"]),
        }
    }
}

pub struct JenkinsProvider;

impl ContextProvider for JenkinsProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Jenkins
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        let git_url = env.get("GIT_URL");
        let ref_name = env.get("GIT_BRANCH");
        let jenkins_url = env.get("JENKINS_URL");
        CiContext {
            platform: self.platform(),
            repository_owner: owner_from_git_url(&git_url),
            repository: git_url,
            run_id: env.get("BUILD_ID"),
            run_number: env.get("BUILD_NUMBER"),
            job_id: env.get("JOB_NAME"),
            sha: env.get("GIT_COMMIT"),
            ref_type: ref_type(&ref_name, "").to_string(),
            ref_name,
            head_ref: env.get("CHANGE_BRANCH"),
            base_ref: env.get("CHANGE_TARGET"),
            event_name: event_from_marker(env, "CHANGE_ID"),
            server_url: jenkins_url.clone(),
            api_url: jenkins_url,
            token: Token::new(env.get("JENKINS_API_TOKEN")),
            workspace_path: env.get("WORKSPACE"),
            runner_os: env.get("NODE_LABELS"),
            runner_arch: String::new(),
            platform_version: env.get("JENKINS_VERSION"),
            detected_features: features(&["builds", "jobs", "artifacts", "multibranch"]),
        }
    }
}

pub struct KubernetesProvider;

impl ContextProvider for KubernetesProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Kubernetes
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        CiContext {
            repository: env.get("REPO_NAME"),
            repository_owner: env.get("REPO_OWNER"),
            run_id: env.get("POD_NAME"),
            run_number: env.get("JOB_COMPLETION_INDEX"),
            job_id: env.get("JOB_NAME"),
            sha: env.get("GIT_COMMIT"),
            ref_name: env.get("GIT_BRANCH"),
            ref_type: "branch".to_string(),
            server_url: format!("https://{}", env.get("KUBERNETES_SERVICE_HOST")),
            workspace_path: "/workspace".to_string(),
            runner_os: "linux".to_string(),
            platform_version: env.get("KUBERNETES_SERVICE_PORT"),
            detected_features: features(&["pods", "jobs", "services", "configmaps"]),
            ..CiContext::empty(self.platform())
        }
    }
}

pub struct DockerProvider;

impl ContextProvider for DockerProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Docker
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        CiContext {
            repository: env.get("REPO_NAME"),
            run_id: env.get("HOSTNAME"),
            workspace_path: "/workspace".to_string(),
            runner_os: env.get("TARGETPLATFORM"),
            platform_version: env.get("DOCKER_VERSION"),
            detected_features: features(&["containers", "volumes", "networks"]),
            ..CiContext::empty(self.platform())
        }
    }
}

pub struct PodmanProvider;

impl ContextProvider for PodmanProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Podman
    }

    fn load(&self, env: &dyn EnvSource, _version: &str) -> CiContext {
        CiContext {
            repository: env.get("REPO_NAME"),
            run_id: env.get("HOSTNAME"),
            workspace_path: "/workspace".to_string(),
            runner_os: "linux".to_string(),
            platform_version: env.get("PODMAN_VERSION"),
            detected_features: features(&["containers", "pods", "volumes"]),
            ..CiContext::empty(self.platform())
        }
    }
}

/// Context for runs outside any CI system.
///
/// Synthesizes a run id from the Unix timestamp and the tool version, and
/// uses the working directory's base name as the repository, so that the
/// release gate always has both values available.
#[derive(Debug, Clone, Default)]
pub struct CliProvider {
    /// Fixed Unix timestamp; `None` uses the current time.
    pub timestamp: Option<i64>,
}

impl CliProvider {
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
        }
    }
}

impl ContextProvider for CliProvider {
    fn platform(&self) -> RuntimePlatform {
        RuntimePlatform::Cli
    }

    fn load(&self, env: &dyn EnvSource, version: &str) -> CiContext {
        let timestamp = self.timestamp.unwrap_or_else(|| Utc::now().timestamp());
        let cwd = env.current_dir();

        CiContext {
            repository: base_name(cwd.as_deref()),
            run_id: format!("cli_{timestamp}_{version}"),
            run_number: timestamp.to_string(),
            job_id: "cli-job".to_string(),
            workspace_path: cwd
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            runner_os: std::env::consts::OS.to_string(),
            runner_arch: std::env::consts::ARCH.to_string(),
            platform_version: version.to_string(),
            detected_features: features(&["local", "cli", "manual"]),
            ..CiContext::empty(self.platform())
        }
    }
}

/// Last path component, `/` for a root path and `.` when there is none.
fn base_name(path: Option<&Path>) -> String {
    match path {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => match p.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => p.display().to_string(),
        },
        None => ".".to_string(),
    }
}
