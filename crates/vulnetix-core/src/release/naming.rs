use serde::Serialize;

use crate::ci::CiContext;
use crate::config::model::ReleaseConfig;

const PREFIX: &str = "vulnetix";

/// Most platforms have no notion of a run attempt.
const DEFAULT_RUN_ATTEMPT: &str = "1";

/// Naming convention for artifacts uploaded by sibling jobs of one CI run.
///
/// Scoped by repository and run id when both are known, generic otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    scope: Option<String>,
}

impl ArtifactNaming {
    pub fn from_context(ci: &CiContext) -> Self {
        let scope = (!ci.repository.is_empty() && !ci.run_id.is_empty())
            .then(|| format!("{}-{}", ci.repository.replace('/', "-"), ci.run_id));
        Self { scope }
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    /// Name for one tool's artifact.
    pub fn for_tool(&self, category: &str, artifact_name: &str) -> String {
        match &self.scope {
            Some(scope) => format!("{PREFIX}-{scope}-{category}-{artifact_name}"),
            None => format!("{PREFIX}-{category}-{artifact_name}"),
        }
    }

    /// Wildcard matching every artifact of the run.
    pub fn search_pattern(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{PREFIX}-{scope}-*"),
            None => format!("{PREFIX}-*"),
        }
    }
}

/// Identity of the workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRunContext {
    pub workflow_run_id: String,
    pub workflow_run_number: String,
    pub workflow_run_attempt: String,
    pub repository: String,
    pub workflow_ref: String,
    pub workflow_sha: String,
}

impl WorkflowRunContext {
    pub fn from_context(ci: &CiContext) -> Self {
        Self {
            workflow_run_id: ci.run_id.clone(),
            workflow_run_number: ci.run_number.clone(),
            workflow_run_attempt: DEFAULT_RUN_ATTEMPT.to_string(),
            repository: ci.repository.clone(),
            workflow_ref: ci.ref_name.clone(),
            workflow_sha: ci.sha.clone(),
        }
    }
}

/// What a release job needs to find artifacts produced by its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiblingJobsContext {
    #[serde(flatten)]
    pub run: WorkflowRunContext,
    pub event_name: String,
    pub head_ref: String,
    pub base_ref: String,
    pub artifact_pattern: String,
    pub api_url: String,
    pub timeout_minutes: i64,
}

impl SiblingJobsContext {
    pub fn new(ci: &CiContext, release: &ReleaseConfig) -> Self {
        Self {
            run: WorkflowRunContext::from_context(ci),
            event_name: ci.event_name.clone(),
            head_ref: ci.head_ref.clone(),
            base_ref: ci.base_ref.clone(),
            artifact_pattern: ArtifactNaming::from_context(ci).search_pattern(),
            api_url: ci.api_url.clone(),
            timeout_minutes: release.workflow_timeout,
        }
    }
}
