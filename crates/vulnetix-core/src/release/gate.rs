use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::ci::CiContext;
use crate::config::model::{DEFAULT_WORKFLOW_TIMEOUT, ReleaseConfig, TaskType};

/// A single unmet release prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseViolation {
    MissingProductionBranch,
    MissingReleaseBranch,
    MissingRunId,
    MissingRepository,
}

impl fmt::Display for ReleaseViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingProductionBranch => {
                "production branch is required for release readiness assessment"
            }
            Self::MissingReleaseBranch => {
                "release branch is required for release readiness assessment"
            }
            Self::MissingRunId => "CI run ID is required for artifact linking",
            Self::MissingRepository => "CI repository is required for artifact scoping",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    /// Every unmet prerequisite, in check order.
    #[error("{}", join_violations(.0))]
    Insufficient(Vec<ReleaseViolation>),
}

impl ReleaseError {
    pub fn violations(&self) -> &[ReleaseViolation] {
        match self {
            Self::Insufficient(v) => v,
        }
    }
}

fn join_violations(violations: &[ReleaseViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decide whether a release may proceed.
///
/// Only active for [`TaskType::Release`]. When active, a non-positive
/// workflow timeout is reset to the default before the checks run.
pub fn evaluate(
    task: TaskType,
    release: &mut ReleaseConfig,
    ci: &CiContext,
) -> Result<(), ReleaseError> {
    if task != TaskType::Release {
        debug!(task = %task, "release gate inactive");
        return Ok(());
    }

    if release.workflow_timeout <= 0 {
        debug!(
            given = release.workflow_timeout,
            "resetting workflow timeout to default"
        );
        release.workflow_timeout = DEFAULT_WORKFLOW_TIMEOUT;
    }

    let mut violations = Vec::new();
    if release.production_branch.is_empty() {
        violations.push(ReleaseViolation::MissingProductionBranch);
    }
    if release.release_branch.is_empty() {
        violations.push(ReleaseViolation::MissingReleaseBranch);
    }
    if ci.run_id.is_empty() {
        violations.push(ReleaseViolation::MissingRunId);
    }
    if ci.repository.is_empty() {
        violations.push(ReleaseViolation::MissingRepository);
    }

    if !violations.is_empty() {
        return Err(ReleaseError::Insufficient(violations));
    }

    info!(
        production = %release.production_branch,
        release = %release.release_branch,
        run_id = %ci.run_id,
        "release readiness prerequisites satisfied"
    );
    Ok(())
}
