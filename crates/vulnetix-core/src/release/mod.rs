//! Release readiness: prerequisite gate, artifact naming and the
//! assessment of sibling-job artifacts.

pub mod artifacts;
pub mod gate;
pub mod naming;

pub use artifacts::{ArtifactOutcome, ArtifactStatus, ReleaseAssessment, assess};
pub use gate::{ReleaseError, ReleaseViolation, evaluate};
pub use naming::{ArtifactNaming, SiblingJobsContext, WorkflowRunContext};
