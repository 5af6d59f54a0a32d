//! Invocation configuration and its input parsers.

pub mod error;
pub mod model;
pub mod parse;

pub use error::ConfigError;
pub use model::{
    DEFAULT_WORKFLOW_TIMEOUT, ReleaseConfig, TaskType, Tool, ToolFormat, VulnetixConfig,
};
pub use parse::{parse_formats, parse_org_id, parse_tags, parse_tools};
