pub mod ci;
pub mod config;
pub mod release;
pub mod report;
pub mod sarif;
pub mod upload;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

/// Version reported in CI context and upload user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run both validation passes over a SARIF file on disk.
pub fn validate_file(path: &Path) -> Result<sarif::EnhancedValidationResult> {
    let file = File::open(path)
        .with_context(|| format!("failed to open SARIF file {}", path.display()))?;
    sarif::DualValidator::new().validate_reader(file)
}
