use std::io::Read;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sarif::schema::{self, CROSS_CHECK_NAME};
use crate::sarif::validate::{Stats, StructuralValidator, ValidationResult};

/// Combined outcome of the structural and schema passes.
///
/// `valid` is the conjunction of both passes. Each pass keeps its own error
/// list so callers can tell "failed our rules" from "failed the cross-check".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedValidationResult {
    pub valid: bool,
    pub structural: ValidationResult,
    pub schema_valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_errors: Vec<String>,
    pub cross_check: String,
}

impl EnhancedValidationResult {
    pub fn version(&self) -> &str {
        &self.structural.version
    }

    pub fn stats(&self) -> Stats {
        self.structural.stats
    }

    /// Structural errors followed by schema errors.
    pub fn all_errors(&self) -> Vec<String> {
        self.structural
            .errors
            .iter()
            .chain(self.schema_errors.iter())
            .cloned()
            .collect()
    }

    /// Which passes failed, by name.
    pub fn failed_passes(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.structural.valid {
            failed.push("structural");
        }
        if !self.schema_valid {
            failed.push("schema");
        }
        failed
    }
}

/// Runs the structural validator and the schema cross-check over the same
/// bytes and merges their verdicts.
///
/// The schema pass runs even when the structural pass could not parse the
/// input.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualValidator {
    structural: StructuralValidator,
}

impl DualValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self, bytes: &[u8]) -> EnhancedValidationResult {
        let structural = self.structural.validate(bytes);
        let schema = schema::check(bytes);

        let result = EnhancedValidationResult {
            valid: structural.valid && schema.valid,
            structural,
            schema_valid: schema.valid,
            schema_errors: schema.errors,
            cross_check: CROSS_CHECK_NAME.to_string(),
        };

        if result.valid {
            info!(
                version = %result.version(),
                runs = result.stats().run_count,
                results = result.stats().result_count,
                "SARIF document is valid"
            );
        } else {
            warn!(
                failed = ?result.failed_passes(),
                errors = result.all_errors().len(),
                "SARIF document failed validation"
            );
        }

        result
    }

    pub fn validate_reader(&self, mut reader: impl Read) -> Result<EnhancedValidationResult> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .context("failed to read SARIF data")?;
        Ok(self.validate(&buf))
    }
}
