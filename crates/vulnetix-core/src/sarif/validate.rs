use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sarif::model::SarifDocument;
use crate::sarif::rules::{self, Diagnostic, Diagnostics};

/// Outcome of the structural validation pass.
///
/// Produced fresh per call and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub stats: Stats,
}

/// Descriptive statistics over a parsed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub run_count: usize,
    pub result_count: usize,
    /// Distinct non-empty tool driver names.
    pub tool_count: usize,
}

/// Structural SARIF validator.
///
/// Malformed input is reported as a validation error, never as a failure of
/// the call itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a document held in memory.
    ///
    /// 1. Deserialization failure short-circuits with a single diagnostic and
    ///    zero statistics. A JSON `null` is read as an empty document.
    /// 2. Statistics are computed for every parsed document, valid or not.
    /// 3. Version and structure checks all run; their diagnostics accumulate.
    pub fn validate(&self, bytes: &[u8]) -> ValidationResult {
        let doc: SarifDocument = match serde_json::from_slice::<Option<SarifDocument>>(bytes) {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "SARIF input is not parseable");
                return ValidationResult {
                    valid: false,
                    errors: vec![Diagnostic::InvalidJson(e.to_string()).to_string()],
                    ..Default::default()
                };
            }
        };

        let stats = compute_stats(&doc);

        let mut diags = Diagnostics::new();
        rules::check_document(&doc, &mut diags);

        debug!(
            version = %doc.version,
            runs = stats.run_count,
            diagnostics = diags.len(),
            "structural validation finished"
        );

        ValidationResult {
            valid: diags.is_empty(),
            version: doc.version,
            errors: diags.messages(),
            stats,
        }
    }

    /// Read `reader` to the end and validate its contents.
    pub fn validate_reader(&self, mut reader: impl Read) -> Result<ValidationResult> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .context("failed to read SARIF data")?;
        Ok(self.validate(&buf))
    }
}

/// Count runs, results and distinct non-empty tool names.
pub fn compute_stats(doc: &SarifDocument) -> Stats {
    let runs = doc.runs();
    let tool_names: HashSet<&str> = runs
        .iter()
        .map(|r| r.tool.driver.name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    Stats {
        run_count: runs.len(),
        result_count: runs.iter().map(|r| r.results.len()).sum(),
        tool_count: tool_names.len(),
    }
}
