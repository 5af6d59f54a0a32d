//! Independent schema-oriented cross-check.
//!
//! Deserializes the raw bytes into the full typed SARIF 2.1.0 object model
//! from `serde-sarif`, then checks the shallow shape of the log. The typed
//! model knows every member the structural pass ignores, so a document with a
//! mistyped member (`rules`, `locations`, `ruleIndex`, ...) is rejected here
//! even when the structural rules accept it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_sarif::sarif::Sarif;

/// Name reported for this pass in results.
pub const CROSS_CHECK_NAME: &str = "serde-sarif";

/// Outcome of the schema pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl SchemaOutcome {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: vec![],
        }
    }

    fn fail(msg: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![msg.into()],
        }
    }
}

/// Check `bytes` for a log that deserializes into the typed SARIF model and
/// has a non-empty `runs` array and a non-empty `version` string.
///
/// Stops at the first failed condition.
pub fn check(bytes: &[u8]) -> SchemaOutcome {
    let log: Sarif = match serde_json::from_slice(bytes) {
        Ok(log) => log,
        Err(e) => return SchemaOutcome::fail(format!("schema parsing error: {e}")),
    };

    if log.runs.is_empty() {
        return SchemaOutcome::fail("schema check: report has no runs");
    }

    let has_version = serde_json::to_value(&log.version)
        .ok()
        .as_ref()
        .and_then(Value::as_str)
        .is_some_and(|v| !v.is_empty());
    if !has_version {
        return SchemaOutcome::fail("schema check: report has no version");
    }

    SchemaOutcome::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &[u8] = br#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"T"}}}]}"#;

    #[test]
    fn accepts_minimal_log() {
        assert_eq!(check(MINIMAL), SchemaOutcome::ok());
    }

    #[test]
    fn does_not_judge_the_version_value() {
        let out = check(br#"{"version":"1.0.0","runs":[{"tool":{"driver":{"name":"T"}}}]}"#);
        assert!(out.valid, "{:?}", out.errors);
    }

    #[test]
    fn rejects_unparseable_input() {
        let out = check(b"{not json");
        assert!(!out.valid);
        assert!(out.errors[0].starts_with("schema parsing error"));
    }

    #[test]
    fn rejects_null_document() {
        let out = check(b"null");
        assert!(!out.valid);
        assert!(out.errors[0].starts_with("schema parsing error"));
    }

    #[test]
    fn rejects_non_object_document() {
        let out = check(b"[1, 2]");
        assert!(!out.valid);
        assert!(out.errors[0].starts_with("schema parsing error"));
    }

    #[test]
    fn rejects_empty_runs() {
        let out = check(br#"{"version":"2.1.0","runs":[]}"#);
        assert_eq!(out.errors, vec!["schema check: report has no runs"]);
    }

    #[test]
    fn rejects_empty_version() {
        let out = check(br#"{"version":"","runs":[{"tool":{"driver":{"name":"T"}}}]}"#);
        assert_eq!(out.errors, vec!["schema check: report has no version"]);
    }

    #[test]
    fn rejects_mistyped_members() {
        let cases: [&[u8]; 3] = [
            br#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"T","rules":"none"}}}]}"#,
            br#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"T"}},
                "results":[{"message":{"text":"x"},"locations":"bogus"}]}]}"#,
            br#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"T"}},
                "results":[{"message":{"text":"x"},"ruleIndex":"zero"}]}]}"#,
        ];

        for input in cases {
            let out = check(input);
            assert!(!out.valid);
            assert!(out.errors[0].starts_with("schema parsing error"), "{:?}", out.errors);
        }
    }

    #[test]
    fn rejects_run_without_tool() {
        let out = check(br#"{"version":"2.1.0","runs":[{}]}"#);
        assert!(!out.valid);
        assert!(out.errors[0].contains("tool"), "{:?}", out.errors);
    }
}
