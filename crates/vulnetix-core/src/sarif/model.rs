use serde::{Deserialize, Deserializer, Serialize};

/// The subset of a SARIF log that the structural validator inspects.
///
/// Deserialization is lenient: absent or `null` fields fall back to empty
/// values so that missing data is reported as a rule violation rather than a
/// parse failure. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SarifDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    /// `None` when the `runs` key is absent (or `null`).
    #[serde(default)]
    pub runs: Option<Vec<Run>>,
}

impl SarifDocument {
    pub fn runs(&self) -> &[Run] {
        self.runs.as_deref().unwrap_or_default()
    }
}

/// One execution of one analysis tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool: Tool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default, deserialize_with = "null_as_default")]
    pub driver: ToolComponent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolComponent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single finding reported within a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId", default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub message: Message,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_become_empty() {
        let doc: SarifDocument = serde_json::from_str(r#"{"runs":[{"results":[{}]}]}"#).unwrap();

        assert_eq!(doc.version, "");
        assert_eq!(doc.runs().len(), 1);
        assert_eq!(doc.runs()[0].tool.driver.name, "");
        assert_eq!(doc.runs()[0].results[0].message.text, "");
    }

    #[test]
    fn absent_runs_differs_from_empty_runs() {
        let absent: SarifDocument = serde_json::from_str(r#"{"version":"2.1.0"}"#).unwrap();
        let empty: SarifDocument =
            serde_json::from_str(r#"{"version":"2.1.0","runs":[]}"#).unwrap();

        assert!(absent.runs.is_none());
        assert_eq!(empty.runs.as_deref().map(<[Run]>::len), Some(0));
    }

    #[test]
    fn null_values_are_tolerated() {
        let doc: SarifDocument = serde_json::from_str(
            r#"{"version":null,"runs":[{"tool":null,"results":null}]}"#,
        )
        .unwrap();

        assert_eq!(doc.version, "");
        assert!(doc.runs()[0].results.is_empty());
    }

    #[test]
    fn reads_rule_id_and_level() {
        let doc: SarifDocument = serde_json::from_str(
            r#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"Bandit","version":"1.7.0"}},
                "results":[{"ruleId":"B602","level":"error","message":{"text":"shell"}}]}]}"#,
        )
        .unwrap();

        let run = &doc.runs()[0];
        assert_eq!(run.tool.driver.version.as_deref(), Some("1.7.0"));
        assert_eq!(run.results[0].rule_id.as_deref(), Some("B602"));
        assert_eq!(run.results[0].level.as_deref(), Some("error"));
    }

    #[test]
    fn wrong_field_type_is_a_parse_error() {
        let parsed = serde_json::from_str::<SarifDocument>(r#"{"version":2,"runs":[]}"#);
        assert!(parsed.is_err());
    }
}
