//! Version-specific SARIF rules and the diagnostic accumulator.
//!
//! Every check appends to a [`Diagnostics`] value instead of returning early,
//! so a single validation surfaces all defects of a document at once.

use std::fmt;

use crate::sarif::model::SarifDocument;

/// SARIF versions with a rule set, in display order.
pub const SUPPORTED_VERSIONS: [SarifVersion; 2] = [SarifVersion::V2_1_0, SarifVersion::V2_0_0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SarifVersion {
    V2_1_0,
    V2_0_0,
}

impl SarifVersion {
    pub fn parse(version: &str) -> Option<Self> {
        match version {
            "2.1.0" => Some(Self::V2_1_0),
            "2.0.0" => Some(Self::V2_0_0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V2_1_0 => "2.1.0",
            Self::V2_0_0 => "2.0.0",
        }
    }
}

impl fmt::Display for SarifVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated list of supported versions.
pub fn supported_versions_list() -> String {
    SUPPORTED_VERSIONS
        .iter()
        .map(SarifVersion::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single validation finding against a SARIF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Input is not parseable as a SARIF document.
    InvalidJson(String),
    UnsupportedVersion(String),
    NoRuns(SarifVersion),
    MissingToolName { run: usize, version: SarifVersion },
    MissingMessageText { run: usize, result: usize },
    MissingVersionField,
    MissingRunsArray,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(detail) => write!(f, "Invalid JSON format: {detail}"),
            Self::UnsupportedVersion(v) => write!(
                f,
                "Unsupported SARIF version: {v} (supported: {})",
                supported_versions_list()
            ),
            Self::NoRuns(v) => write!(f, "SARIF {v} requires at least one run"),
            Self::MissingToolName {
                run,
                version: SarifVersion::V2_1_0,
            } => write!(f, "Run {run}: tool.driver.name is required in SARIF 2.1.0"),
            Self::MissingToolName {
                run,
                version: SarifVersion::V2_0_0,
            } => write!(f, "Run {run}: tool name is required in SARIF 2.0.0"),
            Self::MissingMessageText { run, result } => {
                write!(f, "Run {run}, Result {result}: message.text is required")
            }
            Self::MissingVersionField => f.write_str("SARIF version field is required"),
            Self::MissingRunsArray => f.write_str("SARIF runs array is required"),
        }
    }
}

/// Ordered accumulator of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Human-readable messages, in insertion order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

/// Run every applicable check against `doc`.
pub fn check_document(doc: &SarifDocument, diags: &mut Diagnostics) {
    match SarifVersion::parse(&doc.version) {
        Some(SarifVersion::V2_1_0) => check_v2_1_0(doc, diags),
        Some(SarifVersion::V2_0_0) => check_v2_0_0(doc, diags),
        None => diags.push(Diagnostic::UnsupportedVersion(doc.version.clone())),
    }

    check_basic_structure(doc, diags);
}

pub fn check_v2_1_0(doc: &SarifDocument, diags: &mut Diagnostics) {
    let version = SarifVersion::V2_1_0;
    if doc.runs().is_empty() {
        diags.push(Diagnostic::NoRuns(version));
    }

    for (i, run) in doc.runs().iter().enumerate() {
        if run.tool.driver.name.is_empty() {
            diags.push(Diagnostic::MissingToolName { run: i, version });
        }

        for (j, result) in run.results.iter().enumerate() {
            if result.message.text.is_empty() {
                diags.push(Diagnostic::MissingMessageText { run: i, result: j });
            }
        }
    }
}

/// 2.0.0 has no legacy tool-name location; the driver name is required.
pub fn check_v2_0_0(doc: &SarifDocument, diags: &mut Diagnostics) {
    let version = SarifVersion::V2_0_0;
    if doc.runs().is_empty() {
        diags.push(Diagnostic::NoRuns(version));
    }

    for (i, run) in doc.runs().iter().enumerate() {
        if run.tool.driver.name.is_empty() {
            diags.push(Diagnostic::MissingToolName { run: i, version });
        }
    }
}

/// Version-independent checks. An explicitly empty `runs` array passes here.
pub fn check_basic_structure(doc: &SarifDocument, diags: &mut Diagnostics) {
    if doc.version.is_empty() {
        diags.push(Diagnostic::MissingVersionField);
    }

    if doc.runs.is_none() {
        diags.push(Diagnostic::MissingRunsArray);
    }
}
