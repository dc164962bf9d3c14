//! Diagnostics carried by results and compilation errors.
//!
//! Rolldown errors and warnings are reduced to [`Diagnostic`] records so the public types
//! stay stable across Rolldown releases.

use std::fmt;
use std::sync::LazyLock;

use keel_plugin::RuleOverlap;
use regex::Regex;
use rolldown_error::{BatchedBuildDiagnostic, BuildDiagnostic, Severity};
use serde::{Deserialize, Serialize};

/// A message with an optional source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub help: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ParseError,
    MissingExport,
    CircularDependency,
    UnresolvedEntry,
    UnresolvedImport,
    /// Emitted by a plugin handler alongside its outcome.
    Plugin,
    /// Two plugins register the same filter; the later one never runs.
    RuleOverlap,
    /// Options the engine cannot honor.
    UnsupportedOption,
    Other(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::ParseError => f.write_str("ParseError"),
            DiagnosticKind::MissingExport => f.write_str("MissingExport"),
            DiagnosticKind::CircularDependency => f.write_str("CircularDependency"),
            DiagnosticKind::UnresolvedEntry => f.write_str("UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => f.write_str("UnresolvedImport"),
            DiagnosticKind::Plugin => f.write_str("Plugin"),
            DiagnosticKind::RuleOverlap => f.write_str("RuleOverlap"),
            DiagnosticKind::UnsupportedOption => f.write_str("UnsupportedOption"),
            DiagnosticKind::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            help: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Warning raised by `plugin` while handling `path`.
    pub fn from_plugin(plugin: &str, path: &str, message: impl Into<String>) -> Self {
        Self::warning(DiagnosticKind::Plugin, format!("[{plugin}] {}", message.into()))
            .with_file(path)
    }

    pub fn from_overlap(overlap: &RuleOverlap) -> Self {
        Self::warning(DiagnosticKind::RuleOverlap, overlap.to_string()).with_help(format!(
            "attach '{}' before '{}' or narrow one of the filters",
            overlap.shadowed, overlap.winner
        ))
    }

    pub fn unsupported_options(names: &[&str]) -> Self {
        Self::warning(
            DiagnosticKind::UnsupportedOption,
            format!("options ignored by this engine: {}", names.join(", ")),
        )
    }

    /// `file:line:column: message`, leaving out the parts that are unknown.
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        Some(match (self.line, self.column) {
            (Some(line), Some(column)) => format!("{file}:{line}:{column}"),
            (Some(line), None) => format!("{file}:{line}"),
            _ => file.to_string(),
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = self.location() {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Convert every diagnostic in a Rolldown error batch.
pub fn extract_from_rolldown_error(batch: &BatchedBuildDiagnostic) -> Vec<Diagnostic> {
    batch.iter().map(Diagnostic::from_rolldown).collect()
}

impl Diagnostic {
    /// Structured conversion of one Rolldown diagnostic.
    ///
    /// The location comes from the diagnostic's primary label; when Rolldown attached
    /// none, a `file:line:column` in the message text is used instead.
    pub fn from_rolldown(diagnostic: &BuildDiagnostic) -> Self {
        let message = diagnostic.to_string();
        let report = diagnostic.to_diagnostic();
        let (file, line, column) = match report.get_primary_location() {
            Some((file, line, column, _)) => (
                Some(file),
                u32::try_from(line).ok(),
                u32::try_from(column).ok(),
            ),
            None => match extract_location(&message) {
                (None, _, _) => (diagnostic.id(), None, None),
                found => found,
            },
        };
        Diagnostic {
            kind: classify(&diagnostic.kind().to_string()),
            severity: match diagnostic.severity() {
                Severity::Error => DiagnosticSeverity::Error,
                Severity::Warning => DiagnosticSeverity::Warning,
            },
            help: extract_help_text(&report.to_string()),
            message,
            file,
            line,
            column,
        }
    }
}

/// Map a Rolldown event code onto a diagnostic kind.
fn classify(code: &str) -> DiagnosticKind {
    match code {
        "PARSE_ERROR" | "JSON_PARSE" => DiagnosticKind::ParseError,
        "MISSING_EXPORT" => DiagnosticKind::MissingExport,
        "CIRCULAR_DEPENDENCY" | "CIRCULAR_REEXPORT" => DiagnosticKind::CircularDependency,
        "UNRESOLVED_ENTRY" => DiagnosticKind::UnresolvedEntry,
        "UNRESOLVED_IMPORT" | "RESOLVE_ERROR" => DiagnosticKind::UnresolvedImport,
        "PLUGIN_ERROR" => DiagnosticKind::Plugin,
        other => DiagnosticKind::Other(other.to_string()),
    }
}

static LOCATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'(),]+\.(?:[cm]?[jt]sx?|json|css)):(\d+)(?::(\d+))?"#).ok()
});

static FILE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"([^\s"'(),]+\.(?:[cm]?[jt]sx?|json|css))\b"#).ok());

fn extract_location(text: &str) -> (Option<String>, Option<u32>, Option<u32>) {
    if let Some(caps) = LOCATION.as_ref().and_then(|re| re.captures(text)) {
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse().ok());
        return (Some(caps[1].to_string()), number(2), number(3));
    }
    let file = FILE
        .as_ref()
        .and_then(|re| re.captures(text))
        .map(|caps| caps[1].to_string());
    (file, None, None)
}

fn extract_help_text(text: &str) -> Option<String> {
    ["help: ", "Help: ", "hint: ", "Hint: "]
        .iter()
        .find_map(|indicator| {
            let at = text.find(indicator)?;
            let help = text[at + indicator.len()..].lines().next()?.trim();
            (!help.is_empty()).then(|| help.to_string())
        })
}
