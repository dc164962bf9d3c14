//! Successful invocation output.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// A file the engine emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: String,
    pub contents: Vec<u8>,
}

impl OutputFile {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Contents as UTF-8, lossily.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Generated code for the source text passed to the invocation.
    pub output_text: String,
    pub warnings: Vec<Diagnostic>,
    pub outputs: Vec<OutputFile>,
}

impl BuildResult {
    pub fn new(output_text: impl Into<String>) -> Self {
        Self {
            output_text: output_text.into(),
            ..Default::default()
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warnings_of(&self, kind: &DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.warnings.iter().filter(move |w| &w.kind == kind)
    }

    pub fn output(&self, path: &str) -> Option<&OutputFile> {
        self.outputs.iter().find(|o| o.path == path)
    }
}
