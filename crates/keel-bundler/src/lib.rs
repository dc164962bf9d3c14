#![cfg_attr(docsrs, feature(doc_cfg))]

//! # keel-bundler
//!
//! Drives a bundling engine with keel options and routes the engine's module
//! resolution and loading through the attached plugins.
//!
//! ## Quick Start
//!
//! ```no_run
//! use keel_bundler::{BuildOptions, build};
//! use keel_plugin::react_global;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = BuildOptions::new();
//! options.set("bundle", true)?;
//! options.set("format", "esm")?;
//! options.add_plugin(react_global("window.React")?);
//!
//! let result = build("import React from 'react'; export default React", &options).await?;
//! println!("{}", result.output_text);
//! # Ok(()) }
//! ```

pub mod diagnostics;
pub mod engine;
pub mod invoke;
pub mod options;
pub mod result;
pub mod rolldown_engine;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{init_logging, init_logging_from_env};

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use engine::{BuildRequest, Engine, Request, TransformRequest};
pub use invoke::{Invoker, build, transform};
pub use options::{BuildOptions, Options, TransformOptions};
pub use result::{BuildResult, OutputFile};
pub use rolldown_engine::RolldownEngine;

use keel_config::ConfigError;
use keel_plugin::{HookError, HookStage, PluginError};

/// Error types for keel invocations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An option value outside its allowed set.
    #[error("invalid option: {0}")]
    InvalidOption(#[source] ConfigError),

    /// Option combination rejected before compilation.
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        hint: Option<String>,
    },

    /// The engine failed to compile the input.
    #[error("compilation failed: {}", format_compilation_error(.0))]
    Compilation(Vec<Diagnostic>),

    #[error("plugin '{plugin}' failed to start: {message}")]
    PluginStartFailed { plugin: String, message: String },

    #[error("plugin '{plugin}' failed during {stage}: {message}")]
    PluginHandlerFailed {
        plugin: String,
        stage: HookStage,
        message: String,
    },

    /// A module outside the `file` namespace that no plugin loaded.
    #[error("no plugin loaded '{path}' in namespace '{namespace}'")]
    UnresolvedLoad { path: String, namespace: String },

    /// A plugin could not be constructed.
    #[error("invalid plugin: {0}")]
    Plugin(#[from] PluginError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for keel-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a compilation error from a Rolldown error batch.
    pub fn from_rolldown_batch(batch: &rolldown_error::BatchedBuildDiagnostic) -> Self {
        Error::Compilation(diagnostics::extract_from_rolldown_error(batch))
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Conflict { message, hint } => Error::Configuration { message, hint },
            ConfigError::Io(err) => Error::Io(err),
            err @ (ConfigError::NotFound(_)
            | ConfigError::UnsupportedFormat(_)
            | ConfigError::InvalidValue { .. }) => Error::Configuration {
                hint: err.hint().map(str::to_string),
                message: err.to_string(),
            },
            other => Error::InvalidOption(other),
        }
    }
}

impl From<HookError> for Error {
    fn from(err: HookError) -> Self {
        match err {
            HookError::PluginStartFailed { plugin, message } => {
                Error::PluginStartFailed { plugin, message }
            }
            HookError::HandlerFailed {
                plugin,
                stage,
                message,
            } => Error::PluginHandlerFailed {
                plugin,
                stage,
                message,
            },
            HookError::UnresolvedLoad { path, namespace } => {
                Error::UnresolvedLoad { path, namespace }
            }
            HookError::MalformedRequest { message } => Error::configuration(message),
        }
    }
}

fn format_compilation_error(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "unknown engine error".to_string(),
        [single] => single.to_string(),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::InvalidOption(_) => "INVALID_OPTION",
            Error::Configuration { .. } => "CONFIGURATION_ERROR",
            Error::Compilation(_) => "COMPILATION_ERROR",
            Error::PluginStartFailed { .. } => "PLUGIN_START_FAILED",
            Error::PluginHandlerFailed { .. } => "PLUGIN_HANDLER_FAILED",
            Error::UnresolvedLoad { .. } => "UNRESOLVED_LOAD",
            Error::Plugin(_) => "INVALID_PLUGIN",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidOption(ConfigError::InvalidOption { expected, .. }) => {
                Some(Box::new(format!("Use one of: {expected}")))
            }
            Error::InvalidOption(ConfigError::UnknownOption(name)) => Some(Box::new(format!(
                "'{name}' is not a known option. Check the spelling against the option list."
            ))),
            Error::Configuration { hint, .. } => hint
                .as_ref()
                .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
            Error::Compilation(diagnostics) => match diagnostics.as_slice() {
                [single] => single
                    .help
                    .as_ref()
                    .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
                [] => None,
                _ => Some(Box::new(
                    "Multiple engine errors occurred. See details above.".to_string(),
                )),
            },
            Error::PluginStartFailed { plugin, .. } => Some(Box::new(format!(
                "The on-start callback of '{plugin}' returned an error; nothing was resolved or loaded."
            ))),
            Error::PluginHandlerFailed { plugin, stage, .. } => Some(Box::new(format!(
                "Check the {stage} handler of plugin '{plugin}'. Handlers must not fail for inputs their filter matches."
            ))),
            Error::UnresolvedLoad { namespace, .. } => Some(Box::new(format!(
                "A resolve handler placed this module in namespace '{namespace}'. Add a load handler for that namespace."
            ))),
            _ => None,
        }
    }
}
