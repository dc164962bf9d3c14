//! Routes engine resolve/load requests through the attached plugins.
//!
//! Precedence is plugin attachment order, then rule order inside a plugin. The first
//! matching rule's outcome is used verbatim.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hooks::{EndArgs, LoadArgs, LoadOutcome, ResolveArgs, ResolveOutcome};
use crate::namespace;
use crate::plugin::Plugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStage {
    Start,
    Resolve,
    Load,
    End,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookStage::Start => "start",
            HookStage::Resolve => "resolve",
            HookStage::Load => "load",
            HookStage::End => "end",
        })
    }
}

/// A failure that aborts the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookError {
    #[error("plugin '{plugin}' failed to start: {message}")]
    PluginStartFailed { plugin: String, message: String },

    #[error("plugin '{plugin}' failed during {stage}: {message}")]
    HandlerFailed {
        plugin: String,
        stage: HookStage,
        message: String,
    },

    #[error("no plugin loaded '{path}' in namespace '{namespace}'")]
    UnresolvedLoad { path: String, namespace: String },

    #[error("malformed hook request: {message}")]
    MalformedRequest { message: String },
}

impl HookError {
    fn handler(plugin: &Plugin, stage: HookStage, err: &anyhow::Error) -> Self {
        HookError::HandlerFailed {
            plugin: plugin.name().to_string(),
            stage,
            message: format!("{err:#}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        plugin: String,
        outcome: ResolveOutcome,
    },
    /// No rule matched; the engine's own resolution applies.
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loading {
    Loaded { plugin: String, outcome: LoadOutcome },
    /// No rule matched a `file` module; the engine reads it from disk.
    Unhandled,
}

/// Immutable snapshot of the plugins attached to one invocation.
#[derive(Debug, Clone, Default)]
pub struct HookDispatcher {
    plugins: Arc<[Arc<Plugin>]>,
}

impl HookDispatcher {
    pub fn new(plugins: impl IntoIterator<Item = Arc<Plugin>>) -> Self {
        Self {
            plugins: plugins.into_iter().collect(),
        }
    }

    pub fn plugins(&self) -> &[Arc<Plugin>] {
        &self.plugins
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every on-start callback once, in attachment order.
    pub fn run_start(&self) -> Result<(), HookError> {
        for plugin in self.plugins.iter().filter(|p| p.has_on_start()) {
            tracing::debug!(plugin = plugin.name(), "running on-start");
            plugin
                .run_start()
                .map_err(|err| HookError::PluginStartFailed {
                    plugin: plugin.name().to_string(),
                    message: format!("{err:#}"),
                })?;
        }
        Ok(())
    }

    pub fn resolve(&self, args: &ResolveArgs) -> Result<Resolution, HookError> {
        for plugin in self.plugins.iter() {
            let Some(rule) = plugin.resolve_rules().iter().find(|rule| rule.matches(args)) else {
                continue;
            };
            tracing::debug!(
                plugin = plugin.name(),
                filter = rule.filter().as_str(),
                specifier = %args.specifier,
                namespace = %args.namespace,
                "resolve rule matched"
            );
            let outcome = rule
                .call(args)
                .map_err(|err| HookError::handler(plugin, HookStage::Resolve, &err))?;
            if let Some(ns) = outcome.namespace.as_deref().filter(|ns| !namespace::is_valid(ns)) {
                return Err(HookError::HandlerFailed {
                    plugin: plugin.name().to_string(),
                    stage: HookStage::Resolve,
                    message: format!("returned invalid namespace '{ns}'"),
                });
            }
            tracing::trace!(path = %outcome.path, external = outcome.external, "resolved");
            return Ok(Resolution::Resolved {
                plugin: plugin.name().to_string(),
                outcome,
            });
        }
        Ok(Resolution::Unhandled)
    }

    /// Offer `(path, namespace)` to load rules.
    ///
    /// A module outside the `file` namespace that no rule loads is an
    /// [`HookError::UnresolvedLoad`].
    pub fn load(&self, args: &LoadArgs) -> Result<Loading, HookError> {
        for plugin in self.plugins.iter() {
            let Some(rule) = plugin.load_rules().iter().find(|rule| rule.matches(args)) else {
                continue;
            };
            tracing::debug!(
                plugin = plugin.name(),
                filter = rule.filter().as_str(),
                path = %args.path,
                namespace = %args.namespace,
                "load rule matched"
            );
            let outcome = rule
                .call(args)
                .map_err(|err| HookError::handler(plugin, HookStage::Load, &err))?;
            return Ok(Loading::Loaded {
                plugin: plugin.name().to_string(),
                outcome,
            });
        }

        if namespace::is_file(&args.namespace) {
            Ok(Loading::Unhandled)
        } else {
            Err(HookError::UnresolvedLoad {
                path: args.path.clone(),
                namespace: args.namespace.clone(),
            })
        }
    }

    /// Run every on-end callback in attachment order; the first failure is returned
    /// after all callbacks ran.
    pub fn run_end(&self, args: &EndArgs) -> Result<(), HookError> {
        let mut first_error = None;
        for plugin in self.plugins.iter().filter(|p| p.has_on_end()) {
            tracing::debug!(plugin = plugin.name(), succeeded = args.succeeded, "running on-end");
            if let Err(err) = plugin.run_end(args) {
                let err = HookError::handler(plugin, HookStage::End, &err);
                tracing::warn!("{err}");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl From<Vec<Arc<Plugin>>> for HookDispatcher {
    fn from(plugins: Vec<Arc<Plugin>>) -> Self {
        Self {
            plugins: plugins.into(),
        }
    }
}
