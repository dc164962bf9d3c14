//! Shared test utilities for keel-bundler tests
//!
//! `ScriptedEngine` stands in for a real bundler: it resolves and loads a fixed list of
//! imports through the hook dispatcher and records what happened.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keel_bundler::{BuildRequest, BuildResult, Engine, TransformRequest};
use keel_plugin::{HookDispatcher, LoadArgs, Loading, Plugin, ResolveArgs, Resolution};

/// Ordered event log shared by plugins and the engine.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    pub imports: Vec<String>,
    pub log: Log,
    pub fail_with: Option<String>,
}

impl ScriptedEngine {
    pub fn importing(imports: &[&str], log: &Log) -> Self {
        Self {
            imports: imports.iter().map(|s| s.to_string()).collect(),
            log: log.clone(),
            fail_with: None,
        }
    }

    fn run(&self, source: &str, hooks: &HookDispatcher) -> keel_bundler::Result<BuildResult> {
        self.log.push("engine");
        if let Some(message) = &self.fail_with {
            return Err(keel_bundler::Error::Compilation(vec![
                keel_bundler::Diagnostic::warning(
                    keel_bundler::DiagnosticKind::ParseError,
                    message.clone(),
                ),
            ]));
        }

        let mut lines = vec![source.to_string()];
        for specifier in &self.imports {
            let args = ResolveArgs::new(specifier.as_str()).with_importer("<stdin>");
            let line = match hooks.resolve(&args)? {
                Resolution::Unhandled => format!("unhandled:{specifier}"),
                Resolution::Resolved { outcome, .. } if outcome.external => {
                    format!("external:{specifier}")
                }
                Resolution::Resolved { outcome, .. } => {
                    let args = LoadArgs::new(outcome.path.clone(), outcome.target_namespace());
                    match hooks.load(&args)? {
                        Loading::Loaded { outcome: loaded, .. } => loaded.contents,
                        Loading::Unhandled => format!("disk:{}", outcome.path),
                    }
                }
            };
            lines.push(line);
        }
        Ok(BuildResult::new(lines.join("\n")))
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn build(&self, request: BuildRequest) -> keel_bundler::Result<BuildResult> {
        self.run(&request.source, &request.hooks)
    }

    async fn transform(&self, request: TransformRequest) -> keel_bundler::Result<BuildResult> {
        self.run(&request.source, &request.hooks)
    }
}

/// A plugin that logs `start:<name>` and resolves `filter` to `<name>.js`.
pub fn logging_plugin(name: &'static str, filter: &str, log: &Log) -> Plugin {
    let on_start = log.clone();
    let on_resolve = log.clone();
    Plugin::builder(name)
        .on_start(move || {
            on_start.push(format!("start:{name}"));
            Ok(())
        })
        .on_resolve(filter, move |args| {
            on_resolve.push(format!("resolve:{name}:{}", args.specifier));
            Ok(keel_plugin::ResolveOutcome::path(format!("/{name}.js")))
        })
        .build()
        .unwrap()
}
