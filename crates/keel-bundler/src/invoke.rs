//! Invocation driver.
//!
//! One invocation runs, in order: option checks, the overlap lint, on-start callbacks,
//! the engine (which routes resolve/load through the plugins), then on-end callbacks.
//! The options are borrowed immutably and snapshotted, so an options value and its
//! plugins can be reused for further invocations.

use std::future::Future;
use std::sync::Arc;

use keel_config::{BuildSettings, ConfigValidator, SchemaValidator, TransformSettings};
use keel_plugin::{EndArgs, HookDispatcher, RuleOverlap};

use crate::Result;
use crate::diagnostics::Diagnostic;
use crate::engine::{Engine, Request};
use crate::options::{BuildOptions, Options, TransformOptions};
use crate::result::BuildResult;
use crate::rolldown_engine::RolldownEngine;

/// Build `source` with the Rolldown engine.
pub async fn build(source: impl Into<String>, options: &BuildOptions) -> Result<BuildResult> {
    Invoker::new(RolldownEngine::new()).build(source, options).await
}

/// Transform `source` with the Rolldown engine.
pub async fn transform(
    source: impl Into<String>,
    options: &TransformOptions,
) -> Result<BuildResult> {
    Invoker::new(RolldownEngine::new())
        .transform(source, options)
        .await
}

/// Runs invocations against an [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct Invoker<E> {
    engine: E,
}

impl<E: Engine> Invoker<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub async fn build(
        &self,
        source: impl Into<String>,
        options: &BuildOptions,
    ) -> Result<BuildResult> {
        let (request, overlaps) = prepare::<BuildSettings>(source.into(), options)?;
        tracing::debug!(engine = self.engine.name(), "starting build");
        drive(request.hooks.clone(), overlaps, self.engine.build(request)).await
    }

    pub async fn transform(
        &self,
        source: impl Into<String>,
        options: &TransformOptions,
    ) -> Result<BuildResult> {
        let (request, overlaps) = prepare::<TransformSettings>(source.into(), options)?;
        tracing::debug!(engine = self.engine.name(), "starting transform");
        drive(request.hooks.clone(), overlaps, self.engine.transform(request)).await
    }
}

fn prepare<S>(source: String, options: &Options<S>) -> Result<(Request<S>, Vec<RuleOverlap>)>
where
    S: Clone,
    SchemaValidator: ConfigValidator<S>,
{
    SchemaValidator.validate(options.settings())?;

    let overlaps = options.plugins().overlaps();
    for overlap in &overlaps {
        tracing::warn!("{overlap}");
    }

    let request = Request {
        source,
        settings: Arc::new(options.settings().clone()),
        hooks: options.plugins().dispatcher(),
    };
    Ok((request, overlaps))
}

/// Start callbacks, the engine call, end callbacks.
///
/// The engine future is only polled after every start callback succeeded.
async fn drive(
    hooks: HookDispatcher,
    overlaps: Vec<RuleOverlap>,
    engine: impl Future<Output = Result<BuildResult>>,
) -> Result<BuildResult> {
    hooks.run_start()?;

    let outcome = engine.await.map(|mut result| {
        result
            .warnings
            .splice(0..0, overlaps.iter().map(Diagnostic::from_overlap));
        result
    });

    let end_args = EndArgs {
        succeeded: outcome.is_ok(),
        warning_count: outcome.as_ref().map_or(0, |result| result.warnings.len()),
    };
    let ended = hooks.run_end(&end_args);

    match outcome {
        Ok(result) => {
            ended?;
            Ok(result)
        }
        Err(err) => {
            if let Err(end_err) = ended {
                tracing::debug!("on-end failure after a failed invocation: {end_err}");
            }
            Err(err)
        }
    }
}

