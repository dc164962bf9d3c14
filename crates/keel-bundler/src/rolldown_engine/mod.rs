//! [`Engine`] implementation on Rolldown.
//!
//! The source text becomes the virtual entry `<stdin>`; every resolve and load goes
//! through a single Rolldown plugin that forwards to the keel hook dispatcher.

mod bridge;
mod convert;
mod externals;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use keel_config::{BuildSettings, CommonSettings, Loader, TransformSettings};
use keel_plugin::HookDispatcher;
use path_clean::PathClean;
use rolldown::{BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, OutputFormat};
use rolldown_common::Output;
use rolldown_plugin::__inner::SharedPluginable;

use self::bridge::{BridgeState, HookBridge, STDIN_ID, VirtualEntry};
use self::externals::ExternalPolicy;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
use crate::engine::{BuildRequest, Engine, TransformRequest};
use crate::result::{BuildResult, OutputFile};
use crate::{Error, Result};

/// Input name of the `<stdin>` entry chunk.
const STDIN_NAME: &str = "stdin";

#[derive(Debug, Clone, Copy, Default)]
pub struct RolldownEngine;

impl RolldownEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Engine for RolldownEngine {
    fn name(&self) -> &str {
        "rolldown"
    }

    async fn build(&self, request: BuildRequest) -> Result<BuildResult> {
        let plan = Plan::for_build(&request.settings, request.source)?;
        plan.execute(request.hooks).await
    }

    async fn transform(&self, request: TransformRequest) -> Result<BuildResult> {
        let plan = Plan::for_transform(&request.settings, request.source)?;
        plan.execute(request.hooks).await
    }
}

/// Everything one Rolldown run needs, derived from frozen settings.
struct Plan {
    entry: VirtualEntry,
    entry_points: Vec<String>,
    options: BundlerOptions,
    externals: ExternalPolicy,
    banner: Option<String>,
    footer: Option<String>,
    sourcefile: Option<String>,
    /// Imports Rolldown cannot find fail the run instead of staying external.
    bundling: bool,
    warnings: Vec<Diagnostic>,
}

impl Plan {
    fn for_build(settings: &BuildSettings, source: String) -> Result<Self> {
        let cwd = directory(settings.abs_working_dir.as_deref())?;
        let resolve_dir = match settings.resolve_dir.as_deref() {
            Some(dir) => cwd.join(dir).clean(),
            None => cwd.clone(),
        };
        let format = convert::output_format(settings.format(), settings.platform());

        let mut plan = Self::new(
            &settings.common,
            VirtualEntry {
                source,
                loader: settings.loader(),
                resolve_dir,
            },
            format,
            cwd.clone(),
            settings.bundle(),
            (&settings.explicit_options(), convert::BUILD),
        );
        convert::apply_build(settings, &cwd, &mut plan.options)?;
        Ok(plan
            .with_entry_points(settings.entry_points.clone())
            .with_externals(ExternalPolicy::for_build(settings))
            .with_sourcefile(settings.sourcefile.clone()))
    }

    fn for_transform(settings: &TransformSettings, source: String) -> Result<Self> {
        let cwd = directory(None)?;
        let format = convert::transform_format(settings.format());
        let loader: Loader = settings.loader();

        Ok(Self::new(
            &settings.common,
            VirtualEntry {
                source,
                loader,
                resolve_dir: cwd.clone(),
            },
            format,
            cwd,
            false,
            (&settings.explicit_options(), convert::TRANSFORM),
        )
        .with_externals(ExternalPolicy::everything())
        .with_sourcefile(settings.sourcefile.clone()))
    }

    /// The last argument pairs the explicitly set option names with the names the caller maps.
    fn new(
        common: &CommonSettings,
        entry: VirtualEntry,
        format: OutputFormat,
        cwd: PathBuf,
        bundling: bool,
        (explicit, mapped): (&[&'static str], &[&str]),
    ) -> Self {
        let (minify, minify_warning) = convert::minify(common);
        let mut options = BundlerOptions {
            format: Some(format),
            platform: Some(convert::platform(common.platform())),
            sourcemap: convert::sourcemap(common.sourcemap()),
            minify,
            cwd: Some(cwd),
            treeshake: convert::treeshake(common, bundling),
            ..Default::default()
        };
        let rejected = convert::apply_common(common, &mut options);
        let unsupported = convert::unsupported(explicit, mapped, &rejected);
        Self {
            entry,
            entry_points: Vec::new(),
            options,
            externals: ExternalPolicy::default(),
            banner: common.banner.clone().filter(|b| !b.is_empty()),
            footer: common.footer.clone().filter(|f| !f.is_empty()),
            sourcefile: None,
            bundling,
            warnings: unsupported.into_iter().chain(minify_warning).collect(),
        }
    }

    fn with_entry_points(mut self, entry_points: Vec<String>) -> Self {
        self.entry_points = entry_points;
        self
    }

    fn with_externals(mut self, externals: ExternalPolicy) -> Self {
        self.externals = externals;
        self
    }

    fn with_sourcefile(mut self, sourcefile: Option<String>) -> Self {
        self.sourcefile = sourcefile.filter(|s| !s.is_empty());
        self
    }

    async fn execute(self, hooks: HookDispatcher) -> Result<BuildResult> {
        let Plan {
            entry,
            entry_points,
            mut options,
            externals,
            banner,
            footer,
            sourcefile,
            bundling,
            warnings,
        } = self;

        let mut inputs = vec![InputItem {
            name: Some(STDIN_NAME.to_string()),
            import: STDIN_ID.to_string(),
        }];
        inputs.extend(entry_points.into_iter().map(|import| InputItem { name: None, import }));
        options.input = Some(inputs);

        let state = Arc::new(BridgeState::default());
        let bridge = HookBridge::new(hooks, entry, externals, Arc::clone(&state));
        let plugins: Vec<SharedPluginable> = vec![Arc::new(bridge)];

        let generated = async {
            let mut bundler = RolldownBundlerBuilder::default()
                .with_options(options)
                .with_plugins(plugins)
                .build()
                .map_err(|e| Error::from_rolldown_batch(&e))?;
            bundler
                .generate()
                .await
                .map_err(|e| Error::from_rolldown_batch(&e))
        }
        .await;

        // A hook failure explains whatever Rolldown reported after it.
        if let Some(failure) = state.take_failure() {
            return Err(failure.into());
        }
        let bundle = generated.map_err(|err| match err {
            Error::Compilation(mut diagnostics) => {
                for diagnostic in &mut diagnostics {
                    relabel(diagnostic, sourcefile.as_deref());
                }
                Error::Compilation(diagnostics)
            }
            other => other,
        })?;

        let mut engine_warnings: Vec<Diagnostic> =
            bundle.warnings.iter().map(Diagnostic::from_rolldown).collect();
        if bundling {
            let (unresolved, rest): (Vec<_>, Vec<_>) = engine_warnings
                .into_iter()
                .partition(|warning| warning.kind == DiagnosticKind::UnresolvedImport);
            if !unresolved.is_empty() {
                return Err(Error::Compilation(
                    unresolved
                        .into_iter()
                        .map(|mut diagnostic| {
                            diagnostic.severity = DiagnosticSeverity::Error;
                            relabel(&mut diagnostic, sourcefile.as_deref());
                            diagnostic
                        })
                        .collect(),
                ));
            }
            engine_warnings = rest;
        }

        let mut result = BuildResult {
            warnings,
            ..Default::default()
        };
        let mut first_entry = None;
        for output in &bundle.assets {
            let mut contents = output.content_as_bytes().to_vec();
            if let Output::Chunk(chunk) = output {
                let code = wrap(&chunk.code, banner.as_deref(), footer.as_deref());
                let is_stdin = chunk
                    .facade_module_id
                    .as_ref()
                    .is_some_and(|id| id.to_string() == STDIN_ID);
                if is_stdin {
                    result.output_text = code.clone();
                } else if chunk.is_entry && first_entry.is_none() {
                    first_entry = Some(code.clone());
                }
                contents = code.into_bytes();
            }
            result
                .outputs
                .push(OutputFile::new(output.filename().to_string(), contents));
        }
        if result.output_text.is_empty() {
            result.output_text = first_entry.unwrap_or_default();
        }

        result.warnings.extend(state.take_warnings());
        result.warnings.extend(engine_warnings);
        for warning in &mut result.warnings {
            relabel(warning, sourcefile.as_deref());
        }

        tracing::debug!(
            outputs = result.outputs.len(),
            warnings = result.warnings.len(),
            "rolldown run finished"
        );
        Ok(result)
    }
}

/// `explicit` resolved against the process directory, or the process directory itself.
fn directory(explicit: Option<&str>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match explicit {
        Some(dir) => current.join(dir).clean(),
        None => current,
    })
}

fn wrap(code: &str, banner: Option<&str>, footer: Option<&str>) -> String {
    let mut text = String::with_capacity(code.len());
    if let Some(banner) = banner {
        text.push_str(banner);
        text.push('\n');
    }
    text.push_str(code);
    if let Some(footer) = footer {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(footer);
        text.push('\n');
    }
    text
}

/// Show the configured display name instead of `<stdin>`.
fn relabel(diagnostic: &mut Diagnostic, sourcefile: Option<&str>) {
    let Some(name) = sourcefile else {
        return;
    };
    diagnostic.message = diagnostic.message.replace(STDIN_ID, name);
    if diagnostic.file.as_deref() == Some(STDIN_ID) {
        diagnostic.file = Some(name.to_string());
    }
}
