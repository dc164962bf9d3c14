//! Rolldown plugin routing `resolve_id` and `load` through the keel hook dispatcher.
//!
//! Module ids outside the `file` namespace are encoded as `\0<namespace>:<path>` so the
//! namespace survives the round trip through Rolldown and is visible to nested imports.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use keel_config::Loader;
use keel_plugin::{
    HookDispatcher, HookError, LoadArgs, Loading, ResolveArgs, ResolveKind, ResolveOutcome,
    Resolution, namespace,
};
use parking_lot::Mutex;
use path_clean::PathClean;
use rolldown_common::side_effects::HookSideEffects;
use rolldown_common::{ImportKind, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext, PluginContextResolveOptions,
};
use rustc_hash::FxHashMap;

use super::convert;
use super::externals::ExternalPolicy;
use crate::diagnostics::Diagnostic;

/// Module id of the source text handed to the invocation.
pub(crate) const STDIN_ID: &str = "<stdin>";

pub(crate) fn encode_id(ns: &str, path: &str) -> String {
    if namespace::is_file(ns) {
        path.to_string()
    } else {
        format!("\0{ns}:{path}")
    }
}

/// `(namespace, path)` of a module id.
pub(crate) fn decode_id(id: &str) -> (&str, &str) {
    id.strip_prefix('\0')
        .and_then(|rest| rest.split_once(':'))
        .unwrap_or((namespace::FILE, id))
}

/// What the bridge decided for one `resolve_id` call.
enum Route {
    Done(HookResolveIdReturn),
    /// Resolve with Rolldown's own resolver, as if imported by `importer`.
    ///
    /// `importer` is a synthetic path inside the resolve directory of a module that has
    /// no location on disk.
    Delegate { importer: PathBuf },
}

/// The source text entry.
#[derive(Debug, Clone)]
pub(crate) struct VirtualEntry {
    pub source: String,
    pub loader: Loader,
    pub resolve_dir: PathBuf,
}

/// Per-invocation state shared between the bridge and the engine.
#[derive(Debug, Default)]
pub(crate) struct BridgeState {
    failure: Mutex<Option<HookError>>,
    warnings: Mutex<Vec<Diagnostic>>,
    module_dirs: Mutex<FxHashMap<String, PathBuf>>,
}

impl BridgeState {
    /// The first hook failure of the run, if any.
    pub(crate) fn take_failure(&self) -> Option<HookError> {
        self.failure.lock().take()
    }

    pub(crate) fn take_warnings(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.warnings.lock())
    }

    fn record(&self, err: HookError) -> anyhow::Error {
        let mut slot = self.failure.lock();
        let reported = anyhow::Error::new(err.clone());
        slot.get_or_insert(err);
        reported
    }

    fn warn(&self, plugin: &str, path: &str, messages: &[String]) {
        if messages.is_empty() {
            return;
        }
        self.warnings.lock().extend(
            messages
                .iter()
                .map(|message| Diagnostic::from_plugin(plugin, path, message.as_str())),
        );
    }
}

#[derive(Debug)]
pub(crate) struct HookBridge {
    hooks: HookDispatcher,
    entry: VirtualEntry,
    externals: ExternalPolicy,
    state: Arc<BridgeState>,
}

impl HookBridge {
    pub(crate) fn new(
        hooks: HookDispatcher,
        entry: VirtualEntry,
        externals: ExternalPolicy,
        state: Arc<BridgeState>,
    ) -> Self {
        Self {
            hooks,
            entry,
            externals,
            state,
        }
    }

    fn route_resolve(&self, specifier: &str, importer: Option<&str>, kind: ResolveKind) -> Route {
        if importer.is_none() && specifier == STDIN_ID {
            return Route::Done(Ok(Some(internal(STDIN_ID.to_string()))));
        }

        let resolve_dir = importer.and_then(|id| self.resolve_dir_of(id));
        let mut args = ResolveArgs::new(specifier).with_kind(kind);
        if let Some(importer) = importer {
            let (ns, path) = decode_id(importer);
            args = args.with_importer(path).in_namespace(ns);
        }
        if let Some(dir) = &resolve_dir {
            args = args.with_resolve_dir(dir.to_string_lossy());
        }

        match self.hooks.resolve(&args) {
            Err(err) => Route::Done(Err(self.state.record(err))),
            Ok(Resolution::Resolved { plugin, outcome }) => {
                self.state.warn(&plugin, specifier, &outcome.warnings);
                Route::Done(Ok(Some(resolved(specifier, &outcome, resolve_dir.as_deref()))))
            }
            Ok(Resolution::Unhandled) => self.fallback(specifier, importer, resolve_dir),
        }
    }

    /// Host-side externals, then imports from modules Rolldown cannot place on disk.
    fn fallback(
        &self,
        specifier: &str,
        importer: Option<&str>,
        resolve_dir: Option<PathBuf>,
    ) -> Route {
        let Some(importer) = importer else {
            return Route::Done(Ok(None));
        };
        if self.externals.is_external(specifier) {
            tracing::trace!(specifier, "external");
            return Route::Done(Ok(Some(external(specifier.to_string()))));
        }
        let on_disk = importer != STDIN_ID && !importer.starts_with('\0');
        match resolve_dir {
            Some(dir) if !on_disk => Route::Delegate {
                importer: dir.join(STDIN_ID),
            },
            _ => Route::Done(Ok(None)),
        }
    }

    fn resolve_dir_of(&self, id: &str) -> Option<PathBuf> {
        if id == STDIN_ID {
            return Some(self.entry.resolve_dir.clone());
        }
        if let Some(dir) = self.state.module_dirs.lock().get(id) {
            return Some(dir.clone());
        }
        match decode_id(id) {
            (ns, path) if namespace::is_file(ns) => {
                Path::new(path).parent().map(Path::to_path_buf)
            }
            _ => None,
        }
    }

    fn route_load(&self, id: &str) -> HookLoadReturn {
        if id == STDIN_ID {
            return Ok(Some(HookLoadOutput {
                code: self.entry.source.clone().into(),
                module_type: Some(convert::module_type(self.entry.loader)),
                ..Default::default()
            }));
        }

        let (ns, path) = decode_id(id);
        match self.hooks.load(&LoadArgs::new(path, ns)) {
            Err(err) => Err(self.state.record(err)),
            Ok(Loading::Unhandled) => Ok(None),
            Ok(Loading::Loaded { plugin, outcome }) => {
                self.state.warn(&plugin, path, &outcome.warnings);
                if let Some(dir) = outcome.resolve_dir {
                    self.state
                        .module_dirs
                        .lock()
                        .insert(id.to_string(), PathBuf::from(dir));
                }
                Ok(Some(HookLoadOutput {
                    code: outcome.contents.into(),
                    module_type: Some(convert::module_type(outcome.loader)),
                    ..Default::default()
                }))
            }
        }
    }
}

impl Plugin for HookBridge {
    fn name(&self) -> Cow<'static, str> {
        "keel-hooks".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let kind = resolve_kind(args.kind, args.is_entry || args.importer.is_none());
        let route = self.route_resolve(args.specifier, args.importer, kind);
        let ctx = ctx.clone();
        let specifier = args.specifier.to_string();
        let import_kind = args.kind;

        async move {
            let importer = match route {
                Route::Done(result) => return result,
                Route::Delegate { importer } => importer,
            };
            let options = PluginContextResolveOptions {
                import_kind,
                skip_self: true,
                ..Default::default()
            };
            let importer = importer.to_string_lossy();
            match ctx.resolve(&specifier, Some(importer.as_ref()), Some(options)).await? {
                Ok(resolved) => Ok(Some(HookResolveIdOutput::from_resolved_id(resolved))),
                Err(err) => {
                    // Rolldown retries on its own and reports the import if that fails too.
                    tracing::trace!(specifier = %specifier, error = %err, "not found from resolve dir");
                    Ok(None)
                }
            }
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id: &str = &args.id;
        let result = self.route_load(id);
        async move { result }
    }
}

/// How the import reached Rolldown, in hook terms.
fn resolve_kind(kind: ImportKind, entry: bool) -> ResolveKind {
    if entry {
        return ResolveKind::EntryPoint;
    }
    match kind {
        ImportKind::Import | ImportKind::HotAccept => ResolveKind::ImportStatement,
        ImportKind::DynamicImport => ResolveKind::DynamicImport,
        ImportKind::Require => ResolveKind::RequireCall,
        ImportKind::AtImport => ResolveKind::ImportRule,
        ImportKind::UrlImport | ImportKind::NewUrl => ResolveKind::UrlToken,
    }
}

fn internal(id: String) -> HookResolveIdOutput {
    HookResolveIdOutput {
        id: id.into(),
        external: Some(ResolvedExternal::Bool(false)),
        ..Default::default()
    }
}

fn external(id: String) -> HookResolveIdOutput {
    HookResolveIdOutput {
        id: id.into(),
        external: Some(ResolvedExternal::Bool(true)),
        ..Default::default()
    }
}

/// Translate a plugin outcome into a Rolldown resolution.
fn resolved(
    specifier: &str,
    outcome: &ResolveOutcome,
    resolve_dir: Option<&Path>,
) -> HookResolveIdOutput {
    if outcome.external {
        let id = if outcome.path.is_empty() {
            specifier
        } else {
            &outcome.path
        };
        return external(id.to_string());
    }

    let ns = outcome.target_namespace();
    let mut output = if namespace::is_file(ns) {
        let path = Path::new(&outcome.path);
        let path = match resolve_dir {
            Some(dir) if path.is_relative() => dir.join(path).clean(),
            _ => path.to_path_buf(),
        };
        internal(path.to_string_lossy().into_owned())
    } else {
        internal(encode_id(ns, &outcome.path))
    };
    output.side_effects = outcome.side_effects.map(|side_effects| {
        if side_effects {
            HookSideEffects::True
        } else {
            HookSideEffects::False
        }
    });
    output
}
