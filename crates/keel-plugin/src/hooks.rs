//! Hook arguments, outcomes and handler traits.

use keel_config::Loader;
use serde::{Deserialize, Serialize};

use crate::namespace;

/// Why a specifier is being resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolveKind {
    EntryPoint,
    #[default]
    ImportStatement,
    RequireCall,
    DynamicImport,
    RequireResolve,
    ImportRule,
    ComposesFrom,
    UrlToken,
}

/// A resolution request offered to resolve rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveArgs {
    /// The import specifier as written.
    pub specifier: String,
    /// Path of the importing module, absent for entry points.
    #[serde(default)]
    pub importer: Option<String>,
    /// Namespace of the importing module.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub resolve_dir: Option<String>,
    #[serde(default)]
    pub kind: ResolveKind,
}

fn default_namespace() -> String {
    namespace::FILE.to_string()
}

impl ResolveArgs {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            importer: None,
            namespace: default_namespace(),
            resolve_dir: None,
            kind: ResolveKind::default(),
        }
    }

    pub fn with_importer(mut self, importer: impl Into<String>) -> Self {
        self.importer = Some(importer.into());
        self
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_resolve_dir(mut self, dir: impl Into<String>) -> Self {
        self.resolve_dir = Some(dir.into());
        self
    }

    pub fn with_kind(mut self, kind: ResolveKind) -> Self {
        self.kind = kind;
        self
    }
}

/// What a resolve rule decided.
///
/// With `external` set and an empty `path`, the original specifier is kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOutcome {
    pub path: String,
    /// Target namespace; `None` means `file`.
    pub namespace: Option<String>,
    pub external: bool,
    pub side_effects: Option<bool>,
    pub warnings: Vec<String>,
}

impl ResolveOutcome {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn external(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            external: true,
            ..Self::default()
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_side_effects(mut self, side_effects: bool) -> Self {
        self.side_effects = Some(side_effects);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Namespace the resolved module lives in.
    pub fn target_namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(namespace::FILE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadArgs {
    pub path: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl LoadArgs {
    pub fn new(path: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
        }
    }
}

/// Module contents produced by a load rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub contents: String,
    #[serde(default)]
    pub loader: Loader,
    /// Directory imports inside these contents resolve against.
    #[serde(default)]
    pub resolve_dir: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl LoadOutcome {
    pub fn new(contents: impl Into<String>, loader: Loader) -> Self {
        Self {
            contents: contents.into(),
            loader,
            resolve_dir: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_resolve_dir(mut self, dir: impl Into<String>) -> Self {
        self.resolve_dir = Some(dir.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Passed to on-end callbacks once the engine returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndArgs {
    pub succeeded: bool,
    pub warning_count: usize,
}

pub trait StartHandler: Send + Sync {
    fn on_start(&self) -> anyhow::Result<()>;
}

pub trait ResolveHandler: Send + Sync {
    fn resolve(&self, args: &ResolveArgs) -> anyhow::Result<ResolveOutcome>;
}

pub trait LoadHandler: Send + Sync {
    fn load(&self, args: &LoadArgs) -> anyhow::Result<LoadOutcome>;
}

pub trait EndHandler: Send + Sync {
    fn on_end(&self, args: &EndArgs) -> anyhow::Result<()>;
}

impl<F> StartHandler for F
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    fn on_start(&self) -> anyhow::Result<()> {
        self()
    }
}

impl<F> ResolveHandler for F
where
    F: Fn(&ResolveArgs) -> anyhow::Result<ResolveOutcome> + Send + Sync,
{
    fn resolve(&self, args: &ResolveArgs) -> anyhow::Result<ResolveOutcome> {
        self(args)
    }
}

impl<F> LoadHandler for F
where
    F: Fn(&LoadArgs) -> anyhow::Result<LoadOutcome> + Send + Sync,
{
    fn load(&self, args: &LoadArgs) -> anyhow::Result<LoadOutcome> {
        self(args)
    }
}

impl<F> EndHandler for F
where
    F: Fn(&EndArgs) -> anyhow::Result<()> + Send + Sync,
{
    fn on_end(&self, args: &EndArgs) -> anyhow::Result<()> {
        self(args)
    }
}
