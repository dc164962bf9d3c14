//! Plugins: named bundles of lifecycle callbacks and resolve/load rules.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::filter::Filter;
use crate::hooks::{
    EndArgs, EndHandler, LoadArgs, LoadHandler, LoadOutcome, ResolveArgs, ResolveHandler,
    ResolveOutcome, StartHandler,
};
use crate::namespace;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin name cannot be empty")]
    EmptyName,

    #[error("plugin '{plugin}' has an invalid filter /{filter}/: {source}")]
    InvalidFilter {
        plugin: String,
        filter: String,
        #[source]
        source: regex::Error,
    },

    #[error("plugin '{plugin}' uses invalid namespace '{namespace}'")]
    InvalidNamespace { plugin: String, namespace: String },
}

/// A resolve interceptor: filter, optional importer-namespace restriction and handler.
#[derive(Clone)]
pub struct ResolveRule {
    filter: Filter,
    namespace: Option<String>,
    handler: Arc<dyn ResolveHandler>,
}

impl ResolveRule {
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Filter matches the specifier and the restriction (if any) equals the importer namespace.
    pub fn matches(&self, args: &ResolveArgs) -> bool {
        restriction_allows(self.namespace.as_deref(), &args.namespace)
            && self.filter.is_match(&args.specifier)
    }

    pub fn call(&self, args: &ResolveArgs) -> anyhow::Result<ResolveOutcome> {
        self.handler.resolve(args)
    }
}

/// A load interceptor, matched against the module path and namespace.
#[derive(Clone)]
pub struct LoadRule {
    filter: Filter,
    namespace: Option<String>,
    handler: Arc<dyn LoadHandler>,
}

impl LoadRule {
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn matches(&self, args: &LoadArgs) -> bool {
        restriction_allows(self.namespace.as_deref(), &args.namespace)
            && self.filter.is_match(&args.path)
    }

    pub fn call(&self, args: &LoadArgs) -> anyhow::Result<LoadOutcome> {
        self.handler.load(args)
    }
}

fn restriction_allows(restriction: Option<&str>, actual: &str) -> bool {
    match restriction {
        None => true,
        Some(ns) if namespace::is_file(ns) => namespace::is_file(actual),
        Some(ns) => ns == actual,
    }
}

impl fmt::Debug for ResolveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveRule")
            .field("filter", &self.filter)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoadRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRule")
            .field("filter", &self.filter)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// An immutable plugin, shared between invocations as `Arc<Plugin>`.
///
/// ```
/// use keel_config::Loader;
/// use keel_plugin::{LoadOutcome, Plugin, ResolveOutcome};
///
/// let plugin = Plugin::builder("env")
///     .on_resolve(r"^env$", |args| Ok(ResolveOutcome::path(&args.specifier).in_namespace("env")))
///     .on_load_in(r".*", "env", |_| Ok(LoadOutcome::new(r#"{"mode":"dev"}"#, Loader::Json)))
///     .build()
///     .unwrap();
/// assert_eq!(plugin.name(), "env");
/// ```
#[derive(Clone)]
pub struct Plugin {
    name: String,
    on_start: Option<Arc<dyn StartHandler>>,
    on_end: Option<Arc<dyn EndHandler>>,
    resolve_rules: Vec<ResolveRule>,
    load_rules: Vec<LoadRule>,
}

impl Plugin {
    pub fn builder(name: impl Into<String>) -> PluginBuilder {
        PluginBuilder {
            name: name.into(),
            on_start: None,
            on_end: None,
            resolve_rules: Vec::new(),
            load_rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve_rules(&self) -> &[ResolveRule] {
        &self.resolve_rules
    }

    pub fn load_rules(&self) -> &[LoadRule] {
        &self.load_rules
    }

    pub fn has_on_start(&self) -> bool {
        self.on_start.is_some()
    }

    pub fn has_on_end(&self) -> bool {
        self.on_end.is_some()
    }

    pub(crate) fn run_start(&self) -> anyhow::Result<()> {
        match &self.on_start {
            Some(handler) => handler.on_start(),
            None => Ok(()),
        }
    }

    pub(crate) fn run_end(&self, args: &EndArgs) -> anyhow::Result<()> {
        match &self.on_end {
            Some(handler) => handler.on_end(args),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("resolve_rules", &self.resolve_rules)
            .field("load_rules", &self.load_rules)
            .finish()
    }
}

struct PendingRule<H: ?Sized> {
    filter: String,
    namespace: Option<String>,
    handler: Arc<H>,
}

/// Collects callbacks and rules; patterns are compiled once in [`PluginBuilder::build`].
pub struct PluginBuilder {
    name: String,
    on_start: Option<Arc<dyn StartHandler>>,
    on_end: Option<Arc<dyn EndHandler>>,
    resolve_rules: Vec<PendingRule<dyn ResolveHandler>>,
    load_rules: Vec<PendingRule<dyn LoadHandler>>,
}

impl PluginBuilder {
    pub fn on_start<F>(mut self, handler: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_start = Some(Arc::new(handler));
        self
    }

    pub fn on_end<F>(mut self, handler: F) -> Self
    where
        F: Fn(&EndArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_end = Some(Arc::new(handler));
        self
    }

    pub fn on_resolve<F>(self, filter: &str, handler: F) -> Self
    where
        F: Fn(&ResolveArgs) -> anyhow::Result<ResolveOutcome> + Send + Sync + 'static,
    {
        self.resolve_handler(filter, None, Arc::new(handler))
    }

    /// Like [`PluginBuilder::on_resolve`], only for imports from modules in `namespace`.
    pub fn on_resolve_in<F>(self, filter: &str, namespace: &str, handler: F) -> Self
    where
        F: Fn(&ResolveArgs) -> anyhow::Result<ResolveOutcome> + Send + Sync + 'static,
    {
        self.resolve_handler(filter, Some(namespace), Arc::new(handler))
    }

    pub fn on_load<F>(self, filter: &str, handler: F) -> Self
    where
        F: Fn(&LoadArgs) -> anyhow::Result<LoadOutcome> + Send + Sync + 'static,
    {
        self.load_handler(filter, None, Arc::new(handler))
    }

    pub fn on_load_in<F>(self, filter: &str, namespace: &str, handler: F) -> Self
    where
        F: Fn(&LoadArgs) -> anyhow::Result<LoadOutcome> + Send + Sync + 'static,
    {
        self.load_handler(filter, Some(namespace), Arc::new(handler))
    }

    /// Register a resolve rule backed by any [`ResolveHandler`].
    pub fn resolve_handler(
        mut self,
        filter: &str,
        namespace: Option<&str>,
        handler: Arc<dyn ResolveHandler>,
    ) -> Self {
        self.resolve_rules.push(PendingRule {
            filter: filter.to_string(),
            namespace: namespace.map(str::to_string),
            handler,
        });
        self
    }

    pub fn load_handler(
        mut self,
        filter: &str,
        namespace: Option<&str>,
        handler: Arc<dyn LoadHandler>,
    ) -> Self {
        self.load_rules.push(PendingRule {
            filter: filter.to_string(),
            namespace: namespace.map(str::to_string),
            handler,
        });
        self
    }

    pub fn build(self) -> Result<Plugin, PluginError> {
        if self.name.trim().is_empty() {
            return Err(PluginError::EmptyName);
        }

        let name = self.name;
        let resolve_rules = self
            .resolve_rules
            .into_iter()
            .map(|rule| {
                let (filter, namespace) = compile(&name, &rule.filter, rule.namespace)?;
                Ok(ResolveRule {
                    filter,
                    namespace,
                    handler: rule.handler,
                })
            })
            .collect::<Result<Vec<_>, PluginError>>()?;
        let load_rules = self
            .load_rules
            .into_iter()
            .map(|rule| {
                let (filter, namespace) = compile(&name, &rule.filter, rule.namespace)?;
                Ok(LoadRule {
                    filter,
                    namespace,
                    handler: rule.handler,
                })
            })
            .collect::<Result<Vec<_>, PluginError>>()?;

        Ok(Plugin {
            name,
            on_start: self.on_start,
            on_end: self.on_end,
            resolve_rules,
            load_rules,
        })
    }
}

fn compile(
    plugin: &str,
    pattern: &str,
    restriction: Option<String>,
) -> Result<(Filter, Option<String>), PluginError> {
    let filter = Filter::new(pattern).map_err(|source| PluginError::InvalidFilter {
        plugin: plugin.to_string(),
        filter: pattern.to_string(),
        source,
    })?;
    if let Some(ns) = restriction.as_deref().filter(|ns| !namespace::is_valid(ns)) {
        return Err(PluginError::InvalidNamespace {
            plugin: plugin.to_string(),
            namespace: ns.to_string(),
        });
    }
    Ok((filter, restriction))
}
