//! Options handed to the invoker: settings plus the attached plugins.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use keel_config::{BuildSettings, TransformSettings};
use keel_plugin::{Plugin, PluginRegistry};

/// Settings of kind `S` with an ordered plugin list.
///
/// Dereferences to the settings, so `options.set("platform", "node")` and
/// `options.set_minify_syntax(true)` work directly.
#[derive(Debug, Clone, Default)]
pub struct Options<S> {
    settings: S,
    plugins: PluginRegistry,
}

pub type BuildOptions = Options<BuildSettings>;
pub type TransformOptions = Options<TransformSettings>;

impl<S: Default> Options<S> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> Options<S> {
    pub fn from_settings(settings: S) -> Self {
        Self {
            settings,
            plugins: PluginRegistry::new(),
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    /// Attach a plugin after the ones already attached.
    pub fn add_plugin(&mut self, plugin: impl Into<Arc<Plugin>>) -> &mut Self {
        self.plugins.add(plugin);
        self
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn clear_plugins(&mut self) -> &mut Self {
        self.plugins.clear();
        self
    }
}

impl<S> From<S> for Options<S> {
    fn from(settings: S) -> Self {
        Self::from_settings(settings)
    }
}

impl<S> Deref for Options<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.settings
    }
}

impl<S> DerefMut for Options<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.settings
    }
}
