//! Ordered plugin list attached to an options instance.

use std::sync::Arc;

use crate::dispatch::HookDispatcher;
use crate::lint::{RuleOverlap, find_overlaps};
use crate::plugin::Plugin;

/// Plugins in attachment order. Order is significant: earlier plugins win.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a plugin. The same plugin may be attached to many registries.
    pub fn add(&mut self, plugin: impl Into<Arc<Plugin>>) {
        self.plugins.push(plugin.into());
    }

    pub fn clear(&mut self) {
        self.plugins.clear();
    }

    pub fn plugins(&self) -> &[Arc<Plugin>] {
        &self.plugins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Plugin>> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Snapshot for one invocation; later changes to the registry don't affect it.
    pub fn dispatcher(&self) -> HookDispatcher {
        HookDispatcher::new(self.plugins.iter().cloned())
    }

    pub fn overlaps(&self) -> Vec<RuleOverlap> {
        find_overlaps(&self.plugins)
    }
}

impl FromIterator<Arc<Plugin>> for PluginRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<Plugin>>>(iter: I) -> Self {
        Self {
            plugins: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Plugin {
        Plugin::builder(name).build().unwrap()
    }

    #[test]
    fn keeps_attachment_order() {
        let mut registry = PluginRegistry::new();
        registry.add(named("b"));
        registry.add(named("a"));
        registry.add(named("b"));
        assert_eq!(registry.names(), vec!["b", "a", "b"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn dispatcher_is_a_snapshot() {
        let mut registry = PluginRegistry::new();
        registry.add(named("first"));
        let dispatcher = registry.dispatcher();

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(dispatcher.plugins().len(), 1);
    }

    #[test]
    fn shared_plugin_in_two_registries() {
        let shared = Arc::new(named("shared"));
        let one: PluginRegistry = [shared.clone()].into_iter().collect();
        let mut two = PluginRegistry::new();
        two.add(shared.clone());
        assert!(Arc::ptr_eq(&one.plugins()[0], &two.plugins()[0]));
        assert_eq!(Arc::strong_count(&shared), 3);
    }
}
