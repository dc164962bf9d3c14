//! Plugin hook pipeline for Keel.
//!
//! Plugins intercept the engine's module resolution and loading. Each plugin is a named,
//! immutable bundle of resolve rules, load rules and optional start/end callbacks.
//! A [`PluginRegistry`] keeps plugins in attachment order; a [`HookDispatcher`] is the
//! per-invocation snapshot that routes requests through them.

pub mod dispatch;
pub mod filter;
pub mod hooks;
pub mod lint;
pub mod namespace;
pub mod plugin;
pub mod presets;
pub mod protocol;
pub mod registry;

pub use dispatch::{HookDispatcher, HookError, HookStage, Loading, Resolution};
pub use filter::{Filter, filters};
pub use hooks::{
    EndArgs, EndHandler, LoadArgs, LoadHandler, LoadOutcome, ResolveArgs, ResolveHandler,
    ResolveKind, ResolveOutcome, StartHandler,
};
pub use lint::{RuleOverlap, find_overlaps};
pub use plugin::{LoadRule, Plugin, PluginBuilder, PluginError, ResolveRule};
pub use presets::{GLOBAL_REACT_NAMESPACE, externalize_bare_imports, react_global, virtual_module};
pub use protocol::{HookRequest, HookResponse};
pub use registry::PluginRegistry;
