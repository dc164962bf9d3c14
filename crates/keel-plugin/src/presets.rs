//! Ready-made plugins.

use keel_config::Loader;

use crate::filter::filters;
use crate::hooks::{LoadOutcome, ResolveOutcome};
use crate::plugin::{Plugin, PluginError};

/// Namespace [`react_global`] redirects `react` into.
pub const GLOBAL_REACT_NAMESPACE: &str = "global-react";

/// Replace `import 'react'` with a module re-exporting a global (`window.React`,
/// `GLOBAL_REACT`, ...).
pub fn react_global(global: impl Into<String>) -> Result<Plugin, PluginError> {
    let contents = format!("module.exports = {}", global.into());
    Plugin::builder("react-global")
        .on_resolve(filters::REACT, |args| {
            Ok(ResolveOutcome::path(&args.specifier).in_namespace(GLOBAL_REACT_NAMESPACE))
        })
        .on_load_in(filters::ALL, GLOBAL_REACT_NAMESPACE, move |_| {
            Ok(LoadOutcome::new(contents.clone(), Loader::Js))
        })
        .build()
}

/// Leave every package import un-bundled, keeping the specifier as written.
pub fn externalize_bare_imports() -> Result<Plugin, PluginError> {
    Plugin::builder("externalize-bare-imports")
        .on_resolve(filters::BARE, |_| Ok(ResolveOutcome::external("")))
        .build()
}

/// Serve `contents` for every specifier matching `filter`, inside `namespace`.
pub fn virtual_module(
    name: impl Into<String>,
    filter: &str,
    namespace: &str,
    contents: impl Into<String>,
    loader: Loader,
) -> Result<Plugin, PluginError> {
    let target = namespace.to_string();
    let contents = contents.into();
    Plugin::builder(name)
        .on_resolve(filter, move |args| {
            Ok(ResolveOutcome::path(&args.specifier).in_namespace(target.clone()))
        })
        .on_load_in(filters::ALL, namespace, move |_| {
            Ok(LoadOutcome::new(contents.clone(), loader))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{HookDispatcher, Loading, Resolution};
    use crate::hooks::{LoadArgs, ResolveArgs};
    use std::sync::Arc;

    #[test]
    fn react_global_redirects_and_loads() {
        let dispatcher = HookDispatcher::new([Arc::new(react_global("GLOBAL_REACT").unwrap())]);

        let Resolution::Resolved { outcome, .. } =
            dispatcher.resolve(&ResolveArgs::new("react")).unwrap()
        else {
            panic!("react should be handled");
        };
        assert_eq!(outcome.target_namespace(), GLOBAL_REACT_NAMESPACE);

        let Loading::Loaded { outcome, .. } = dispatcher
            .load(&LoadArgs::new("react", GLOBAL_REACT_NAMESPACE))
            .unwrap()
        else {
            panic!("global-react should load");
        };
        assert_eq!(outcome.contents, "module.exports = GLOBAL_REACT");
        assert_eq!(outcome.loader, Loader::Js);

        assert_eq!(
            dispatcher.resolve(&ResolveArgs::new("react-dom")).unwrap(),
            Resolution::Unhandled
        );
    }

    #[test]
    fn bare_imports_become_external() {
        let dispatcher = HookDispatcher::new([Arc::new(externalize_bare_imports().unwrap())]);
        let Resolution::Resolved { outcome, .. } =
            dispatcher.resolve(&ResolveArgs::new("lodash")).unwrap()
        else {
            panic!("lodash should be handled");
        };
        assert!(outcome.external);
        assert!(outcome.path.is_empty());
        assert_eq!(
            dispatcher.resolve(&ResolveArgs::new("./local")).unwrap(),
            Resolution::Unhandled
        );
    }

    #[test]
    fn virtual_module_serves_contents() {
        let plugin =
            virtual_module("build-info", "^build-info$", "virtual", "export const sha = 'abc'", Loader::Js)
                .unwrap();
        let dispatcher = HookDispatcher::new([Arc::new(plugin)]);
        let loaded = dispatcher.load(&LoadArgs::new("build-info", "virtual")).unwrap();
        assert!(matches!(loaded, Loading::Loaded { ref plugin, .. } if plugin == "build-info"));
    }

    #[test]
    fn virtual_module_rejects_bad_namespace() {
        assert!(virtual_module("x", ".*", "", "", Loader::Js).is_err());
    }
}
