//! Hook pipeline ordering and fallback behavior.

use std::sync::{Arc, Mutex};

use keel_config::Loader;
use keel_plugin::{
    EndArgs, HookError, LoadArgs, LoadOutcome, Loading, Plugin, PluginRegistry, ResolveArgs,
    ResolveOutcome, Resolution,
};

fn resolver(name: &'static str, filter: &str, path: &'static str) -> Plugin {
    Plugin::builder(name)
        .on_resolve(filter, move |_| Ok(ResolveOutcome::path(path)))
        .build()
        .unwrap()
}

#[test]
fn first_attached_plugin_wins() {
    let mut registry = PluginRegistry::new();
    registry.add(resolver("p1", "^shared$", "/from/p1.js"));
    registry.add(resolver("p2", "^shared$", "/from/p2.js"));

    let resolution = registry
        .dispatcher()
        .resolve(&ResolveArgs::new("shared"))
        .unwrap();
    assert_eq!(
        resolution,
        Resolution::Resolved {
            plugin: "p1".into(),
            outcome: ResolveOutcome::path("/from/p1.js"),
        }
    );
}

#[test]
fn reversed_attachment_reverses_winner() {
    let mut registry = PluginRegistry::new();
    registry.add(resolver("p2", "^shared$", "/from/p2.js"));
    registry.add(resolver("p1", "^shared$", "/from/p1.js"));

    let Resolution::Resolved { plugin, .. } = registry
        .dispatcher()
        .resolve(&ResolveArgs::new("shared"))
        .unwrap()
    else {
        panic!("expected a match");
    };
    assert_eq!(plugin, "p2");
    assert_eq!(registry.overlaps().len(), 1);
}

#[test]
fn rule_order_inside_plugin() {
    let plugin = Plugin::builder("ordered")
        .on_resolve("^lib", |_| Ok(ResolveOutcome::path("/general.js")))
        .on_resolve("^lib/special$", |_| Ok(ResolveOutcome::path("/special.js")))
        .build()
        .unwrap();
    let mut registry = PluginRegistry::new();
    registry.add(plugin);

    let Resolution::Resolved { outcome, .. } = registry
        .dispatcher()
        .resolve(&ResolveArgs::new("lib/special"))
        .unwrap()
    else {
        panic!("expected a match");
    };
    assert_eq!(outcome.path, "/general.js");
}

#[test]
fn namespace_restricted_rule_only_sees_its_importers() {
    let plugin = Plugin::builder("http")
        .on_resolve_in(".*", "http", |args| {
            let base = args.importer.clone().unwrap_or_default();
            Ok(ResolveOutcome::path(format!("{base}/{}", args.specifier)).in_namespace("http"))
        })
        .build()
        .unwrap();
    let mut registry = PluginRegistry::new();
    registry.add(plugin);
    let dispatcher = registry.dispatcher();

    assert_eq!(
        dispatcher.resolve(&ResolveArgs::new("./dep.js")).unwrap(),
        Resolution::Unhandled
    );

    let from_http = ResolveArgs::new("dep.js")
        .with_importer("http://cdn")
        .in_namespace("http");
    let Resolution::Resolved { outcome, .. } = dispatcher.resolve(&from_http).unwrap() else {
        panic!("expected a match");
    };
    assert_eq!(outcome.path, "http://cdn/dep.js");
    assert_eq!(outcome.target_namespace(), "http");
}

#[test]
fn virtual_namespace_without_loader_is_fatal() {
    let plugin = Plugin::builder("redirect")
        .on_resolve("^x$", |_| Ok(ResolveOutcome::path("x").in_namespace("virtual")))
        .build()
        .unwrap();
    let mut registry = PluginRegistry::new();
    registry.add(plugin);

    let err = registry
        .dispatcher()
        .load(&LoadArgs::new("x", "virtual"))
        .unwrap_err();
    assert!(matches!(err, HookError::UnresolvedLoad { .. }));
    assert_eq!(err.to_string(), "no plugin loaded 'x' in namespace 'virtual'");
}

#[test]
fn file_namespace_without_loader_falls_back() {
    let registry = PluginRegistry::new();
    let loading = registry
        .dispatcher()
        .load(&LoadArgs::new("/src/app.js", "file"))
        .unwrap();
    assert_eq!(loading, Loading::Unhandled);
}

#[test]
fn start_callbacks_run_once_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = PluginRegistry::new();
    for name in ["one", "two"] {
        let log = log.clone();
        registry.add(
            Plugin::builder(name)
                .on_start(move || {
                    log.lock().unwrap().push(name);
                    Ok(())
                })
                .build()
                .unwrap(),
        );
    }

    registry.dispatcher().run_start().unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
}

#[test]
fn failing_start_names_the_plugin() {
    let mut registry = PluginRegistry::new();
    registry.add(
        Plugin::builder("needs-network")
            .on_start(|| anyhow::bail!("offline"))
            .build()
            .unwrap(),
    );
    let err = registry.dispatcher().run_start().unwrap_err();
    assert_eq!(
        err,
        HookError::PluginStartFailed {
            plugin: "needs-network".into(),
            message: "offline".into(),
        }
    );
}

#[test]
fn handlers_may_run_repeatedly() {
    let plugin = Plugin::builder("pure")
        .on_load(r"\.txt$", |args| {
            Ok(LoadOutcome::new(format!("contents of {}", args.path), Loader::Text))
        })
        .on_end(|args| {
            anyhow::ensure!(args.succeeded, "build failed");
            Ok(())
        })
        .build()
        .unwrap();
    let mut registry = PluginRegistry::new();
    registry.add(plugin);
    let dispatcher = registry.dispatcher();

    let args = LoadArgs::new("/notes.txt", "file");
    let first = dispatcher.load(&args).unwrap();
    let second = dispatcher.load(&args).unwrap();
    assert_eq!(first, second);

    assert!(dispatcher
        .run_end(&EndArgs {
            succeeded: false,
            warning_count: 0
        })
        .is_err());
}
