//! Option mapping from keel settings to Rolldown.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use keel_config::{
    BuildSettings, CommonSettings, Format, JsxMode, LegalComments, Loader, OptionEnum, Platform,
    SourceMap, Target, TreeShaking,
};
use regex::Regex;
use rolldown::{OutputFormat, RawMinifyOptions, SourceMapType};
use rolldown_common::{
    BundlerOptions, BundlerTransformOptions, Either, InjectImport, InnerOptions, JsxOptions,
    ModuleType, ResolveOptions, TreeshakeOptions, TsConfig,
};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::{Error, Result};

/// Options that only affect how the host reports diagnostics.
const PRESENTATION: &[&str] = &["color", "log_level", "log_limit", "log_override"];

/// Shared options this engine maps.
const COMMON: &[&str] = &[
    "format",
    "platform",
    "sourcemap",
    "minify_whitespace",
    "minify_identifiers",
    "minify_syntax",
    "banner",
    "footer",
    "global_name",
    "define",
    "tree_shaking",
    "ignore_annotations",
    "pure",
    "keep_names",
    "drop_labels",
    "legal_comments",
    "target",
    "engines",
    "jsx",
    "jsx_factory",
    "jsx_fragment",
    "jsx_import_source",
    "jsx_dev",
    "jsx_side_effects",
];

pub(crate) const BUILD: &[&str] = &[
    "bundle",
    "packages",
    "external",
    "entry_points",
    "abs_working_dir",
    "resolve_dir",
    "loader",
    "sourcefile",
    "splitting",
    "preserve_symlinks",
    "tsconfig",
    "entry_names",
    "chunk_names",
    "asset_names",
    "inject",
];

pub(crate) const TRANSFORM: &[&str] = &["loader", "sourcefile"];

/// A warning listing every explicitly set option this engine ignores, if any.
///
/// `rejected` names mapped options whose current value has no Rolldown equivalent.
pub(crate) fn unsupported(
    explicit: &[&'static str],
    mapped: &[&str],
    rejected: &[&str],
) -> Option<Diagnostic> {
    let ignored: Vec<&str> = explicit
        .iter()
        .copied()
        .filter(|name| {
            rejected.contains(name)
                || (!PRESENTATION.contains(name) && !COMMON.contains(name) && !mapped.contains(name))
        })
        .collect();
    if ignored.is_empty() {
        return None;
    }
    tracing::warn!(options = ?ignored, "options not supported by the rolldown engine");
    Some(Diagnostic::unsupported_options(&ignored))
}

/// Fill in the Rolldown counterparts of the shared options.
///
/// Returns the names of options whose value could not be carried over.
pub(crate) fn apply_common(
    settings: &CommonSettings,
    options: &mut BundlerOptions,
) -> Vec<&'static str> {
    let mut rejected = Vec::new();

    options.name = settings.global_name.clone().filter(|name| !name.is_empty());
    if !settings.define.is_empty() {
        options.define = Some(
            settings
                .define
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        );
    }
    options.keep_names = settings.keep_names;
    if !settings.drop_labels.is_empty() {
        options.drop_labels = Some(settings.drop_labels.clone());
    }
    options.legal_comments = match settings.legal_comments() {
        LegalComments::Default => None,
        LegalComments::None => Some(rolldown_common::LegalComments::None),
        LegalComments::Inline => Some(rolldown_common::LegalComments::Inline),
        LegalComments::Eof | LegalComments::Linked | LegalComments::External => {
            rejected.push("legal_comments");
            None
        }
    };

    let target = targets(settings, &mut rejected);
    let jsx = jsx(settings);
    if target.is_some() || jsx.is_some() {
        options.transform = Some(BundlerTransformOptions {
            target,
            jsx,
            ..Default::default()
        });
    }
    rejected
}

/// Tree shaking follows bundling unless set explicitly.
pub(crate) fn treeshake(settings: &CommonSettings, bundling: bool) -> TreeshakeOptions {
    let enabled = match settings.tree_shaking() {
        TreeShaking::Disabled => false,
        TreeShaking::Enabled => true,
        TreeShaking::Default => bundling,
    };
    if !enabled {
        return TreeshakeOptions::Boolean(false);
    }
    TreeshakeOptions::Option(InnerOptions {
        annotations: Some(!settings.ignore_annotations()),
        manual_pure_functions: (!settings.pure.is_empty())
            .then(|| settings.pure.iter().cloned().collect()),
        ..InnerOptions::default()
    })
}

/// One es version plus any pinned engines, in Rolldown's `chrome58` form.
fn targets(
    settings: &CommonSettings,
    rejected: &mut Vec<&'static str>,
) -> Option<Either<String, Vec<String>>> {
    let mut targets = Vec::new();
    match settings.target() {
        Target::EsNext => {}
        // Rolldown refuses to lower below es2015.
        Target::Es5 => rejected.push("target"),
        es => targets.push(es.as_str().to_string()),
    }
    targets.extend(
        settings
            .engines
            .iter()
            .map(|engine| format!("{}{}", engine.name.as_str(), engine.version)),
    );
    match targets.len() {
        0 => None,
        1 => targets.pop().map(Either::Left),
        _ => Some(Either::Right(targets)),
    }
}

/// `None` leaves Rolldown's own JSX defaults in place.
fn jsx(settings: &CommonSettings) -> Option<Either<String, JsxOptions>> {
    let configured = settings.jsx.is_some()
        || settings.jsx_factory.is_some()
        || settings.jsx_fragment.is_some()
        || settings.jsx_import_source.is_some()
        || settings.jsx_dev.is_some()
        || settings.jsx_side_effects.is_some();
    if !configured {
        return None;
    }
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
    let base = JsxOptions {
        development: Some(settings.jsx_dev()),
        pure: Some(!settings.jsx_side_effects()),
        ..Default::default()
    };
    let options = match settings.jsx() {
        JsxMode::Preserve => return Some(Either::Left("preserve".to_string())),
        JsxMode::Automatic => JsxOptions {
            runtime: Some("automatic".to_string()),
            import_source: non_empty(&settings.jsx_import_source),
            ..base
        },
        JsxMode::Transform => JsxOptions {
            runtime: Some("classic".to_string()),
            pragma: non_empty(&settings.jsx_factory),
            pragma_frag: non_empty(&settings.jsx_fragment),
            ..base
        },
    };
    Some(Either::Right(options))
}

/// Fill in the build-only options. `cwd` anchors relative inject paths.
pub(crate) fn apply_build(
    settings: &BuildSettings,
    cwd: &Path,
    options: &mut BundlerOptions,
) -> Result<()> {
    if let Some(splitting) = settings.splitting {
        options.inline_dynamic_imports = Some(!splitting);
    }
    if settings.preserve_symlinks() {
        options.resolve = Some(ResolveOptions {
            symlinks: Some(false),
            ..Default::default()
        });
    }
    if let Some(tsconfig) = settings.tsconfig.as_deref().filter(|p| !p.is_empty()) {
        options.tsconfig = Some(TsConfig::Manual(PathBuf::from(tsconfig)));
    }
    if let Some(template) = settings.entry_names.as_deref() {
        options.entry_filenames = Some(filename_template(template, ".js").into());
    }
    if let Some(template) = settings.chunk_names.as_deref() {
        options.chunk_filenames = Some(filename_template(template, ".js").into());
    }
    if let Some(template) = settings.asset_names.as_deref() {
        options.asset_filenames = Some(filename_template(template, "[extname]").into());
    }
    if !settings.inject.is_empty() {
        let mut imports = Vec::new();
        for file in &settings.inject {
            imports.extend(inject_file(&cwd.join(file))?);
        }
        options.inject = Some(imports);
    }
    Ok(())
}

/// Rolldown names output by chunk, not by source directory, and wants the extension
/// in the template.
fn filename_template(template: &str, extension: &str) -> String {
    let stripped = template.replace("[dir]/", "").replace("[dir]", "");
    format!("{stripped}{extension}")
}

static EXPORT_DECLARATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"export\s+(?:async\s+)?(?:const|let|var|function\*?|class)\s+([A-Za-z_$][\w$]*)").ok()
});

static EXPORT_LIST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"export\s*\{([^}]*)\}").ok());

/// Each named export of an inject file replaces the free identifier of the same name.
fn inject_file(path: &Path) -> Result<Vec<InjectImport>> {
    let text = std::fs::read_to_string(path).map_err(|err| Error::Configuration {
        message: format!("cannot read inject file '{}': {err}", path.display()),
        hint: Some("inject paths are relative to abs_working_dir".to_string()),
    })?;
    let from = path.to_string_lossy().into_owned();
    Ok(export_names(&text)
        .into_iter()
        .map(|name| InjectImport::named(name, None, from.clone()))
        .collect())
}

fn export_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if let Some(re) = EXPORT_DECLARATION.as_ref() {
        names.extend(re.captures_iter(text).map(|caps| caps[1].to_string()));
    }
    if let Some(re) = EXPORT_LIST.as_ref() {
        for caps in re.captures_iter(text) {
            for item in caps[1].split(',') {
                let exported = item.rsplit(" as ").next().unwrap_or(item).trim();
                if !exported.is_empty() && exported != "default" {
                    names.push(exported.to_string());
                }
            }
        }
    }
    names.dedup();
    names
}

/// `Format::Default` follows the platform: iife for browsers, cjs for node, esm otherwise.
pub(crate) fn output_format(format: Format, platform: Platform) -> OutputFormat {
    match (format, platform) {
        (Format::Esm, _) => OutputFormat::Esm,
        (Format::Cjs, _) => OutputFormat::Cjs,
        (Format::Iife, _) => OutputFormat::Iife,
        (Format::Default, Platform::Browser) => OutputFormat::Iife,
        (Format::Default, Platform::Node) => OutputFormat::Cjs,
        (Format::Default, Platform::Neutral) => OutputFormat::Esm,
    }
}

/// Transforms have no platform-driven default and always emit modules.
pub(crate) fn transform_format(format: Format) -> OutputFormat {
    match format {
        Format::Default | Format::Esm => OutputFormat::Esm,
        Format::Cjs => OutputFormat::Cjs,
        Format::Iife => OutputFormat::Iife,
    }
}

pub(crate) fn platform(platform: Platform) -> rolldown::Platform {
    match platform {
        Platform::Browser => rolldown::Platform::Browser,
        Platform::Node => rolldown::Platform::Node,
        Platform::Neutral => rolldown::Platform::Neutral,
    }
}

pub(crate) fn sourcemap(mode: SourceMap) -> Option<SourceMapType> {
    match mode {
        SourceMap::None => None,
        SourceMap::Inline => Some(SourceMapType::Inline),
        SourceMap::Linked | SourceMap::Both => Some(SourceMapType::File),
        SourceMap::External => Some(SourceMapType::Hidden),
    }
}

/// Rolldown minifies all-or-nothing; partial flags still enable it, with a warning.
pub(crate) fn minify(settings: &CommonSettings) -> (Option<RawMinifyOptions>, Option<Diagnostic>) {
    if !settings.minify_any() {
        return (None, None);
    }
    let flags = [
        settings.minify_whitespace(),
        settings.minify_identifiers(),
        settings.minify_syntax(),
    ];
    let warning = (!flags.iter().all(|on| *on)).then(|| {
        Diagnostic::warning(
            DiagnosticKind::UnsupportedOption,
            "rolldown minifies whitespace, identifiers and syntax together; all three are enabled",
        )
    });
    (Some(RawMinifyOptions::from(true)), warning)
}

pub(crate) fn module_type(loader: Loader) -> ModuleType {
    match loader {
        Loader::Js => ModuleType::Js,
        Loader::Jsx => ModuleType::Jsx,
        Loader::Ts => ModuleType::Ts,
        Loader::Tsx => ModuleType::Tsx,
        Loader::Json => ModuleType::Json,
        Loader::Css | Loader::GlobalCss | Loader::LocalCss => ModuleType::Css,
        Loader::Text => ModuleType::Text,
        Loader::Base64 => ModuleType::Base64,
        Loader::DataUrl => ModuleType::Dataurl,
        Loader::Binary => ModuleType::Binary,
        Loader::Empty => ModuleType::Empty,
        Loader::Copy | Loader::File => ModuleType::Asset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_follows_platform() {
        assert!(matches!(
            output_format(Format::Default, Platform::Browser),
            OutputFormat::Iife
        ));
        assert!(matches!(
            output_format(Format::Default, Platform::Node),
            OutputFormat::Cjs
        ));
        assert!(matches!(
            output_format(Format::Default, Platform::Neutral),
            OutputFormat::Esm
        ));
        assert!(matches!(
            output_format(Format::Esm, Platform::Node),
            OutputFormat::Esm
        ));
        assert!(matches!(transform_format(Format::Default), OutputFormat::Esm));
    }

    #[test]
    fn sourcemap_modes() {
        assert!(sourcemap(SourceMap::None).is_none());
        assert!(matches!(sourcemap(SourceMap::Inline), Some(SourceMapType::Inline)));
        assert!(matches!(sourcemap(SourceMap::External), Some(SourceMapType::Hidden)));
        assert!(matches!(sourcemap(SourceMap::Both), Some(SourceMapType::File)));
    }

    #[test]
    fn partial_minify_warns() {
        let mut settings = CommonSettings::default();
        assert!(minify(&settings).0.is_none());

        settings.set_minify_syntax(true);
        let (options, warning) = minify(&settings);
        assert!(options.is_some());
        assert!(warning.is_some());

        settings.minify();
        assert!(minify(&settings).1.is_none());
    }

    #[test]
    fn unsupported_lists_only_unmapped_options() {
        let warning =
            unsupported(&["format", "log_level", "define", "mangle_props"], BUILD, &[]).unwrap();
        assert_eq!(warning.kind, DiagnosticKind::UnsupportedOption);
        assert_eq!(warning.message, "options ignored by this engine: mangle_props");
        assert!(unsupported(&["bundle", "banner", "target"], BUILD, &[]).is_none());
        assert!(unsupported(&["bundle"], TRANSFORM, &[]).is_some());
        assert!(unsupported(&["target"], BUILD, &["target"]).is_some());
    }

    #[test]
    fn define_and_global_name_are_carried_over() {
        let mut settings = CommonSettings::default();
        settings.set_define("BUILD_FLAG", "\"SUBSTITUTED\"");
        settings.set_global_name("MyLib");
        let mut options = BundlerOptions::default();
        assert!(apply_common(&settings, &mut options).is_empty());

        let define = options.define.unwrap();
        assert_eq!(define.get("BUILD_FLAG").map(String::as_str), Some("\"SUBSTITUTED\""));
        assert_eq!(options.name.as_deref(), Some("MyLib"));
    }

    #[test]
    fn keep_names_and_drop_labels_are_carried_over() {
        let mut settings = CommonSettings::default();
        settings.set_keep_names(true);
        settings.add_drop_label("DEV");
        let mut options = BundlerOptions::default();
        apply_common(&settings, &mut options);
        assert_eq!(options.keep_names, Some(true));
        assert_eq!(options.drop_labels, Some(vec!["DEV".to_string()]));
    }

    #[test]
    fn legal_comments_without_rolldown_mode_are_rejected() {
        let mut settings = CommonSettings::default();
        settings.set_legal_comments(LegalComments::Inline);
        let mut options = BundlerOptions::default();
        assert!(apply_common(&settings, &mut options).is_empty());
        assert!(matches!(options.legal_comments, Some(rolldown_common::LegalComments::Inline)));

        settings.set_legal_comments(LegalComments::Eof);
        let mut options = BundlerOptions::default();
        assert_eq!(apply_common(&settings, &mut options), vec!["legal_comments"]);
        assert!(options.legal_comments.is_none());
    }

    #[test]
    fn target_and_engines_become_one_list() {
        let mut settings = CommonSettings::default();
        settings.set_target(Target::Es2018);
        let mut options = BundlerOptions::default();
        apply_common(&settings, &mut options);
        let transform = options.transform.unwrap();
        assert!(matches!(transform.target, Some(Either::Left(ref t)) if t == "es2018"));
        assert!(transform.jsx.is_none());

        settings.add_engine(keel_config::EngineName::Node, "16");
        let mut options = BundlerOptions::default();
        apply_common(&settings, &mut options);
        let target = options.transform.unwrap().target;
        assert!(matches!(target, Some(Either::Right(ref list)) if list == &["es2018", "node16"]));
    }

    #[test]
    fn es5_target_is_rejected() {
        let mut settings = CommonSettings::default();
        settings.set_target(Target::Es5);
        let mut options = BundlerOptions::default();
        assert_eq!(apply_common(&settings, &mut options), vec!["target"]);
        assert!(options.transform.is_none());
    }

    #[test]
    fn jsx_modes() {
        let mut settings = CommonSettings::default();
        let mut options = BundlerOptions::default();
        apply_common(&settings, &mut options);
        assert!(options.transform.is_none());

        settings.set_jsx(JsxMode::Transform);
        settings.set_jsx_factory("h");
        settings.set_jsx_fragment("Fragment");
        apply_common(&settings, &mut options);
        let jsx = options.transform.take().and_then(|t| t.jsx);
        let Some(Either::Right(jsx)) = jsx else {
            panic!("expected jsx options");
        };
        assert_eq!(jsx.runtime.as_deref(), Some("classic"));
        assert_eq!(jsx.pragma.as_deref(), Some("h"));
        assert_eq!(jsx.pragma_frag.as_deref(), Some("Fragment"));

        settings.set_jsx(JsxMode::Preserve);
        apply_common(&settings, &mut options);
        let jsx = options.transform.take().and_then(|t| t.jsx);
        assert!(matches!(jsx, Some(Either::Left(ref mode)) if mode == "preserve"));
    }

    #[test]
    fn tree_shaking_follows_bundling() {
        let mut settings = CommonSettings::default();
        assert!(matches!(treeshake(&settings, false), TreeshakeOptions::Boolean(false)));
        assert!(matches!(treeshake(&settings, true), TreeshakeOptions::Option(_)));

        settings.set_tree_shaking(TreeShaking::Disabled);
        assert!(matches!(treeshake(&settings, true), TreeshakeOptions::Boolean(false)));

        settings.set_tree_shaking(TreeShaking::Enabled);
        settings.set_ignore_annotations(true);
        settings.add_pure("log");
        let TreeshakeOptions::Option(inner) = treeshake(&settings, false) else {
            panic!("expected tree shaking");
        };
        assert_eq!(inner.annotations, Some(false));
        assert!(inner.manual_pure_functions.unwrap().contains("log"));
    }

    #[test]
    fn build_only_options_are_carried_over() {
        let mut settings = BuildSettings::default();
        settings.set_splitting(true);
        settings.set_preserve_symlinks(true);
        settings.set_tsconfig("tsconfig.app.json");
        settings.set_entry_names("[dir]/[name]-[hash]");
        settings.set_asset_names("assets/[name]");
        let mut options = BundlerOptions::default();
        apply_build(&settings, Path::new("/project"), &mut options).unwrap();

        assert_eq!(options.inline_dynamic_imports, Some(false));
        assert_eq!(options.resolve.and_then(|r| r.symlinks), Some(false));
        assert!(matches!(options.tsconfig, Some(TsConfig::Manual(ref p)) if p == Path::new("tsconfig.app.json")));
        assert!(options.entry_filenames.is_some());
        assert!(options.asset_filenames.is_some());
        assert!(options.chunk_filenames.is_none());
        assert_eq!(filename_template("[dir]/[name]-[hash]", ".js"), "[name]-[hash].js");
        assert_eq!(filename_template("assets/[name]", "[extname]"), "assets/[name][extname]");
    }

    #[test]
    fn inject_reads_exported_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("shim.js"),
            "export const process = { env: {} };\nfunction b() {}\nexport { b as Buffer, b as default };\n",
        )
        .unwrap();
        let mut settings = BuildSettings::default();
        settings.inject.push("shim.js".to_string());
        let mut options = BundlerOptions::default();
        apply_build(&settings, dir.path(), &mut options).unwrap();

        let imported: Vec<String> = options
            .inject
            .unwrap()
            .into_iter()
            .filter_map(|import| match import {
                InjectImport::Named { imported, .. } => Some(imported),
                InjectImport::Namespace { .. } => None,
            })
            .collect();
        assert_eq!(imported, vec!["process", "Buffer"]);
    }

    #[test]
    fn missing_inject_file_is_a_configuration_error() {
        let mut settings = BuildSettings::default();
        settings.inject.push("does-not-exist.js".to_string());
        let err = apply_build(&settings, Path::new("/nowhere"), &mut BundlerOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
