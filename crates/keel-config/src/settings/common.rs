//! Options shared by build and transform invocations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::enums::{
    Charset, Color, DropMode, EngineName, Format, JsxMode, LegalComments, LogLevel,
    MangleQuoted, Platform, SourceMap, SourcesContent, Target, TreeShaking,
};
use crate::error::{ConfigError, Result};
use crate::value::OptionValue;

/// A runtime engine pinned to a minimum version (`chrome` + `"58"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub name: EngineName,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonSettings {
    // Logging
    pub color: Option<Color>,
    pub log_level: Option<LogLevel>,
    pub log_limit: Option<u32>,

    // Source maps
    pub sourcemap: Option<SourceMap>,
    pub source_root: Option<String>,
    pub sources_content: Option<SourcesContent>,

    // Output shape
    pub target: Option<Target>,
    pub platform: Option<Platform>,
    pub format: Option<Format>,
    pub global_name: Option<String>,

    // Minification and mangling
    pub mangle_props: Option<String>,
    pub reserve_props: Option<String>,
    pub mangle_quoted: Option<MangleQuoted>,
    pub drop: Option<DropMode>,
    pub minify_whitespace: Option<bool>,
    pub minify_identifiers: Option<bool>,
    pub minify_syntax: Option<bool>,
    pub line_limit: Option<u32>,
    pub charset: Option<Charset>,
    pub tree_shaking: Option<TreeShaking>,
    pub ignore_annotations: Option<bool>,
    pub legal_comments: Option<LegalComments>,
    pub keep_names: Option<bool>,

    // JSX
    pub jsx: Option<JsxMode>,
    pub jsx_factory: Option<String>,
    pub jsx_fragment: Option<String>,
    pub jsx_import_source: Option<String>,
    pub jsx_dev: Option<bool>,
    pub jsx_side_effects: Option<bool>,

    pub tsconfig_raw: Option<String>,
    pub banner: Option<String>,
    pub footer: Option<String>,

    pub pure: Vec<String>,
    pub drop_labels: Vec<String>,
    pub engines: Vec<Engine>,

    /// Identifier or expression replaced by literal text.
    pub define: IndexMap<String, String>,
    /// Per-message-id log level.
    pub log_override: IndexMap<String, LogLevel>,
    /// Syntax feature name forced on or off.
    pub supported: IndexMap<String, bool>,
}

scalar_options!(CommonSettings {
    "color" => color, set_color: Color = Color::default(),
    "log_level" => log_level, set_log_level: LogLevel = LogLevel::default(),
    "log_limit" => log_limit, set_log_limit: u32 = 0,
    "sourcemap" => sourcemap, set_sourcemap: SourceMap = SourceMap::default(),
    "source_root" => source_root, set_source_root: String = String::new(),
    "sources_content" => sources_content, set_sources_content: SourcesContent = SourcesContent::default(),
    "target" => target, set_target: Target = Target::default(),
    "platform" => platform, set_platform: Platform = Platform::default(),
    "format" => format, set_format: Format = Format::default(),
    "global_name" => global_name, set_global_name: String = String::new(),
    "mangle_props" => mangle_props, set_mangle_props: String = String::new(),
    "reserve_props" => reserve_props, set_reserve_props: String = String::new(),
    "mangle_quoted" => mangle_quoted, set_mangle_quoted: MangleQuoted = MangleQuoted::default(),
    "drop" => drop, set_drop: DropMode = DropMode::default(),
    "minify_whitespace" => minify_whitespace, set_minify_whitespace: bool = false,
    "minify_identifiers" => minify_identifiers, set_minify_identifiers: bool = false,
    "minify_syntax" => minify_syntax, set_minify_syntax: bool = false,
    "line_limit" => line_limit, set_line_limit: u32 = 0,
    "charset" => charset, set_charset: Charset = Charset::default(),
    "tree_shaking" => tree_shaking, set_tree_shaking: TreeShaking = TreeShaking::default(),
    "ignore_annotations" => ignore_annotations, set_ignore_annotations: bool = false,
    "legal_comments" => legal_comments, set_legal_comments: LegalComments = LegalComments::default(),
    "keep_names" => keep_names, set_keep_names: bool = false,
    "jsx" => jsx, set_jsx: JsxMode = JsxMode::default(),
    "jsx_factory" => jsx_factory, set_jsx_factory: String = String::new(),
    "jsx_fragment" => jsx_fragment, set_jsx_fragment: String = String::new(),
    "jsx_import_source" => jsx_import_source, set_jsx_import_source: String = String::new(),
    "jsx_dev" => jsx_dev, set_jsx_dev: bool = false,
    "jsx_side_effects" => jsx_side_effects, set_jsx_side_effects: bool = false,
    "tsconfig_raw" => tsconfig_raw, set_tsconfig_raw: String = String::new(),
    "banner" => banner, set_banner: String = String::new(),
    "footer" => footer, set_footer: String = String::new(),
});

impl CommonSettings {
    /// Set a scalar option by name.
    ///
    /// Fails with [`ConfigError::InvalidOption`] when the value is outside the option's
    /// closed set (or of the wrong type); the previous value is kept in that case.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        self.set_scalar(name, &value)
            .unwrap_or_else(|| Err(ConfigError::UnknownOption(name.to_string())))
    }

    /// Last value set for `name`, or its documented default.
    pub fn get(&self, name: &str) -> Result<OptionValue> {
        let (explicit, default) = self
            .lookup_scalar(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;
        Ok(explicit.unwrap_or(default))
    }

    /// Whether `name` was explicitly set, even if to its default.
    pub fn is_set(&self, name: &str) -> Result<bool> {
        self.lookup_scalar(name)
            .map(|(explicit, _)| explicit.is_some())
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))
    }

    /// Clear an explicitly set scalar so it reads as its default again.
    pub fn unset(&mut self, name: &str) -> Result<()> {
        if self.clear_scalar(name) {
            Ok(())
        } else {
            Err(ConfigError::UnknownOption(name.to_string()))
        }
    }

    /// Names of every option explicitly set, lists and maps included when non-empty.
    pub fn explicit_options(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Self::SCALAR_OPTIONS
            .iter()
            .copied()
            .filter(|name| matches!(self.is_set(name), Ok(true)))
            .collect();
        let collections = [
            ("pure", self.pure.is_empty()),
            ("drop_labels", self.drop_labels.is_empty()),
            ("engines", self.engines.is_empty()),
            ("define", self.define.is_empty()),
            ("log_override", self.log_override.is_empty()),
            ("supported", self.supported.is_empty()),
        ];
        names.extend(
            collections
                .into_iter()
                .filter(|(_, empty)| !empty)
                .map(|(name, _)| name),
        );
        names
    }

    pub fn add_pure(&mut self, name: impl Into<String>) -> &mut Self {
        self.pure.push(name.into());
        self
    }

    pub fn add_drop_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.drop_labels.push(label.into());
        self
    }

    pub fn add_engine(&mut self, name: EngineName, version: impl Into<String>) -> &mut Self {
        self.engines.push(Engine {
            name,
            version: version.into(),
        });
        self
    }

    pub fn set_define(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.define.insert(key.into(), value.into());
        self
    }

    pub fn set_log_override(&mut self, pattern: impl Into<String>, level: LogLevel) -> &mut Self {
        self.log_override.insert(pattern.into(), level);
        self
    }

    pub fn set_supported_feature(&mut self, feature: impl Into<String>, enabled: bool) -> &mut Self {
        self.supported.insert(feature.into(), enabled);
        self
    }

    /// True when any of the three minify flags is on.
    pub fn minify_any(&self) -> bool {
        self.minify_whitespace() || self.minify_identifiers() || self.minify_syntax()
    }

    /// Turn on all three minify flags.
    pub fn minify(&mut self) -> &mut Self {
        self.minify_whitespace = Some(true);
        self.minify_identifiers = Some(true);
        self.minify_syntax = Some(true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_distinguishes_default_from_unset() {
        let mut settings = CommonSettings::default();
        assert!(!settings.is_set("platform").unwrap());
        assert_eq!(settings.get("platform").unwrap(), OptionValue::from("browser"));

        settings.set("platform", "browser").unwrap();
        assert!(settings.is_set("platform").unwrap());
        assert_eq!(settings.platform(), Platform::Browser);
    }

    #[test]
    fn invalid_enum_keeps_previous_value() {
        let mut settings = CommonSettings::default();
        settings.set("format", "esm").unwrap();

        let err = settings.set("format", "amd").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }));
        assert_eq!(settings.format(), Format::Esm);
    }

    #[test]
    fn wrong_type_is_invalid_option() {
        let mut settings = CommonSettings::default();
        assert!(matches!(
            settings.set("minify_syntax", "yes"),
            Err(ConfigError::InvalidOption { .. })
        ));
        assert!(matches!(
            settings.set("line_limit", -4i64),
            Err(ConfigError::InvalidOption { .. })
        ));
        assert_eq!(settings.minify_syntax, None);
    }

    #[test]
    fn unknown_option_name() {
        let mut settings = CommonSettings::default();
        assert!(matches!(
            settings.set("minify_everything", true),
            Err(ConfigError::UnknownOption(name)) if name == "minify_everything"
        ));
        assert!(settings.get("nope").is_err());
    }

    #[test]
    fn enum_accepts_wire_code() {
        let mut settings = CommonSettings::default();
        settings.set("target", 3i64).unwrap();
        assert_eq!(settings.target(), Target::Es2015);
        assert_eq!(settings.get("target").unwrap(), OptionValue::from("es2015"));
    }

    #[test]
    fn unset_restores_default() {
        let mut settings = CommonSettings::default();
        settings.set("charset", "utf8").unwrap();
        settings.set_define("DEBUG", "false");
        settings.unset("charset").unwrap();
        assert!(!settings.is_set("charset").unwrap());
        assert_eq!(settings.define.get("DEBUG").map(String::as_str), Some("false"));
    }

    #[test]
    fn maps_are_last_write_wins() {
        let mut settings = CommonSettings::default();
        settings
            .set_define("process.env.NODE_ENV", "\"development\"")
            .set_define("VERSION", "1")
            .set_define("process.env.NODE_ENV", "\"production\"");
        assert_eq!(settings.define.len(), 2);
        assert_eq!(settings.define["process.env.NODE_ENV"], "\"production\"");

        settings
            .set_log_override("css-syntax-error", LogLevel::Warning)
            .set_log_override("css-syntax-error", LogLevel::Silent);
        assert_eq!(settings.log_override["css-syntax-error"], LogLevel::Silent);

        settings
            .set_supported_feature("bigint", true)
            .set_supported_feature("bigint", false);
        assert_eq!(settings.supported.len(), 1);
        assert!(!settings.supported["bigint"]);
    }

    #[test]
    fn explicit_options_lists_set_names_in_order() {
        let mut settings = CommonSettings::default();
        settings.set("jsx_factory", "h").unwrap();
        settings.set("color", "never").unwrap();
        settings.add_pure("console.log");
        assert_eq!(settings.explicit_options(), vec!["color", "jsx_factory", "pure"]);
    }
}
