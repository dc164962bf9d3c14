//! Option combination checks run before any plugin or engine work.

use regex::Regex;

use crate::enums::{Format, JsxMode};
use crate::error::{ConfigError, Result};
use crate::settings::{BuildSettings, CommonSettings, TransformSettings};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator<S> {
    fn validate(&self, settings: &S) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use keel_config::{BuildSettings, ConfigValidator, SchemaValidator};
///
/// let mut settings = BuildSettings::default();
/// settings.set_outfile("out.js").set_outdir("dist");
/// assert!(SchemaValidator.validate(&settings).is_err());
/// ```
pub struct SchemaValidator;

impl ConfigValidator<BuildSettings> for SchemaValidator {
    fn validate(&self, settings: &BuildSettings) -> Result<()> {
        if settings.outfile.is_some() && settings.outdir.is_some() {
            return Err(ConfigError::conflict(
                "cannot use both 'outfile' and 'outdir'",
                "Use 'outfile' for a single output file or 'outdir' for several",
            ));
        }

        if settings.write() && settings.outfile.is_none() && settings.outdir.is_none() {
            return Err(ConfigError::conflict(
                "'write' requires an output location",
                "Set 'outfile' or 'outdir', or turn 'write' off",
            ));
        }

        if settings.splitting() {
            if !settings.bundle() {
                return Err(ConfigError::conflict(
                    "'splitting' requires 'bundle'",
                    "Enable 'bundle' or turn 'splitting' off",
                ));
            }
            if settings.format() != Format::Esm {
                return Err(ConfigError::conflict(
                    "'splitting' currently only works with the 'esm' format",
                    "Set 'format' to 'esm'",
                ));
            }
        }

        for pattern in &settings.external {
            if pattern.matches('*').count() > 1 {
                return Err(ConfigError::conflict(
                    format!("external path '{pattern}' cannot have more than one '*' wildcard"),
                    "Split the pattern into several 'external' entries",
                ));
            }
        }

        non_empty("entry_points", &settings.entry_points)?;
        non_empty("external", &settings.external)?;
        non_empty("inject", &settings.inject)?;

        validate_common(&settings.common)
    }
}

impl ConfigValidator<TransformSettings> for SchemaValidator {
    fn validate(&self, settings: &TransformSettings) -> Result<()> {
        validate_common(&settings.common)
    }
}

fn validate_common(settings: &CommonSettings) -> Result<()> {
    non_empty("pure", &settings.pure)?;

    for (option, pattern) in [
        ("mangle_props", &settings.mangle_props),
        ("reserve_props", &settings.reserve_props),
    ] {
        if let Some(pattern) = pattern {
            Regex::new(pattern).map_err(|e| {
                ConfigError::conflict(
                    format!("invalid regular expression for '{option}': {e}"),
                    "Check the pattern syntax",
                )
            })?;
        }
    }

    if settings.jsx_import_source.is_some() && settings.jsx() != JsxMode::Automatic {
        return Err(ConfigError::conflict(
            "'jsx_import_source' only applies to the automatic JSX runtime",
            "Set 'jsx' to 'automatic'",
        ));
    }

    if settings.define.keys().any(|key| key.trim().is_empty()) {
        return Err(ConfigError::conflict(
            "define keys cannot be empty",
            "Remove the empty key from 'define'",
        ));
    }

    Ok(())
}

fn non_empty(option: &str, entries: &[String]) -> Result<()> {
    if entries.iter().any(|entry| entry.trim().is_empty()) {
        return Err(ConfigError::conflict(
            format!("'{option}' entries cannot be empty"),
            format!("Remove empty strings from the '{option}' list"),
        ));
    }
    Ok(())
}

/// Convenience function for schema validation of build settings.
pub fn validate_build(settings: &BuildSettings) -> Result<()> {
    SchemaValidator.validate(settings)
}

pub fn validate_transform(settings: &TransformSettings) -> Result<()> {
    SchemaValidator.validate(settings)
}
