//! Top-level configuration: build and transform settings loaded from layered sources.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::settings::{BuildSettings, TransformSettings};

/// Prefix of environment variables merged over file configuration.
pub const ENV_PREFIX: &str = "KEEL_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeelConfig {
    pub build: BuildSettings,
    pub transform: TransformSettings,
}

impl KeelConfig {
    /// Load configuration from layered sources.
    ///
    /// Priority: environment variables > config file > defaults. Environment keys are
    /// split on `__`, so `KEEL_BUILD__PLATFORM=node` sets `build.platform`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::extract(Self::figment(path)?)
    }

    /// The provider stack used by [`KeelConfig::load`], before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = figment.merge(Self::file_provider(path)?);
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn extract(figment: Figment) -> Result<Self> {
        figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: Some(e.to_string()),
        })
    }

    fn file_provider(path: &Path) -> Result<Figment> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            "toml" => Ok(Figment::from(Toml::file(path))),
            "json" => Ok(Figment::from(Json::file(path))),
            other => Err(ConfigError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                other.to_string()
            })),
        }
    }

    /// Create from a `serde_json::Value`, for programmatic config.
    ///
    /// ```
    /// use keel_config::{KeelConfig, Platform};
    /// use serde_json::json;
    ///
    /// let config = KeelConfig::from_value(json!({
    ///     "build": { "bundle": true, "platform": "node", "external": ["fsevents"] }
    /// }))
    /// .unwrap();
    /// assert!(config.build.bundle());
    /// assert_eq!(config.build.platform(), Platform::Node);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }
}
