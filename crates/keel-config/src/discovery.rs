//! File-based config discovery
//!
//! Finds a Keel configuration file in a root directory and loads it through
//! [`KeelConfig::load`].

use std::path::{Path, PathBuf};

use crate::config::KeelConfig;
use crate::error::{ConfigError, Result};

/// File names searched, in order.
pub const CONFIG_FILES: &[&str] = &["keel.toml", "keel.json"];

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use keel_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// First existing file among [`CONFIG_FILES`].
    pub fn find(&self) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
    }

    /// Load the discovered file, layered with defaults and `KEEL_` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<KeelConfig> {
        let path = self
            .find()
            .ok_or_else(|| ConfigError::NotFound(self.root.clone()))?;
        tracing::debug!(path = %path.display(), "loading keel config");
        KeelConfig::load(Some(&path))
    }
}

/// Discover and load config from the current directory.
pub fn discover() -> Result<KeelConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(root).load()
}
