use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::CommonSettings;
use crate::enums::Loader;
use crate::error::Result;
use crate::value::OptionValue;

/// Settings for transforming a single source text without bundling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    #[serde(flatten)]
    pub common: CommonSettings,

    pub sourcefile: Option<String>,
    /// Defaults to `jsx`, unlike builds.
    pub loader: Option<Loader>,
}

scalar_options!(TransformSettings {
    "sourcefile" => sourcefile, set_sourcefile: String = String::new(),
    "loader" => loader, set_loader: Loader = Loader::Jsx,
});

impl TransformSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        match self.set_scalar(name, &value) {
            Some(result) => result,
            None => self.common.set(name, value),
        }
    }

    pub fn get(&self, name: &str) -> Result<OptionValue> {
        match self.lookup_scalar(name) {
            Some((explicit, default)) => Ok(explicit.unwrap_or(default)),
            None => self.common.get(name),
        }
    }

    pub fn is_set(&self, name: &str) -> Result<bool> {
        match self.lookup_scalar(name) {
            Some((explicit, _)) => Ok(explicit.is_some()),
            None => self.common.is_set(name),
        }
    }

    pub fn unset(&mut self, name: &str) -> Result<()> {
        if self.clear_scalar(name) {
            Ok(())
        } else {
            self.common.unset(name)
        }
    }

    pub fn explicit_options(&self) -> Vec<&'static str> {
        let mut names = self.common.explicit_options();
        names.extend(
            Self::SCALAR_OPTIONS
                .iter()
                .copied()
                .filter(|name| matches!(self.lookup_scalar(name), Some((Some(_), _)))),
        );
        names
    }
}

impl Deref for TransformSettings {
    type Target = CommonSettings;

    fn deref(&self) -> &Self::Target {
        &self.common
    }
}

impl DerefMut for TransformSettings {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.common
    }
}
