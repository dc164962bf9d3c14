//! Build-only options.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::CommonSettings;
use crate::enums::{Loader, Packages};
use crate::error::Result;
use crate::value::OptionValue;

/// Settings for a build (bundling) invocation.
///
/// Dereferences to [`CommonSettings`] for the options shared with transforms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    #[serde(flatten)]
    pub common: CommonSettings,

    pub bundle: Option<bool>,
    pub write: Option<bool>,
    pub splitting: Option<bool>,
    pub preserve_symlinks: Option<bool>,
    pub metafile: Option<bool>,
    pub allow_overwrite: Option<bool>,

    pub outfile: Option<String>,
    pub outdir: Option<String>,
    pub outbase: Option<String>,
    pub abs_working_dir: Option<String>,
    pub public_path: Option<String>,
    pub tsconfig: Option<String>,
    pub entry_names: Option<String>,
    pub chunk_names: Option<String>,
    pub asset_names: Option<String>,
    pub packages: Option<Packages>,

    /// Loader for the source text passed to `build`.
    pub loader: Option<Loader>,
    /// Display name of the source text in diagnostics.
    pub sourcefile: Option<String>,
    /// Directory relative imports in the source text resolve against.
    pub resolve_dir: Option<String>,

    pub entry_points: Vec<String>,
    pub external: Vec<String>,
    pub inject: Vec<String>,
}

scalar_options!(BuildSettings {
    "bundle" => bundle, set_bundle: bool = false,
    "write" => write, set_write: bool = false,
    "splitting" => splitting, set_splitting: bool = false,
    "preserve_symlinks" => preserve_symlinks, set_preserve_symlinks: bool = false,
    "metafile" => metafile, set_metafile: bool = false,
    "allow_overwrite" => allow_overwrite, set_allow_overwrite: bool = false,
    "outfile" => outfile, set_outfile: String = String::new(),
    "outdir" => outdir, set_outdir: String = String::new(),
    "outbase" => outbase, set_outbase: String = String::new(),
    "abs_working_dir" => abs_working_dir, set_abs_working_dir: String = String::new(),
    "public_path" => public_path, set_public_path: String = String::new(),
    "tsconfig" => tsconfig, set_tsconfig: String = String::new(),
    "entry_names" => entry_names, set_entry_names: String = String::new(),
    "chunk_names" => chunk_names, set_chunk_names: String = String::new(),
    "asset_names" => asset_names, set_asset_names: String = String::new(),
    "packages" => packages, set_packages: Packages = Packages::default(),
    "loader" => loader, set_loader: Loader = Loader::Js,
    "sourcefile" => sourcefile, set_sourcefile: String = String::new(),
    "resolve_dir" => resolve_dir, set_resolve_dir: String = String::new(),
});

impl BuildSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar option by name, build-only or shared.
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

    /// Every explicitly set option: shared ones first, then build-only ones.
    pub fn explicit_options(&self) -> Vec<&'static str> {
        let mut names = self.common.explicit_options();
        names.extend(
            Self::SCALAR_OPTIONS
                .iter()
                .copied()
                .filter(|name| matches!(self.lookup_scalar(name), Some((Some(_), _)))),
        );
        let collections = [
            ("entry_points", self.entry_points.is_empty()),
            ("external", self.external.is_empty()),
            ("inject", self.inject.is_empty()),
        ];
        names.extend(
            collections
                .into_iter()
                .filter(|(_, empty)| !empty)
                .map(|(name, _)| name),
        );
        names
    }

    pub fn add_entry_point(&mut self, entry: impl Into<String>) -> &mut Self {
        self.entry_points.push(entry.into());
        self
    }

    pub fn add_external(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.external.push(pattern.into());
        self
    }

    pub fn add_inject(&mut self, path: impl Into<String>) -> &mut Self {
        self.inject.push(path.into());
        self
    }

    /// Every scalar option name accepted by [`BuildSettings::set`].
    pub fn option_names() -> impl Iterator<Item = &'static str> {
        CommonSettings::SCALAR_OPTIONS
            .iter()
            .chain(Self::SCALAR_OPTIONS)
            .copied()
    }
}

impl Deref for BuildSettings {
    type Target = CommonSettings;

    fn deref(&self) -> &Self::Target {
        &self.common
    }
}

impl DerefMut for BuildSettings {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.common
    }
}
