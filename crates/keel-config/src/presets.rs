//! Ready-made JSX settings for common frameworks.
//!
//! ```
//! use keel_config::{Loader, TransformSettings};
//!
//! let mut settings = TransformSettings::react_typescript();
//! settings.production();
//! assert_eq!(settings.loader(), Loader::Tsx);
//! assert!(settings.minify_any());
//! ```

use crate::enums::Loader;
use crate::settings::{CommonSettings, TransformSettings};

impl TransformSettings {
    /// Classic React runtime.
    pub fn react() -> Self {
        Self::custom("React.createElement", "React.Fragment")
    }

    pub fn preact() -> Self {
        Self::custom("h", "Fragment")
    }

    pub fn vue() -> Self {
        Self::custom("h", "Fragment")
    }

    /// React with the `tsx` loader and preserved function names.
    pub fn react_typescript() -> Self {
        let mut settings = Self::react();
        settings.set_loader(Loader::Tsx);
        settings.set_keep_names(true);
        settings
    }

    pub fn custom(factory: impl Into<String>, fragment: impl Into<String>) -> Self {
        let mut settings = Self::default();
        settings.set_jsx_factory(factory).set_jsx_fragment(fragment);
        settings
    }
}

impl CommonSettings {
    pub fn production(&mut self) -> &mut Self {
        self.minify()
    }

    pub fn development(&mut self) -> &mut Self {
        self.set_jsx_dev(true).set_keep_names(true)
    }
}
