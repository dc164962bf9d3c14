//! Host-side external decisions, applied after plugins left an import unhandled.

use keel_config::{BuildSettings, Packages};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// `name` matches `name` and `name/...`.
    Package(String),
    /// A single `*` matching any run of characters.
    Wildcard { prefix: String, suffix: String },
}

impl Pattern {
    fn parse(pattern: &str) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => Pattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => Pattern::Package(pattern.to_string()),
        }
    }

    fn matches(&self, specifier: &str) -> bool {
        match self {
            Pattern::Package(name) => {
                specifier == name
                    || specifier
                        .strip_prefix(name.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Pattern::Wildcard { prefix, suffix } => {
                specifier.len() >= prefix.len() + suffix.len()
                    && specifier.starts_with(prefix.as_str())
                    && specifier.ends_with(suffix.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ExternalPolicy {
    patterns: Vec<Pattern>,
    packages: bool,
    everything: bool,
}

impl ExternalPolicy {
    pub(crate) fn for_build(settings: &BuildSettings) -> Self {
        Self {
            patterns: settings.external.iter().map(|p| Pattern::parse(p)).collect(),
            packages: settings.packages() == Packages::External,
            everything: !settings.bundle(),
        }
    }

    /// Transforms never bundle.
    pub(crate) fn everything() -> Self {
        Self {
            everything: true,
            ..Default::default()
        }
    }

    /// Whether a non-entry import stays un-bundled.
    pub(crate) fn is_external(&self, specifier: &str) -> bool {
        self.everything
            || self.patterns.iter().any(|p| p.matches(specifier))
            || (self.packages && is_bare(specifier))
    }
}

pub(crate) fn is_bare(specifier: &str) -> bool {
    !specifier.is_empty()
        && !specifier.starts_with('.')
        && !specifier.starts_with('/')
        && !std::path::Path::new(specifier).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundling(externals: &[&str]) -> BuildSettings {
        let mut settings = BuildSettings::default();
        settings.set_bundle(true);
        for external in externals {
            settings.add_external(*external);
        }
        settings
    }

    #[test]
    fn package_patterns_cover_subpaths() {
        let policy = ExternalPolicy::for_build(&bundling(&["lodash"]));
        assert!(policy.is_external("lodash"));
        assert!(policy.is_external("lodash/fp"));
        assert!(!policy.is_external("lodash-es"));
        assert!(!policy.is_external("./lodash"));
    }

    #[test]
    fn wildcard_patterns() {
        let policy = ExternalPolicy::for_build(&bundling(&["*.png", "@scope/*"]));
        assert!(policy.is_external("./logo.png"));
        assert!(policy.is_external("@scope/ui"));
        assert!(!policy.is_external("@other/ui"));
    }

    #[test]
    fn packages_external_only_covers_bare_specifiers() {
        let mut settings = bundling(&[]);
        settings.set_packages(Packages::External);
        let policy = ExternalPolicy::for_build(&settings);
        assert!(policy.is_external("react"));
        assert!(policy.is_external("@scope/pkg"));
        assert!(!policy.is_external("./local"));
        assert!(!policy.is_external("/abs/path.js"));
    }

    #[test]
    fn without_bundle_every_import_is_external() {
        let policy = ExternalPolicy::for_build(&BuildSettings::default());
        assert!(policy.is_external("./local"));
        assert!(ExternalPolicy::everything().is_external("react"));
    }
}
