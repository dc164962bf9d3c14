//! Namespaces partition the module graph. A module is identified by `(path, namespace)`.

/// The default namespace: modules read from disk.
pub const FILE: &str = "file";
pub const VIRTUAL: &str = "virtual";
pub const HTTP: &str = "http";
pub const HTTPS: &str = "https";
pub const GENERATED: &str = "generated";
pub const TRANSFORMED: &str = "transformed";
pub const EXTERNAL: &str = "external";

/// Non-empty and free of `:` and NUL, so it can be embedded in a module id.
pub fn is_valid(namespace: &str) -> bool {
    !namespace.is_empty() && !namespace.contains([':', '\0'])
}

/// Whether `namespace` denotes on-disk modules. The empty string means the default.
pub fn is_file(namespace: &str) -> bool {
    namespace.is_empty() || namespace == FILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        for ns in [FILE, VIRTUAL, HTTP, HTTPS, GENERATED, TRANSFORMED, EXTERNAL, "global-react"] {
            assert!(is_valid(ns), "{ns}");
        }
        assert!(!is_valid(""));
        assert!(!is_valid("a:b"));
        assert!(!is_valid("nul\0"));
    }

    #[test]
    fn file_namespace() {
        assert!(is_file(""));
        assert!(is_file("file"));
        assert!(!is_file("virtual"));
    }
}
