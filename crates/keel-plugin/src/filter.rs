//! Regular-expression filters for resolve and load rules.

use std::fmt;

use regex::Regex;

/// A compiled rule filter.
///
/// Matching uses search semantics: the pattern may match anywhere in the input unless it
/// is anchored with `^`/`$`.
#[derive(Clone)]
pub struct Filter {
    regex: Regex,
}

impl Filter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// The pattern this filter was compiled from.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter(/{}/)", self.as_str())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Filter {}

/// Commonly used filter patterns.
pub mod filters {
    pub const REACT: &str = r"^react$";
    pub const REACT_DOM: &str = r"^react-dom(/.*)?$";
    /// `./x` and `../x`
    pub const RELATIVE: &str = r"^\.\.?/";
    pub const ABSOLUTE: &str = r"^/";
    /// Package imports: anything not starting with `.` or `/`.
    pub const BARE: &str = r"^[^./]";
    pub const ALL: &str = r".*";
    pub const JS_FILES: &str = r"\.(js|mjs|cjs|jsx)$";
    pub const TS_FILES: &str = r"\.(ts|mts|cts|tsx)$";
    pub const CSS_FILES: &str = r"\.css$";
    pub const JSON_FILES: &str = r"\.json$";
}
