//! Closed option enumerations.
//!
//! Every enumeration has a canonical name, a small integer wire code matching the
//! engine's numbering, and exactly one default. Unknown names and codes map to `None`
//! so callers can detect engine/host version skew instead of silently getting a default.

use thiserror::Error;

use crate::error::Result as ConfigResult;
use crate::settings::OptionType;
use crate::value::{OptionValue, decode_enum};

/// Shared surface of every option enumeration.
pub trait OptionEnum: Copy + Eq + Sized + 'static {
    /// Name of the enumeration, used in error messages.
    const KIND: &'static str;

    fn all() -> &'static [Self];

    /// Canonical external name.
    fn as_str(self) -> &'static str;

    /// Wire code understood by the engine.
    fn code(self) -> u8;

    /// Case-insensitive lookup by name or alias.
    fn from_name(name: &str) -> Option<Self>;

    fn from_code(code: u8) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.code() == code)
    }

    /// Comma separated list of accepted names.
    fn expected() -> String {
        Self::all()
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Returned by `FromStr` for an unknown enumeration name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $kind:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $text:literal => $code:literal
            ),+ $(,)?
        }
        default $default:ident;
        $(aliases { $($alias:literal => $target:ident),* $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl OptionEnum for $name {
            const KIND: &'static str = $kind;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                let name = name.trim().to_ascii_lowercase();
                $($(
                    if name == $alias {
                        return Some($name::$target);
                    }
                )*)?
                Self::ALL.iter().copied().find(|v| v.as_str() == name)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| ParseEnumError {
                    kind: $kind,
                    value: s.to_string(),
                    expected: Self::expected(),
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(<D::Error as serde::de::Error>::custom)
            }
        }

        impl From<$name> for OptionValue {
            fn from(value: $name) -> Self {
                OptionValue::Str(value.as_str().to_string())
            }
        }

        impl OptionType for $name {
            fn decode(option: &str, value: &OptionValue) -> ConfigResult<Self> {
                decode_enum(option, value)
            }
        }
    };
}

option_enum! {
    /// Target runtime environment.
    pub enum Platform: "platform" {
        Browser = "browser" => 0,
        Node = "node" => 1,
        Neutral = "neutral" => 2,
    }
    default Browser;
}

option_enum! {
    /// Output module format.
    ///
    /// `Default` lets the engine pick from the platform.
    pub enum Format: "format" {
        Default = "default" => 0,
        Iife = "iife" => 1,
        Cjs = "cjs" => 2,
        Esm = "esm" => 3,
    }
    default Default;
    aliases { "" => Default, "commonjs" => Cjs }
}

option_enum! {
    /// Language level the output must run on.
    pub enum Target: "target" {
        EsNext = "esnext" => 1,
        Es5 = "es5" => 2,
        Es2015 = "es2015" => 3,
        Es2016 = "es2016" => 4,
        Es2017 = "es2017" => 5,
        Es2018 = "es2018" => 6,
        Es2019 = "es2019" => 7,
        Es2020 = "es2020" => 8,
        Es2021 = "es2021" => 9,
        Es2022 = "es2022" => 10,
        Es2023 = "es2023" => 11,
        Es2024 = "es2024" => 12,
    }
    default EsNext;
    aliases { "es6" => Es2015 }
}

option_enum! {
    /// Source map emission mode.
    pub enum SourceMap: "source map mode" {
        None = "none" => 0,
        Inline = "inline" => 1,
        /// Separate file plus a `sourceMappingURL` comment.
        Linked = "linked" => 2,
        /// Separate file without a comment.
        External = "external" => 3,
        /// Inline and external at once.
        Both = "both" => 4,
    }
    default None;
    aliases { "inline-and-external" => Both }
}

option_enum! {
    pub enum SourcesContent: "sources content mode" {
        Include = "include" => 0,
        Exclude = "exclude" => 1,
    }
    default Include;
}

option_enum! {
    /// Engine log verbosity, also used for per-module log overrides.
    pub enum LogLevel: "log level" {
        Verbose = "verbose" => 1,
        Debug = "debug" => 2,
        Info = "info" => 3,
        Warning = "warning" => 4,
        Error = "error" => 5,
        Silent = "silent" => 6,
    }
    default Info;
    aliases { "warn" => Warning }
}

option_enum! {
    pub enum Color: "color mode" {
        /// Color when writing to a terminal.
        Auto = "auto" => 0,
        Never = "never" => 1,
        Always = "always" => 2,
    }
    default Auto;
}

option_enum! {
    pub enum Charset: "charset" {
        Ascii = "ascii" => 1,
        Utf8 = "utf8" => 2,
    }
    default Ascii;
    aliases { "utf-8" => Utf8 }
}

option_enum! {
    /// Where legal comments (`@license`, `/*!`) end up.
    pub enum LegalComments: "legal comments mode" {
        Default = "default" => 0,
        None = "none" => 1,
        Inline = "inline" => 2,
        Eof = "eof" => 3,
        Linked = "linked" => 4,
        External = "external" => 5,
    }
    default Default;
    aliases { "" => Default, "end-of-file" => Eof }
}

option_enum! {
    /// Statements the engine strips from the output.
    pub enum DropMode: "drop mode" {
        None = "none" => 0,
        Console = "console" => 1,
        Debugger = "debugger" => 2,
    }
    default None;
    aliases { "" => None }
}

option_enum! {
    pub enum TreeShaking: "tree shaking mode" {
        Default = "default" => 0,
        Disabled = "false" => 1,
        Enabled = "true" => 2,
    }
    default Default;
    aliases { "" => Default }
}

option_enum! {
    /// Whether quoted property names are mangled along with identifiers.
    pub enum MangleQuoted: "mangle quoted mode" {
        Disabled = "false" => 0,
        Enabled = "true" => 1,
    }
    default Disabled;
}

option_enum! {
    /// How package (bare specifier) imports are treated when bundling.
    pub enum Packages: "packages mode" {
        Default = "default" => 0,
        Bundle = "bundle" => 1,
        External = "external" => 2,
    }
    default Default;
    aliases { "" => Default }
}

option_enum! {
    /// How the engine interprets a module's contents.
    pub enum Loader: "loader" {
        Base64 = "base64" => 1,
        Binary = "binary" => 2,
        Copy = "copy" => 3,
        Css = "css" => 4,
        DataUrl = "dataurl" => 5,
        Empty = "empty" => 7,
        File = "file" => 8,
        GlobalCss = "global-css" => 9,
        Js = "js" => 10,
        Json = "json" => 11,
        Jsx = "jsx" => 12,
        LocalCss = "local-css" => 13,
        Text = "text" => 14,
        Ts = "ts" => 15,
        Tsx = "tsx" => 16,
    }
    default Js;
    aliases { "globalcss" => GlobalCss, "localcss" => LocalCss }
}

option_enum! {
    pub enum JsxMode: "jsx mode" {
        Transform = "transform" => 0,
        Preserve = "preserve" => 1,
        Automatic = "automatic" => 2,
    }
    default Transform;
}

option_enum! {
    /// Runtime engines that can be pinned with a version in `engines`.
    pub enum EngineName: "engine name" {
        Chrome = "chrome" => 0,
        Deno = "deno" => 1,
        Edge = "edge" => 2,
        Firefox = "firefox" => 3,
        Hermes = "hermes" => 4,
        Ie = "ie" => 5,
        Ios = "ios" => 6,
        Node = "node" => 7,
        Opera = "opera" => 8,
        Rhino = "rhino" => 9,
        Safari = "safari" => 10,
    }
    default Chrome;
}
