//! Options model for Keel: closed option enumerations, build and transform settings,
//! presets and layered config loading.

pub mod config;
pub mod discovery;
pub mod enums;
pub mod error;
pub mod presets;
pub mod settings;
pub mod validation;
pub mod value;

pub use config::{ENV_PREFIX, KeelConfig};
pub use discovery::{CONFIG_FILES, ConfigDiscovery, discover};
pub use enums::*;
pub use error::{ConfigError, Result};
pub use settings::{BuildSettings, CommonSettings, Engine, OptionType, TransformSettings};
pub use validation::{ConfigValidator, SchemaValidator, validate_build, validate_transform};
pub use value::OptionValue;
