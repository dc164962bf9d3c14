//! Build and transform settings.
//!
//! Scalar options are stored as `Option<T>` so an option that was never set can be told
//! apart from one explicitly set to its default. Lists keep insertion order and
//! duplicates; maps are `IndexMap`s where a repeated key replaces the earlier value.

use crate::error::Result;
use crate::value::{OptionValue, decode_bool, decode_string, decode_u32};

/// A type that can be stored in a scalar option slot.
pub trait OptionType: Sized + Clone + Into<OptionValue> {
    fn decode(option: &str, value: &OptionValue) -> Result<Self>;
}

impl OptionType for bool {
    fn decode(option: &str, value: &OptionValue) -> Result<Self> {
        decode_bool(option, value)
    }
}

impl OptionType for u32 {
    fn decode(option: &str, value: &OptionValue) -> Result<Self> {
        decode_u32(option, value)
    }
}

impl OptionType for String {
    fn decode(option: &str, value: &OptionValue) -> Result<Self> {
        decode_string(option, value)
    }
}

/// Generates the name-based accessors plus a typed getter and setter per option.
macro_rules! scalar_options {
    ($ty:ident { $( $key:literal => $field:ident, $setter:ident : $t:ty = $default:expr ),+ $(,)? }) => {
        impl $ty {
            /// Names of the scalar options owned by this struct, in declaration order.
            pub const SCALAR_OPTIONS: &'static [&'static str] = &[$($key),+];

            fn set_scalar(
                &mut self,
                name: &str,
                value: &$crate::value::OptionValue,
            ) -> Option<$crate::error::Result<()>> {
                use $crate::settings::OptionType as _;
                match name {
                    $($key => Some($crate::value::store(
                        &mut self.$field,
                        <$t>::decode(name, value),
                    )),)+
                    _ => None,
                }
            }

            fn clear_scalar(&mut self, name: &str) -> bool {
                match name {
                    $($key => {
                        self.$field = None;
                        true
                    })+
                    _ => false,
                }
            }

            fn lookup_scalar(
                &self,
                name: &str,
            ) -> Option<(Option<$crate::value::OptionValue>, $crate::value::OptionValue)> {
                match name {
                    $($key => Some($crate::value::read(&self.$field, $default)),)+
                    _ => None,
                }
            }

            $(
                pub fn $field(&self) -> $t {
                    self.$field.clone().unwrap_or_else(|| $default)
                }

                pub fn $setter(&mut self, value: impl Into<$t>) -> &mut Self {
                    self.$field = Some(value.into());
                    self
                }
            )+
        }
    };
}

mod build;
mod common;
mod transform;

pub use build::BuildSettings;
pub use common::{CommonSettings, Engine};
pub use transform::TransformSettings;
