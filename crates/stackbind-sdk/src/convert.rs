//! Conversions between `NativeValue` and Rust types
//!
//! Generated Rust bindings call native methods with plain Rust arguments;
//! these traits and helpers do the unwrapping on the way in and the
//! wrapping on the way out.

use std::any::Any;
use std::sync::Arc;

use crate::error::{NativeError, NativeResult};
use crate::value::{NativeInstance, NativeValue, ObjectRef};

// ============================================================================
// Value Conversion Traits
// ============================================================================

/// Convert from `NativeValue` to a Rust type.
pub trait FromNative: Sized {
    /// Convert, failing if the value has the wrong shape
    fn from_native(value: NativeValue) -> NativeResult<Self>;
}

/// Convert from a Rust type to `NativeValue`.
pub trait IntoNative {
    /// Convert to a native value
    fn into_native(self) -> NativeValue;
}

fn mismatch(expected: &str, value: &NativeValue) -> NativeError {
    NativeError::ArgumentError(format!("expected {}, got {}", expected, value.describe()))
}

macro_rules! primitive_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromNative for $ty {
                fn from_native(value: NativeValue) -> NativeResult<Self> {
                    match value {
                        NativeValue::$variant(v) => Ok(v),
                        other => Err(mismatch(stringify!($ty), &other)),
                    }
                }
            }

            impl IntoNative for $ty {
                fn into_native(self) -> NativeValue {
                    NativeValue::$variant(self)
                }
            }
        )*
    };
}

primitive_conversions! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl FromNative for String {
    fn from_native(value: NativeValue) -> NativeResult<Self> {
        match value {
            NativeValue::Str(s) => Ok(s.to_string()),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl IntoNative for String {
    fn into_native(self) -> NativeValue {
        NativeValue::Str(Arc::from(self))
    }
}

impl IntoNative for &str {
    fn into_native(self) -> NativeValue {
        NativeValue::string(self)
    }
}

impl<T: FromNative> FromNative for Option<T> {
    fn from_native(value: NativeValue) -> NativeResult<Self> {
        match value {
            NativeValue::Null => Ok(None),
            other => T::from_native(other).map(Some),
        }
    }
}

impl<T: IntoNative> IntoNative for Option<T> {
    fn into_native(self) -> NativeValue {
        match self {
            Some(v) => v.into_native(),
            None => NativeValue::Null,
        }
    }
}

impl FromNative for NativeValue {
    fn from_native(value: NativeValue) -> NativeResult<Self> {
        Ok(value)
    }
}

impl IntoNative for NativeValue {
    fn into_native(self) -> NativeValue {
        self
    }
}

// Unit type (for methods that return nothing)
impl IntoNative for () {
    fn into_native(self) -> NativeValue {
        NativeValue::Null
    }
}

// ============================================================================
// Native Object Helpers
// ============================================================================

fn native_instance<'v>(value: &'v NativeValue, type_name: &str) -> NativeResult<&'v Arc<NativeInstance>> {
    match value {
        NativeValue::Object(ObjectRef::Native(native)) => Ok(native),
        NativeValue::Null => Err(NativeError::ArgumentError(format!("null {}", type_name))),
        other => Err(mismatch(type_name, other)),
    }
}

/// Clone the Rust payload of a native object.
///
/// Fails on null, on interpreted instances and on payloads of another type.
pub fn unbox_native<T: Any + Clone>(value: &NativeValue, type_name: &str) -> NativeResult<T> {
    native_instance(value, type_name)?
        .payload_clone::<T>()
        .ok_or_else(|| mismatch(type_name, value))
}

/// Wrap a Rust value as a native object of `type_name`
pub fn box_native<T: Any + Send>(type_name: &str, payload: T) -> NativeValue {
    NativeInstance::new(type_name, payload).into_value()
}

/// Run `f` against the payload of a native object in place.
///
/// Instance methods mutate the receiver through this, so changes are visible
/// to every holder of the object.
pub fn with_native_mut<T: Any, R>(
    value: &NativeValue,
    type_name: &str,
    f: impl FnOnce(&mut T) -> R,
) -> NativeResult<R> {
    native_instance(value, type_name)?
        .with_payload(f)
        .ok_or_else(|| mismatch(type_name, value))
}
