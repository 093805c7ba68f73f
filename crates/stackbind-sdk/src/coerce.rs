//! Type-checked conversion of heap values into native arguments

use serde::{Deserialize, Serialize};

use crate::error::{VmError, VmResult};
use crate::value::{NativeValue, ObjectRef};

/// What an object-kind target accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoercionMode {
    /// Universal object type: anything, interpreted instances stay as-is
    Any,
    /// The interpreter's own instance type
    Script,
    /// Strings (or null)
    String,
    /// A native reference type (null allowed)
    Class,
    /// A native value type (null rejected)
    Struct,
}

/// Type-compatibility check applied to an object-kind argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coercion {
    /// Native reference string of the target type
    pub target: String,
    /// Acceptance rule
    pub mode: CoercionMode,
}

impl Coercion {
    /// Build a coercion for `target`
    pub fn new(target: impl Into<String>, mode: CoercionMode) -> Self {
        Self {
            target: target.into(),
            mode,
        }
    }

    /// Check `value` against the target and adapt it for native use.
    ///
    /// An interpreted instance passed to a native type is replaced by its
    /// cross-binding adapter.
    pub fn apply(&self, value: NativeValue) -> VmResult<NativeValue> {
        match (self.mode, value) {
            (CoercionMode::Any, value) => Ok(value),
            (CoercionMode::Struct, NativeValue::Null) => {
                Err(VmError::NullReference(format!("value of type {}", self.target)))
            }
            (_, NativeValue::Null) => Ok(NativeValue::Null),
            (CoercionMode::Script, value @ NativeValue::Object(ObjectRef::Script(_))) => Ok(value),
            (CoercionMode::String, value @ NativeValue::Str(_)) => Ok(value),
            (CoercionMode::Class | CoercionMode::Struct, NativeValue::Object(obj)) => {
                self.adapt_object(obj)
            }
            (_, value) => Err(self.mismatch(&value)),
        }
    }

    fn adapt_object(&self, obj: ObjectRef) -> VmResult<NativeValue> {
        match obj {
            ObjectRef::Native(native) if native.is_instance_of(&self.target) => {
                Ok(NativeValue::Object(ObjectRef::Native(native)))
            }
            ObjectRef::Script(script) => match script.adapter() {
                Some(adapter) if adapter.is_instance_of(&self.target) => {
                    Ok(NativeValue::Object(ObjectRef::Native(adapter.clone())))
                }
                _ => Err(VmError::TypeMismatch {
                    expected: self.target.clone(),
                    got: script.type_name().to_string(),
                }),
            },
            other => Err(self.mismatch(&NativeValue::Object(other))),
        }
    }

    fn mismatch(&self, value: &NativeValue) -> VmError {
        VmError::TypeMismatch {
            expected: self.target.clone(),
            got: value.describe(),
        }
    }
}
