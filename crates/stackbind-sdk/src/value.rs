//! Native-side values and the object model shared with the interpreter
//!
//! A `NativeValue` is what a trampoline hands to a native method and what it
//! gets back. Objects come in two flavours:
//!
//! ```text
//! ScriptInstance   interpreted instance, field table owned by the VM
//!   └─ adapter ──► NativeInstance (cross-binding adapter, weak back-link)
//! NativeInstance   native object: payload + reflected field table
//! ```
//!
//! Both are reference counted and may be shared by several call frames, so
//! every mutable part sits behind a lock.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::error::{VmError, VmResult};

// ============================================================================
// NativeValue
// ============================================================================

/// A value on the native side of the boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NativeValue {
    /// Null reference
    #[default]
    Null,
    /// bool
    Bool(bool),
    /// char
    Char(char),
    /// i8
    I8(i8),
    /// u8
    U8(u8),
    /// i16
    I16(i16),
    /// u16
    U16(u16),
    /// i32
    I32(i32),
    /// u32
    U32(u32),
    /// i64
    I64(i64),
    /// u64
    U64(u64),
    /// f32
    F32(f32),
    /// f64
    F64(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Heap object (interpreted or native)
    Object(ObjectRef),
}

impl NativeValue {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        NativeValue::Str(Arc::from(s.as_ref()))
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    /// Short description used in fault messages
    pub fn describe(&self) -> String {
        match self {
            NativeValue::Null => "null".to_string(),
            NativeValue::Bool(_) => "bool".to_string(),
            NativeValue::Char(_) => "char".to_string(),
            NativeValue::I8(_) => "i8".to_string(),
            NativeValue::U8(_) => "u8".to_string(),
            NativeValue::I16(_) => "i16".to_string(),
            NativeValue::U16(_) => "u16".to_string(),
            NativeValue::I32(_) => "i32".to_string(),
            NativeValue::U32(_) => "u32".to_string(),
            NativeValue::I64(_) => "i64".to_string(),
            NativeValue::U64(_) => "u64".to_string(),
            NativeValue::F32(_) => "f32".to_string(),
            NativeValue::F64(_) => "f64".to_string(),
            NativeValue::Str(_) => "String".to_string(),
            NativeValue::Object(obj) => obj.type_name().to_string(),
        }
    }

    /// Get as object reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            NativeValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Replace a cross-binding adapter by its interpreted instance.
    ///
    /// Used whenever a value travels from native code back into interpreter
    /// storage, so interpreted code never observes the proxy.
    pub fn unwrap_adapter(self) -> Self {
        match self {
            NativeValue::Object(ObjectRef::Native(native)) => match native.script_instance() {
                Some(script) => NativeValue::Object(ObjectRef::Script(script)),
                None => NativeValue::Object(ObjectRef::Native(native)),
            },
            other => other,
        }
    }

    /// Replace an interpreted instance by its adapter, if it has one.
    ///
    /// Used when a value is stored into native-owned storage.
    pub fn wrap_adapter(self) -> Self {
        match self {
            NativeValue::Object(ObjectRef::Script(script)) => match script.adapter() {
                Some(adapter) => NativeValue::Object(ObjectRef::Native(adapter.clone())),
                None => NativeValue::Object(ObjectRef::Script(script)),
            },
            other => other,
        }
    }
}

// ============================================================================
// ObjectRef
// ============================================================================

/// Shared handle to a heap object.
#[derive(Clone)]
pub enum ObjectRef {
    /// Interpreted instance
    Script(Arc<ScriptInstance>),
    /// Native object (possibly a cross-binding adapter)
    Native(Arc<NativeInstance>),
}

impl ObjectRef {
    /// Type name of the referenced object
    pub fn type_name(&self) -> &str {
        match self {
            ObjectRef::Script(s) => s.type_name(),
            ObjectRef::Native(n) => n.type_name(),
        }
    }

    /// Read a field from the object's field table
    pub fn field(&self, index: usize) -> VmResult<NativeValue> {
        match self {
            ObjectRef::Script(s) => s.field(index),
            ObjectRef::Native(n) => n.field(index),
        }
    }

    /// Adapter-aware store into the object's field table.
    ///
    /// Interpreted instances receive interpreted values; native instances
    /// receive native values.
    pub fn set_field(&self, index: usize, value: NativeValue) -> VmResult<()> {
        match self {
            ObjectRef::Script(s) => s.set_field(index, value.unwrap_adapter()),
            ObjectRef::Native(n) => n.set_field(index, value.wrap_adapter()),
        }
    }

    /// Check if two handles point at the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        match (self, other) {
            (ObjectRef::Script(a), ObjectRef::Script(b)) => Arc::ptr_eq(a, b),
            (ObjectRef::Native(a), ObjectRef::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Script(s) => write!(f, "Script({})", s.type_name()),
            ObjectRef::Native(n) => write!(f, "Native({})", n.type_name()),
        }
    }
}

// ============================================================================
// ScriptInstance
// ============================================================================

/// An instance of an interpreted type.
pub struct ScriptInstance {
    type_name: String,
    fields: RwLock<Vec<NativeValue>>,
    adapter: Option<Arc<NativeInstance>>,
}

impl ScriptInstance {
    /// Create an interpreted instance with `field_count` null fields
    pub fn new(type_name: impl Into<String>, field_count: usize) -> Arc<Self> {
        Arc::new(Self {
            type_name: type_name.into(),
            fields: RwLock::new(vec![NativeValue::Null; field_count]),
            adapter: None,
        })
    }

    /// Create an interpreted instance that derives from a native type.
    ///
    /// The instance owns a cross-binding adapter of type `native_type`; the
    /// adapter links back weakly so that dropping the instance drops both.
    pub fn with_adapter(
        type_name: impl Into<String>,
        field_count: usize,
        native_type: impl Into<String>,
        assignable_to: Vec<String>,
    ) -> Arc<Self> {
        let native_type = native_type.into();
        Arc::new_cyclic(|weak| Self {
            type_name: type_name.into(),
            fields: RwLock::new(vec![NativeValue::Null; field_count]),
            adapter: Some(Arc::new(NativeInstance {
                type_name: native_type,
                assignable_to,
                fields: RwLock::new(Vec::new()),
                payload: Mutex::new(Box::new(())),
                script: Some(weak.clone()),
            })),
        })
    }

    /// Interpreted type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Cross-binding adapter, if this instance has one
    pub fn adapter(&self) -> Option<&Arc<NativeInstance>> {
        self.adapter.as_ref()
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }

    /// Read a field
    pub fn field(&self, index: usize) -> VmResult<NativeValue> {
        self.fields
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| VmError::InvalidField {
                owner: self.type_name.clone(),
                field: index,
            })
    }

    /// Write a field
    pub fn set_field(&self, index: usize, value: NativeValue) -> VmResult<()> {
        let mut fields = self.fields.write();
        match fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::InvalidField {
                owner: self.type_name.clone(),
                field: index,
            }),
        }
    }
}

impl fmt::Debug for ScriptInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptInstance")
            .field("type_name", &self.type_name)
            .field("fields", &*self.fields.read())
            .field("has_adapter", &self.adapter.is_some())
            .finish()
    }
}

// ============================================================================
// NativeInstance
// ============================================================================

/// A native object visible to the interpreter.
///
/// `payload` is the native value itself; `fields` is its reflected field
/// table, addressed by ordinal from `FieldReference` slots.
pub struct NativeInstance {
    type_name: String,
    assignable_to: Vec<String>,
    fields: RwLock<Vec<NativeValue>>,
    payload: Mutex<Box<dyn Any + Send>>,
    script: Option<Weak<ScriptInstance>>,
}

impl NativeInstance {
    /// Wrap a native payload under its reference type name
    pub fn new<T: Any + Send>(type_name: impl Into<String>, payload: T) -> Self {
        Self {
            type_name: type_name.into(),
            assignable_to: Vec::new(),
            fields: RwLock::new(Vec::new()),
            payload: Mutex::new(Box::new(payload)),
            script: None,
        }
    }

    /// Declare an additional type this object can be passed as
    pub fn implementing(mut self, type_name: impl Into<String>) -> Self {
        self.assignable_to.push(type_name.into());
        self
    }

    /// Set the reflected field table
    pub fn with_fields(self, fields: Vec<NativeValue>) -> Self {
        *self.fields.write() = fields;
        self
    }

    /// Finish construction as a shareable value
    pub fn into_value(self) -> NativeValue {
        NativeValue::Object(ObjectRef::Native(Arc::new(self)))
    }

    /// Native reference type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Check assignability to a native reference type
    pub fn is_instance_of(&self, target: &str) -> bool {
        self.type_name == target || self.assignable_to.iter().any(|t| t == target)
    }

    /// Check if this object is a cross-binding adapter
    pub fn is_adapter(&self) -> bool {
        self.script.is_some()
    }

    /// Interpreted instance behind this adapter, if still alive
    pub fn script_instance(&self) -> Option<Arc<ScriptInstance>> {
        self.script.as_ref().and_then(Weak::upgrade)
    }

    /// Read a reflected field
    pub fn field(&self, index: usize) -> VmResult<NativeValue> {
        self.fields
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| VmError::InvalidField {
                owner: self.type_name.clone(),
                field: index,
            })
    }

    /// Write a reflected field
    pub fn set_field(&self, index: usize, value: NativeValue) -> VmResult<()> {
        let mut fields = self.fields.write();
        match fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::InvalidField {
                owner: self.type_name.clone(),
                field: index,
            }),
        }
    }

    /// Run `f` against the payload if it has type `T`.
    ///
    /// The payload lock is held for the duration of `f`; `f` must not reach
    /// back into the same instance.
    pub fn with_payload<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.payload.lock();
        guard.downcast_mut::<T>().map(f)
    }

    /// Clone the payload out if it has type `T`
    pub fn payload_clone<T: Any + Clone>(&self) -> Option<T> {
        self.payload.lock().downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for NativeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeInstance")
            .field("type_name", &self.type_name)
            .field("assignable_to", &self.assignable_to)
            .field("is_adapter", &self.is_adapter())
            .finish()
    }
}
