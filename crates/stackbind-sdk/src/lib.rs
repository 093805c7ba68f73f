//! Stackbind SDK - runtime interface for interpreter-to-native trampolines
//!
//! A trampoline sits between a stack-based interpreter and one native
//! method. It reads the argument window off the evaluation stack, converts
//! each slot into a `NativeValue`, calls the native method, writes
//! by-reference results back, pops the window and pushes the return value.
//!
//! This crate holds everything a trampoline touches at run time: tagged
//! stack slots, the heap-object list, the object model with cross-binding
//! adapters, the value-kind table and the signature-keyed method registry.
//! The `stackbind-gen` crate produces trampolines against this interface.
//!
//! # Example
//!
//! ```ignore
//! use stackbind_sdk::{CallContext, MethodRegistry, StackPtr};
//!
//! let mut registry = MethodRegistry::new();
//! bindings::initialize(&mut registry)?;
//!
//! let mut ctx = CallContext::new(&mut stack, &mut heap, &types);
//! let esp = registry.invoke(&mut ctx, esp, &signature)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod coerce;
pub mod context;
pub mod convert;
pub mod error;
pub mod heap;
pub mod kind;
pub mod native;
pub mod registry;
pub mod slot;
pub mod stack;
pub mod types;
pub mod value;

pub use coerce::{Coercion, CoercionMode};
pub use context::CallContext;
pub use convert::{box_native, unbox_native, with_native_mut, FromNative, IntoNative};
pub use error::{NativeError, NativeResult, VmError, VmResult};
pub use heap::HeapObjects;
pub use kind::ValueKind;
pub use native::{catch_native, NativeCall, NativeMethodFn, NativeMethods};
pub use registry::{MethodRegistry, MethodSignature, ParamKey, Trampoline};
pub use slot::{SlotTag, StackSlot};
pub use stack::{EvalStack, Location, StackPtr};
pub use types::{RuntimeType, TypeFlavor, TypeTable};
pub use value::{NativeInstance, NativeValue, ObjectRef, ScriptInstance};
