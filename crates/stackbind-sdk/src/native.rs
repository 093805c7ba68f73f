//! Native entry points invoked by trampolines

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{NativeError, NativeResult};
use crate::registry::MethodSignature;
use crate::value::NativeValue;

/// Arguments of one native invocation.
///
/// By-reference arguments are updated in place by the native method; the
/// trampoline reads them back from `args` after the call.
#[derive(Debug)]
pub struct NativeCall<'a> {
    /// Invoked method
    pub method: &'a MethodSignature,
    /// Receiver for instance methods
    pub receiver: Option<NativeValue>,
    /// Arguments in declaration order
    pub args: Vec<NativeValue>,
}

impl<'a> NativeCall<'a> {
    /// Argument `index`
    pub fn arg(&self, index: usize) -> NativeResult<&NativeValue> {
        self.args.get(index).ok_or_else(|| {
            NativeError::ArgumentError(format!("{}: missing argument {}", self.method, index))
        })
    }

    /// Overwrite argument `index` (by-reference output)
    pub fn set_arg(&mut self, index: usize, value: NativeValue) -> NativeResult<()> {
        let method = self.method;
        match self.args.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(NativeError::ArgumentError(format!(
                "{}: missing argument {}",
                method, index
            ))),
        }
    }

    /// Receiver, which must be present
    pub fn receiver(&self) -> NativeResult<&NativeValue> {
        self.receiver
            .as_ref()
            .ok_or_else(|| NativeError::ArgumentError(format!("{}: no receiver", self.method)))
    }
}

/// Run a native body, turning a panic into `NativeError::Aborted`.
pub fn catch_native<R>(
    method: &MethodSignature,
    f: impl FnOnce() -> NativeResult<R>,
) -> NativeResult<R> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        let msg = if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Err(NativeError::Aborted(format!("{}: {}", method, msg)))
    })
}

/// A native method body.
pub type NativeMethodFn =
    Arc<dyn Fn(&mut NativeCall<'_>) -> NativeResult<NativeValue> + Send + Sync>;

/// Native entry points keyed by method signature.
///
/// This is the in-process stand-in for calling a native method by name: the
/// host registers one body per signature it wants reachable.
#[derive(Default, Clone)]
pub struct NativeMethods {
    entries: FxHashMap<MethodSignature, NativeMethodFn>,
}

impl NativeMethods {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a native body to `signature`
    pub fn bind(
        &mut self,
        signature: MethodSignature,
        body: impl Fn(&mut NativeCall<'_>) -> NativeResult<NativeValue> + Send + Sync + 'static,
    ) {
        self.entries.insert(signature, Arc::new(body));
    }

    /// Body bound to `signature`
    pub fn get(&self, signature: &MethodSignature) -> Option<NativeMethodFn> {
        self.entries.get(signature).cloned()
    }

    /// Number of bound bodies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for NativeMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMethods")
            .field("count", &self.entries.len())
            .finish()
    }
}
