//! Method redirection registry
//!
//! Owned by an interpreter instance: the binding initializer registers one
//! trampoline per native method signature, and the interpreter looks calls
//! up by signature.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::{NativeError, VmError, VmResult};
use crate::stack::StackPtr;

/// One parameter of a signature key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamKey {
    /// Native reference string of the parameter type
    pub ty: String,
    /// By-reference parameters are distinct for overload resolution
    pub by_ref: bool,
}

impl ParamKey {
    /// By-value parameter
    pub fn value(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            by_ref: false,
        }
    }

    /// By-reference parameter
    pub fn by_ref(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            by_ref: true,
        }
    }
}

/// Native method identity used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Native reference string of the declaring type
    pub declaring: String,
    /// Method name
    pub name: String,
    /// Ordered parameter keys
    pub params: Vec<ParamKey>,
}

impl MethodSignature {
    /// Build a signature
    pub fn new(declaring: impl Into<String>, name: impl Into<String>, params: Vec<ParamKey>) -> Self {
        Self {
            declaring: declaring.into(),
            name: name.into(),
            params,
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.declaring, self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if p.by_ref {
                f.write_str("&mut ")?;
            }
            f.write_str(&p.ty)?;
        }
        f.write_str(")")
    }
}

/// A trampoline: consumes its argument window at the stack top and returns
/// the new stack top.
pub type Trampoline =
    Arc<dyn Fn(&mut CallContext<'_>, StackPtr, &MethodSignature) -> VmResult<StackPtr> + Send + Sync>;

/// Signature-keyed trampoline table.
pub struct MethodRegistry {
    entries: FxHashMap<MethodSignature, Trampoline>,
    order: Vec<MethodSignature>,
    bindings_initialized: bool,
}

impl MethodRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            order: Vec::new(),
            bindings_initialized: false,
        }
    }

    /// Register a trampoline for `signature`.
    ///
    /// A later registration for the same signature replaces the earlier one.
    /// Returns true if an entry was replaced.
    pub fn register(&mut self, signature: MethodSignature, trampoline: Trampoline) -> bool {
        if self.entries.insert(signature.clone(), trampoline).is_some() {
            log::warn!("replacing redirection for {}", signature);
            true
        } else {
            log::trace!("registered redirection for {}", signature);
            self.order.push(signature);
            false
        }
    }

    /// Mark the start of the one-time binding initialization.
    ///
    /// Fails if bindings were already installed into this registry.
    pub fn begin_bindings(&mut self) -> VmResult<()> {
        if self.bindings_initialized {
            return Err(VmError::AlreadyInitialized);
        }
        self.bindings_initialized = true;
        Ok(())
    }

    /// Check if the binding initializer has run
    pub fn bindings_initialized(&self) -> bool {
        self.bindings_initialized
    }

    /// Trampoline registered for `signature`
    pub fn get(&self, signature: &MethodSignature) -> Option<Trampoline> {
        self.entries.get(signature).cloned()
    }

    /// Check if `signature` is registered
    pub fn contains(&self, signature: &MethodSignature) -> bool {
        self.entries.contains_key(signature)
    }

    /// Signatures in first-registration order
    pub fn signatures(&self) -> impl Iterator<Item = &MethodSignature> {
        self.order.iter()
    }

    /// Invoke the trampoline registered for `signature`
    pub fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        esp: StackPtr,
        signature: &MethodSignature,
    ) -> VmResult<StackPtr> {
        match self.entries.get(signature) {
            Some(trampoline) => trampoline(ctx, esp, signature),
            None => Err(VmError::Native(NativeError::Unbound(signature.to_string()))),
        }
    }

    /// Number of registered signatures
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("count", &self.entries.len())
            .field("bindings_initialized", &self.bindings_initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::HeapObjects;
    use crate::stack::EvalStack;
    use crate::types::TypeTable;

    fn passthrough() -> Trampoline {
        Arc::new(
            |_ctx: &mut CallContext<'_>, esp: StackPtr, _sig: &MethodSignature| -> VmResult<StackPtr> {
                Ok(esp)
            },
        )
    }

    fn sig(name: &str, params: Vec<ParamKey>) -> MethodSignature {
        MethodSignature::new("demo::Math", name, params)
    }

    #[test]
    fn test_signature_display() {
        let s = sig("swap", vec![ParamKey::by_ref("i32"), ParamKey::value("String")]);
        assert_eq!(s.to_string(), "demo::Math::swap(&mut i32, String)");
    }

    #[test]
    fn test_by_ref_distinguishes_overloads() {
        let mut registry = MethodRegistry::new();
        let by_value = sig("parse", vec![ParamKey::value("i32")]);
        let by_ref = sig("parse", vec![ParamKey::by_ref("i32")]);
        registry.register(by_value.clone(), passthrough());
        registry.register(by_ref.clone(), passthrough());
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&by_value));
        assert!(registry.contains(&by_ref));
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut registry = MethodRegistry::new();
        let a = sig("a", vec![]);
        let b = sig("b", vec![]);
        assert!(!registry.register(a.clone(), passthrough()));
        assert!(!registry.register(b.clone(), passthrough()));
        assert!(registry.register(a.clone(), passthrough()));
        let order: Vec<_> = registry.signatures().cloned().collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_begin_bindings_once() {
        let mut registry = MethodRegistry::new();
        assert!(registry.begin_bindings().is_ok());
        assert_eq!(registry.begin_bindings(), Err(VmError::AlreadyInitialized));
    }

    #[test]
    fn test_invoke_unbound() {
        let registry = MethodRegistry::new();
        let mut stack = EvalStack::new(1);
        let mut heap = HeapObjects::new();
        let types = TypeTable::new();
        let mut ctx = CallContext::new(&mut stack, &mut heap, &types);
        let result = registry.invoke(&mut ctx, StackPtr::new(0), &sig("missing", vec![]));
        assert!(matches!(result, Err(VmError::Native(NativeError::Unbound(_)))));
    }
}
