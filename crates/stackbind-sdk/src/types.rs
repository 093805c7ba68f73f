//! Runtime type table for static-field references

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{VmError, VmResult};
use crate::value::NativeValue;

/// Which side of the boundary owns a runtime type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFlavor {
    /// Interpreted type; statics live in its static instance
    Script,
    /// Native type; statics are reflected native fields
    Native,
}

/// A runtime type with its static field storage.
#[derive(Debug)]
pub struct RuntimeType {
    name: String,
    flavor: TypeFlavor,
    statics: RwLock<Vec<NativeValue>>,
}

impl RuntimeType {
    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning side
    pub fn flavor(&self) -> TypeFlavor {
        self.flavor
    }

    /// Read a static field
    pub fn static_field(&self, index: usize) -> VmResult<NativeValue> {
        self.statics
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| VmError::InvalidField {
                owner: self.name.clone(),
                field: index,
            })
    }

    /// Adapter-aware store into a static field
    pub fn set_static_field(&self, index: usize, value: NativeValue) -> VmResult<()> {
        let value = match self.flavor {
            TypeFlavor::Script => value.unwrap_adapter(),
            TypeFlavor::Native => value.wrap_adapter(),
        };
        let mut statics = self.statics.write();
        match statics.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::InvalidField {
                owner: self.name.clone(),
                field: index,
            }),
        }
    }
}

/// Runtime types indexed by id, as referenced from `StaticFieldReference`
/// slots.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: Vec<Arc<RuntimeType>>,
}

impl TypeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with `static_count` null statics; returns its id
    pub fn register(&mut self, name: impl Into<String>, flavor: TypeFlavor, static_count: usize) -> u32 {
        self.types.push(Arc::new(RuntimeType {
            name: name.into(),
            flavor,
            statics: RwLock::new(vec![NativeValue::Null; static_count]),
        }));
        (self.types.len() - 1) as u32
    }

    /// Look up a type by id
    pub fn get(&self, type_id: u32) -> VmResult<&Arc<RuntimeType>> {
        self.types
            .get(type_id as usize)
            .ok_or(VmError::UnknownType(type_id))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ObjectRef, ScriptInstance};

    #[test]
    fn test_register_and_store() {
        let mut table = TypeTable::new();
        let id = table.register("demo::Config", TypeFlavor::Native, 2);
        let ty = table.get(id).unwrap();
        ty.set_static_field(1, NativeValue::F64(0.5)).unwrap();
        assert_eq!(ty.static_field(1).unwrap(), NativeValue::F64(0.5));
        assert!(table.get(id + 1).is_err());
    }

    #[test]
    fn test_script_statics_unwrap_adapters() {
        let mut table = TypeTable::new();
        let id = table.register("Game.Registry", TypeFlavor::Script, 1);
        let script = ScriptInstance::with_adapter("Game.Enemy", 0, "demo::Actor", vec![]);
        let adapter = NativeValue::Object(ObjectRef::Script(script.clone())).wrap_adapter();

        table.get(id).unwrap().set_static_field(0, adapter).unwrap();
        let stored = table.get(id).unwrap().static_field(0).unwrap();
        assert_eq!(stored, NativeValue::Object(ObjectRef::Script(script)));
    }
}
