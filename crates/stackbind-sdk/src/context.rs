//! Call context handed to every trampoline
//!
//! Bundles the interpreter state a trampoline may touch for the duration of
//! one invocation: the evaluation stack (only the invoking frame's window is
//! written), the shared heap-object list and the runtime type table.

use crate::coerce::Coercion;
use crate::error::{VmError, VmResult};
use crate::heap::HeapObjects;
use crate::kind::ValueKind;
use crate::slot::{SlotTag, StackSlot};
use crate::stack::{EvalStack, Location, StackPtr};
use crate::types::TypeTable;
use crate::value::NativeValue;

/// Interpreter state borrowed by a trampoline.
pub struct CallContext<'a> {
    /// Evaluation stack
    pub stack: &'a mut EvalStack,
    /// Heap-object list
    pub heap: &'a mut HeapObjects,
    /// Runtime types (for static-field references)
    pub types: &'a TypeTable,
}

impl<'a> CallContext<'a> {
    /// Borrow interpreter state for one call
    pub fn new(stack: &'a mut EvalStack, heap: &'a mut HeapObjects, types: &'a TypeTable) -> Self {
        Self { stack, heap, types }
    }

    /// Resolve the reference kind of the slot at `at`
    pub fn resolve_reference(&self, at: StackPtr) -> VmResult<Location> {
        self.stack.resolve_reference(at)
    }

    /// Read the value at `location` as `kind`.
    ///
    /// Object kinds go through `coercion`; numeric kinds use the fixed slot
    /// table. Nothing is mutated.
    pub fn load(
        &self,
        location: Location,
        kind: ValueKind,
        coercion: Option<&Coercion>,
    ) -> VmResult<NativeValue> {
        let stored = match location {
            Location::Slot(at) => {
                let slot = *self.stack.get(at)?;
                match slot.tag {
                    SlotTag::Integer | SlotTag::Long | SlotTag::Float | SlotTag::Double => {
                        if kind.is_numeric() {
                            return kind.decode(&slot);
                        }
                        // numeric slot passed as an object: box it
                        ValueKind::box_slot(&slot).unwrap_or_default()
                    }
                    SlotTag::ObjectReference => self.heap.get(slot.index())?.clone(),
                    SlotTag::FieldReference => self.field_value(slot.index(), slot.field())?,
                    SlotTag::StaticFieldReference => {
                        self.types.get(slot.value as u32)?.static_field(slot.field())?
                    }
                    SlotTag::StackSlotReference => {
                        return Err(VmError::TypeMismatch {
                            expected: kind.to_string(),
                            got: "unresolved stack reference".to_string(),
                        })
                    }
                }
            }
            Location::Field { object, field } => self.field_value(object, field)?,
            Location::StaticField { type_id, field } => {
                self.types.get(type_id)?.static_field(field)?
            }
        };
        convert(stored, kind, coercion)
    }

    /// Release interpreter ownership of the slot at `at`.
    ///
    /// Only object slots own a heap entry; other tags are left alone.
    pub fn free(&mut self, at: StackPtr) -> VmResult<()> {
        let slot = *self.stack.get(at)?;
        if slot.tag == SlotTag::ObjectReference {
            self.heap.release(slot.index());
        }
        Ok(())
    }

    /// Write `value` back to `location`.
    ///
    /// Stack targets get a correctly tagged slot; field targets go through
    /// the owner's adapter-aware store.
    pub fn store(&mut self, location: Location, kind: ValueKind, value: NativeValue) -> VmResult<()> {
        match location {
            Location::Slot(dst) => {
                if kind.is_numeric() {
                    let slot = kind.encode(&value)?;
                    return self.stack.set(dst, slot);
                }
                let value = value.unwrap_adapter();
                let current = *self.stack.get(dst)?;
                if current.tag == SlotTag::ObjectReference && current.index() < self.heap.len() {
                    self.heap.set(current.index(), value)
                } else {
                    let index = self.heap.push(value);
                    self.stack.set(dst, StackSlot::object(index))
                }
            }
            Location::Field { object, field } => {
                let owner = self.heap.get(object)?.clone();
                match owner {
                    NativeValue::Object(obj) => obj.set_field(field, value),
                    NativeValue::Null => Err(VmError::NullReference(format!(
                        "field {} of heap object {}",
                        field, object
                    ))),
                    other => Err(VmError::TypeMismatch {
                        expected: "object with fields".to_string(),
                        got: other.describe(),
                    }),
                }
            }
            Location::StaticField { type_id, field } => {
                self.types.get(type_id)?.set_static_field(field, value)
            }
        }
    }

    /// Write a numeric return value at `ret`; returns the new stack top
    pub fn push_value(&mut self, ret: StackPtr, kind: ValueKind, value: &NativeValue) -> VmResult<StackPtr> {
        let slot = kind.encode(value)?;
        self.stack.push(ret, slot)
    }

    /// Push an object return value through the heap-object list.
    ///
    /// With `unwrap_adapter`, a returned cross-binding adapter is replaced
    /// by its interpreted instance.
    pub fn push_object(&mut self, ret: StackPtr, value: NativeValue, unwrap_adapter: bool) -> VmResult<StackPtr> {
        let value = if unwrap_adapter {
            value.unwrap_adapter()
        } else {
            value
        };
        let index = self.heap.push(value);
        self.stack.push(ret, StackSlot::object(index))
    }

    fn field_value(&self, object: usize, field: usize) -> VmResult<NativeValue> {
        match self.heap.get(object)? {
            NativeValue::Object(obj) => obj.field(field),
            NativeValue::Null => Err(VmError::NullReference(format!(
                "field {} of heap object {}",
                field, object
            ))),
            other => Err(VmError::TypeMismatch {
                expected: "object with fields".to_string(),
                got: other.describe(),
            }),
        }
    }
}

/// Convert a stored value to `kind`
fn convert(stored: NativeValue, kind: ValueKind, coercion: Option<&Coercion>) -> VmResult<NativeValue> {
    if kind.is_numeric() {
        return kind.narrow(&stored);
    }
    match coercion {
        Some(coercion) => coercion.apply(stored),
        None => Ok(stored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::CoercionMode;
    use crate::types::TypeFlavor;
    use crate::value::{NativeInstance, ObjectRef, ScriptInstance};

    struct Harness {
        stack: EvalStack,
        heap: HeapObjects,
        types: TypeTable,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                stack: EvalStack::new(16),
                heap: HeapObjects::new(),
                types: TypeTable::new(),
            }
        }

        fn ctx(&mut self) -> CallContext<'_> {
            CallContext::new(&mut self.stack, &mut self.heap, &self.types)
        }
    }

    #[test]
    fn test_load_numeric_slot() {
        let mut h = Harness::new();
        h.stack.set(StackPtr::new(0), StackSlot::long(-5)).unwrap();
        let ctx = h.ctx();
        let v = ctx.load(Location::Slot(StackPtr::new(0)), ValueKind::Int64, None).unwrap();
        assert_eq!(v, NativeValue::I64(-5));
    }

    #[test]
    fn test_load_boxes_numeric_for_object() {
        let mut h = Harness::new();
        h.stack.set(StackPtr::new(0), StackSlot::integer(3)).unwrap();
        let ctx = h.ctx();
        let any = Coercion::new("object", CoercionMode::Any);
        let v = ctx
            .load(Location::Slot(StackPtr::new(0)), ValueKind::Object, Some(&any))
            .unwrap();
        assert_eq!(v, NativeValue::I32(3));
    }

    #[test]
    fn test_load_unboxes_heap_numeric() {
        let mut h = Harness::new();
        let idx = h.heap.push(NativeValue::I32(300));
        h.stack.set(StackPtr::new(0), StackSlot::object(idx)).unwrap();
        let ctx = h.ctx();
        let v = ctx.load(Location::Slot(StackPtr::new(0)), ValueKind::Byte, None).unwrap();
        assert_eq!(v, NativeValue::U8(300i32 as u8));
    }

    #[test]
    fn test_load_through_field_reference_slot() {
        let mut h = Harness::new();
        let script = ScriptInstance::new("Game.Counter", 1);
        script.set_field(0, NativeValue::I32(41)).unwrap();
        let idx = h.heap.push(NativeValue::Object(ObjectRef::Script(script)));
        h.stack.set(StackPtr::new(0), StackSlot::field_reference(idx, 0)).unwrap();
        let ctx = h.ctx();
        let v = ctx.load(Location::Slot(StackPtr::new(0)), ValueKind::Int32, None).unwrap();
        assert_eq!(v, NativeValue::I32(41));
    }

    #[test]
    fn test_store_into_stack_slot_sets_tag() {
        let mut h = Harness::new();
        h.stack.set(StackPtr::new(2), StackSlot::integer(0)).unwrap();
        let mut ctx = h.ctx();
        ctx.store(Location::Slot(StackPtr::new(2)), ValueKind::Float64, NativeValue::F64(2.5))
            .unwrap();
        assert_eq!(*h.stack.get(StackPtr::new(2)).unwrap(), StackSlot::double(2.5));
    }

    #[test]
    fn test_store_object_reuses_heap_entry() {
        let mut h = Harness::new();
        let idx = h.heap.push(NativeValue::Null);
        h.stack.set(StackPtr::new(0), StackSlot::object(idx)).unwrap();
        let mut ctx = h.ctx();
        ctx.store(Location::Slot(StackPtr::new(0)), ValueKind::Object, NativeValue::string("out"))
            .unwrap();
        assert_eq!(h.heap.len(), 1);
        assert_eq!(*h.heap.get(idx).unwrap(), NativeValue::string("out"));
    }

    #[test]
    fn test_store_native_field() {
        let mut h = Harness::new();
        let native = NativeInstance::new("demo::Point", ())
            .with_fields(vec![NativeValue::I32(0), NativeValue::I32(0)])
            .into_value();
        let idx = h.heap.push(native.clone());
        let mut ctx = h.ctx();
        ctx.store(Location::Field { object: idx, field: 1 }, ValueKind::Int32, NativeValue::I32(9))
            .unwrap();
        assert_eq!(native.as_object().unwrap().field(1).unwrap(), NativeValue::I32(9));
    }

    #[test]
    fn test_store_static_field() {
        let mut h = Harness::new();
        let id = h.types.register("demo::Settings", TypeFlavor::Native, 1);
        let mut ctx = h.ctx();
        ctx.store(Location::StaticField { type_id: id, field: 0 }, ValueKind::Bool, NativeValue::Bool(true))
            .unwrap();
        assert_eq!(h.types.get(id).unwrap().static_field(0).unwrap(), NativeValue::Bool(true));
    }

    #[test]
    fn test_free_releases_object_only() {
        let mut h = Harness::new();
        let idx = h.heap.push(NativeValue::string("x"));
        h.stack.set(StackPtr::new(0), StackSlot::object(idx)).unwrap();
        h.stack.set(StackPtr::new(1), StackSlot::integer(1)).unwrap();
        let mut ctx = h.ctx();
        ctx.free(StackPtr::new(1)).unwrap();
        ctx.free(StackPtr::new(0)).unwrap();
        assert!(h.heap.is_empty());
    }
}
