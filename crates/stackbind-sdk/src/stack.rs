//! Evaluation stack, stack pointers and reference resolution

use crate::error::{VmError, VmResult};
use crate::slot::{SlotTag, StackSlot};

/// Position of the current stack top (first free slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StackPtr(usize);

impl StackPtr {
    /// Pointer at absolute slot index `index`
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Absolute slot index
    pub const fn index(self) -> usize {
        self.0
    }

    /// Slot `offset` positions below this pointer
    pub fn minus(self, offset: usize) -> VmResult<StackPtr> {
        self.0
            .checked_sub(offset)
            .map(StackPtr)
            .ok_or(VmError::StackUnderflow {
                window: offset,
                top: self.0,
            })
    }

    /// Slot `offset` positions above this pointer
    pub const fn plus(self, offset: usize) -> StackPtr {
        StackPtr(self.0 + offset)
    }
}

/// Where the value behind a (possibly by-reference) slot actually lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// A live stack slot
    Slot(StackPtr),
    /// Field `field` of heap object `object`
    Field {
        /// Heap-object index of the owner
        object: usize,
        /// Field ordinal
        field: usize,
    },
    /// Static field `field` of runtime type `type_id`
    StaticField {
        /// Runtime type id
        type_id: u32,
        /// Static field ordinal
        field: usize,
    },
}

/// The interpreter's evaluation stack.
///
/// Fixed capacity; the interpreter owns the stack pointer and passes it to
/// trampolines explicitly.
#[derive(Debug, Clone)]
pub struct EvalStack {
    slots: Vec<StackSlot>,
}

impl EvalStack {
    /// Create a stack of `capacity` zeroed slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![StackSlot::default(); capacity],
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Read the slot at `at`
    pub fn get(&self, at: StackPtr) -> VmResult<&StackSlot> {
        self.slots
            .get(at.index())
            .ok_or(VmError::InvalidReference(at.index()))
    }

    /// Overwrite the slot at `at`
    pub fn set(&mut self, at: StackPtr, slot: StackSlot) -> VmResult<()> {
        match self.slots.get_mut(at.index()) {
            Some(dst) => {
                *dst = slot;
                Ok(())
            }
            None => Err(VmError::InvalidReference(at.index())),
        }
    }

    /// Write `slot` at `esp` and return the advanced pointer
    pub fn push(&mut self, esp: StackPtr, slot: StackSlot) -> VmResult<StackPtr> {
        self.set(esp, slot)?;
        Ok(esp.plus(1))
    }

    /// Resolve the reference kind of the slot at `at`.
    ///
    /// Non-reference slots resolve to themselves. The slot's tag is never
    /// changed by resolution.
    pub fn resolve_reference(&self, at: StackPtr) -> VmResult<Location> {
        let slot = self.get(at)?;
        Ok(match slot.tag {
            SlotTag::StackSlotReference => {
                let target = StackPtr::new(slot.index());
                self.get(target)?;
                Location::Slot(target)
            }
            SlotTag::FieldReference => Location::Field {
                object: slot.index(),
                field: slot.field(),
            },
            SlotTag::StaticFieldReference => Location::StaticField {
                type_id: slot.value as u32,
                field: slot.field(),
            },
            _ => Location::Slot(at),
        })
    }
}
