//! Evaluation-stack slot representation
//!
//! A slot is a fixed-size tagged union:
//!
//! ```text
//! ┌───────────┬──────────────────────┬─────────────┐
//! │ tag       │ value (64 bits)      │ value_low   │
//! ├───────────┼──────────────────────┼─────────────┤
//! │ Integer   │ 32-bit pattern       │ 0           │
//! │ Long      │ 64-bit pattern       │ 0           │
//! │ Float     │ f32 bits             │ 0           │
//! │ Double    │ f64 bits             │ 0           │
//! │ Object    │ heap-object index    │ 0           │
//! │ StackRef  │ target slot index    │ 0           │
//! │ FieldRef  │ heap-object index    │ field       │
//! │ StaticRef │ type id              │ field       │
//! └───────────┴──────────────────────┴─────────────┘
//! ```

/// Slot discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotTag {
    /// 32-bit integer (and every narrower integral kind)
    #[default]
    Integer,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Index into the heap-object list
    ObjectReference,
    /// Points at another live stack slot
    StackSlotReference,
    /// Heap object index + field ordinal
    FieldReference,
    /// Type id + static field ordinal
    StaticFieldReference,
}

impl SlotTag {
    /// Check if this tag marks a by-reference slot
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            SlotTag::StackSlotReference | SlotTag::FieldReference | SlotTag::StaticFieldReference
        )
    }
}

/// One evaluation-stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StackSlot {
    /// Discriminant
    pub tag: SlotTag,
    /// Primary value, reinterpreted per tag
    pub value: u64,
    /// Secondary index (field ordinal for reference tags)
    pub value_low: i32,
}

const LOW_32: u64 = 0xFFFF_FFFF;

impl StackSlot {
    /// Integer slot holding the 32-bit pattern of `v`
    #[inline]
    pub const fn integer(v: i32) -> Self {
        Self {
            tag: SlotTag::Integer,
            value: (v as u32) as u64,
            value_low: 0,
        }
    }

    /// Long slot holding the 64-bit pattern of `v`
    #[inline]
    pub const fn long(v: i64) -> Self {
        Self {
            tag: SlotTag::Long,
            value: v as u64,
            value_low: 0,
        }
    }

    /// Float slot holding the bits of `v`
    #[inline]
    pub fn float(v: f32) -> Self {
        Self {
            tag: SlotTag::Float,
            value: v.to_bits() as u64,
            value_low: 0,
        }
    }

    /// Double slot holding the bits of `v`
    #[inline]
    pub fn double(v: f64) -> Self {
        Self {
            tag: SlotTag::Double,
            value: v.to_bits(),
            value_low: 0,
        }
    }

    /// Object slot referring to heap-object index `index`
    #[inline]
    pub const fn object(index: usize) -> Self {
        Self {
            tag: SlotTag::ObjectReference,
            value: index as u64,
            value_low: 0,
        }
    }

    /// Reference to another stack slot
    #[inline]
    pub const fn stack_reference(target: usize) -> Self {
        Self {
            tag: SlotTag::StackSlotReference,
            value: target as u64,
            value_low: 0,
        }
    }

    /// Reference to field `field` of heap object `object`
    #[inline]
    pub const fn field_reference(object: usize, field: usize) -> Self {
        Self {
            tag: SlotTag::FieldReference,
            value: object as u64,
            value_low: field as i32,
        }
    }

    /// Reference to static field `field` of type `type_id`
    #[inline]
    pub const fn static_field_reference(type_id: u32, field: usize) -> Self {
        Self {
            tag: SlotTag::StaticFieldReference,
            value: type_id as u64,
            value_low: field as i32,
        }
    }

    /// Primary value as a 32-bit pattern
    #[inline]
    pub const fn int_bits(&self) -> i32 {
        (self.value & LOW_32) as u32 as i32
    }

    /// Primary value as a 64-bit pattern
    #[inline]
    pub const fn long_bits(&self) -> i64 {
        self.value as i64
    }

    /// Primary value as f32 bits
    #[inline]
    pub fn float_bits(&self) -> f32 {
        f32::from_bits((self.value & LOW_32) as u32)
    }

    /// Primary value as f64 bits
    #[inline]
    pub fn double_bits(&self) -> f64 {
        f64::from_bits(self.value)
    }

    /// Primary value as an index
    #[inline]
    pub const fn index(&self) -> usize {
        self.value as usize
    }

    /// Secondary value as a field ordinal
    #[inline]
    pub const fn field(&self) -> usize {
        self.value_low as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keeps_32_bit_pattern() {
        let slot = StackSlot::integer(-1);
        assert_eq!(slot.value, 0xFFFF_FFFF);
        assert_eq!(slot.int_bits(), -1);
    }

    #[test]
    fn test_float_bits_reinterpret() {
        let slot = StackSlot::float(1.5);
        assert_eq!(slot.float_bits(), 1.5);
        let slot = StackSlot::double(-0.25);
        assert_eq!(slot.double_bits(), -0.25);
    }

    #[test]
    fn test_reference_constructors() {
        let slot = StackSlot::field_reference(4, 2);
        assert_eq!(slot.tag, SlotTag::FieldReference);
        assert_eq!(slot.index(), 4);
        assert_eq!(slot.field(), 2);
        assert!(slot.tag.is_reference());
        assert!(!StackSlot::object(0).tag.is_reference());
    }
}
