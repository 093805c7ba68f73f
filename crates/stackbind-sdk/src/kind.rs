//! Value kinds and their fixed slot encoding
//!
//! Every parameter and return type is classified into exactly one kind. The
//! numeric kinds share a single encode/decode table, used for argument reads,
//! by-reference write-back and return values alike.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{VmError, VmResult};
use crate::slot::{SlotTag, StackSlot};
use crate::value::NativeValue;

/// Marshalling classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// i32
    Int32,
    /// i64
    Int64,
    /// i16
    Int16,
    /// bool
    Bool,
    /// u16
    UInt16,
    /// f32
    Float32,
    /// f64
    Float64,
    /// u8
    Byte,
    /// i8
    SByte,
    /// u32
    UInt32,
    /// char
    Char,
    /// u64
    UInt64,
    /// Reference or value type converted through the heap-object list
    Object,
}

impl ValueKind {
    /// All numeric kinds, in declaration order
    pub const NUMERIC: [ValueKind; 12] = [
        ValueKind::Int32,
        ValueKind::Int64,
        ValueKind::Int16,
        ValueKind::Bool,
        ValueKind::UInt16,
        ValueKind::Float32,
        ValueKind::Float64,
        ValueKind::Byte,
        ValueKind::SByte,
        ValueKind::UInt32,
        ValueKind::Char,
        ValueKind::UInt64,
    ];

    /// Check if this kind lives directly in a slot
    pub fn is_numeric(self) -> bool {
        self != ValueKind::Object
    }

    /// Slot tag written for this kind (`None` for Object)
    pub fn slot_tag(self) -> Option<SlotTag> {
        match self {
            ValueKind::Int32
            | ValueKind::Int16
            | ValueKind::Bool
            | ValueKind::UInt16
            | ValueKind::Byte
            | ValueKind::SByte
            | ValueKind::UInt32
            | ValueKind::Char => Some(SlotTag::Integer),
            ValueKind::Int64 | ValueKind::UInt64 => Some(SlotTag::Long),
            ValueKind::Float32 => Some(SlotTag::Float),
            ValueKind::Float64 => Some(SlotTag::Double),
            ValueKind::Object => None,
        }
    }

    /// Rust type name of the native value for this kind
    pub fn rust_name(self) -> &'static str {
        match self {
            ValueKind::Int32 => "i32",
            ValueKind::Int64 => "i64",
            ValueKind::Int16 => "i16",
            ValueKind::Bool => "bool",
            ValueKind::UInt16 => "u16",
            ValueKind::Float32 => "f32",
            ValueKind::Float64 => "f64",
            ValueKind::Byte => "u8",
            ValueKind::SByte => "i8",
            ValueKind::UInt32 => "u32",
            ValueKind::Char => "char",
            ValueKind::UInt64 => "u64",
            ValueKind::Object => "object",
        }
    }

    /// Read a numeric value out of a slot.
    ///
    /// 64-bit and floating kinds reinterpret the raw bits; narrow integral
    /// kinds truncate the 32-bit pattern.
    pub fn decode(self, slot: &StackSlot) -> VmResult<NativeValue> {
        let expected = match self.slot_tag() {
            Some(tag) => tag,
            None => {
                return Err(VmError::TypeMismatch {
                    expected: "numeric kind".to_string(),
                    got: "object".to_string(),
                })
            }
        };
        if slot.tag != expected {
            return Err(VmError::TypeMismatch {
                expected: self.to_string(),
                got: format!("{:?} slot", slot.tag),
            });
        }
        let bits = slot.int_bits();
        Ok(match self {
            ValueKind::Int32 => NativeValue::I32(bits),
            ValueKind::Int16 => NativeValue::I16(bits as i16),
            ValueKind::Bool => NativeValue::Bool(bits == 1),
            ValueKind::UInt16 => NativeValue::U16(bits as u16),
            ValueKind::Byte => NativeValue::U8(bits as u8),
            ValueKind::SByte => NativeValue::I8(bits as i8),
            ValueKind::UInt32 => NativeValue::U32(bits as u32),
            ValueKind::Char => match char::from_u32(bits as u32) {
                Some(c) => NativeValue::Char(c),
                None => {
                    return Err(VmError::TypeMismatch {
                        expected: "char".to_string(),
                        got: format!("invalid scalar value {:#x}", bits as u32),
                    })
                }
            },
            ValueKind::Int64 => NativeValue::I64(slot.long_bits()),
            ValueKind::UInt64 => NativeValue::U64(slot.value),
            ValueKind::Float32 => NativeValue::F32(slot.float_bits()),
            ValueKind::Float64 => NativeValue::F64(slot.double_bits()),
            ValueKind::Object => unreachable!("object kind has no slot tag"),
        })
    }

    /// Write a numeric value into a fresh slot.
    ///
    /// The value must carry exactly this kind's native type.
    pub fn encode(self, value: &NativeValue) -> VmResult<StackSlot> {
        Ok(match (self, value) {
            (ValueKind::Int32, NativeValue::I32(v)) => StackSlot::integer(*v),
            (ValueKind::Int16, NativeValue::I16(v)) => StackSlot::integer(*v as i32),
            (ValueKind::Bool, NativeValue::Bool(v)) => StackSlot::integer(if *v { 1 } else { 0 }),
            (ValueKind::UInt16, NativeValue::U16(v)) => StackSlot::integer(*v as i32),
            (ValueKind::Byte, NativeValue::U8(v)) => StackSlot::integer(*v as i32),
            (ValueKind::SByte, NativeValue::I8(v)) => StackSlot::integer(*v as i32),
            (ValueKind::UInt32, NativeValue::U32(v)) => StackSlot::integer(*v as i32),
            (ValueKind::Char, NativeValue::Char(c)) => StackSlot::integer(*c as u32 as i32),
            (ValueKind::Int64, NativeValue::I64(v)) => StackSlot::long(*v),
            (ValueKind::UInt64, NativeValue::U64(v)) => StackSlot::long(*v as i64),
            (ValueKind::Float32, NativeValue::F32(v)) => StackSlot::float(*v),
            (ValueKind::Float64, NativeValue::F64(v)) => StackSlot::double(*v),
            (kind, value) => {
                return Err(VmError::TypeMismatch {
                    expected: kind.to_string(),
                    got: value.describe(),
                })
            }
        })
    }

    /// Kind of a numeric native value (`None` for null, strings, objects)
    pub fn of_value(value: &NativeValue) -> Option<ValueKind> {
        Some(match value {
            NativeValue::Bool(_) => ValueKind::Bool,
            NativeValue::Char(_) => ValueKind::Char,
            NativeValue::I8(_) => ValueKind::SByte,
            NativeValue::U8(_) => ValueKind::Byte,
            NativeValue::I16(_) => ValueKind::Int16,
            NativeValue::U16(_) => ValueKind::UInt16,
            NativeValue::I32(_) => ValueKind::Int32,
            NativeValue::U32(_) => ValueKind::UInt32,
            NativeValue::I64(_) => ValueKind::Int64,
            NativeValue::U64(_) => ValueKind::UInt64,
            NativeValue::F32(_) => ValueKind::Float32,
            NativeValue::F64(_) => ValueKind::Float64,
            NativeValue::Null | NativeValue::Str(_) | NativeValue::Object(_) => return None,
        })
    }

    /// Box a numeric slot as the widest value of its tag.
    ///
    /// Used when a numeric slot is passed where an object is expected.
    pub fn box_slot(slot: &StackSlot) -> Option<NativeValue> {
        match slot.tag {
            SlotTag::Integer => Some(NativeValue::I32(slot.int_bits())),
            SlotTag::Long => Some(NativeValue::I64(slot.long_bits())),
            SlotTag::Float => Some(NativeValue::F32(slot.float_bits())),
            SlotTag::Double => Some(NativeValue::F64(slot.double_bits())),
            _ => None,
        }
    }

    /// Convert a stored numeric value (field or boxed heap entry) to this kind.
    ///
    /// Goes through the slot table, so an `I32` field read as `Int16`
    /// truncates exactly like a slot would.
    pub fn narrow(self, value: &NativeValue) -> VmResult<NativeValue> {
        let kind = ValueKind::of_value(value).ok_or_else(|| VmError::TypeMismatch {
            expected: self.to_string(),
            got: value.describe(),
        })?;
        let slot = kind.encode(value)?;
        self.decode(&slot)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}
