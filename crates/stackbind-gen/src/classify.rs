//! Value-kind classification of descriptor types

use stackbind_sdk::{CoercionMode, ValueKind};

use crate::descriptor::{TypeCategory, TypeRef};

/// Kind of a primitive by name; accepts Rust and CLR spellings
pub fn primitive_kind(name: &str) -> Option<ValueKind> {
    Some(match name {
        "i32" | "Int32" | "System.Int32" => ValueKind::Int32,
        "i64" | "Int64" | "System.Int64" => ValueKind::Int64,
        "i16" | "Int16" | "System.Int16" => ValueKind::Int16,
        "bool" | "Boolean" | "System.Boolean" => ValueKind::Bool,
        "u16" | "UInt16" | "System.UInt16" => ValueKind::UInt16,
        "f32" | "Single" | "System.Single" => ValueKind::Float32,
        "f64" | "Double" | "System.Double" => ValueKind::Float64,
        "u8" | "Byte" | "System.Byte" => ValueKind::Byte,
        "i8" | "SByte" | "System.SByte" => ValueKind::SByte,
        "u32" | "UInt32" | "System.UInt32" => ValueKind::UInt32,
        "char" | "Char" | "System.Char" => ValueKind::Char,
        "u64" | "UInt64" | "System.UInt64" => ValueKind::UInt64,
        _ => return None,
    })
}

/// Marshalling kind of a parameter or return type.
///
/// `None` for void and for primitives outside the fixed set.
pub fn value_kind(ty: &TypeRef) -> Option<ValueKind> {
    match ty.category {
        TypeCategory::Void => None,
        TypeCategory::Primitive => primitive_kind(&ty.name),
        _ => Some(ValueKind::Object),
    }
}

/// How an object-kind argument of this type is checked
pub fn coercion_mode(ty: &TypeRef) -> Option<CoercionMode> {
    match ty.category {
        TypeCategory::Void | TypeCategory::Primitive => None,
        TypeCategory::Any => Some(CoercionMode::Any),
        TypeCategory::Script => Some(CoercionMode::Script),
        TypeCategory::String => Some(CoercionMode::String),
        TypeCategory::Class | TypeCategory::Interface => Some(CoercionMode::Class),
        TypeCategory::Struct => Some(CoercionMode::Struct),
    }
}
