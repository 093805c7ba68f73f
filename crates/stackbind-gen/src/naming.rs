//! Symbol naming
//!
//! Two names are derived for every type, recursively through nesting and
//! generic arguments:
//!
//! - the **reference string**, the type as written in native code
//!   (`demo::Map<i32, demo::Outer::Inner>`), used in signature keys;
//! - the **binding identifier**, a flat identifier for the generated module.
//!
//! The identifier uses a small escape grammar so distinct types never share
//! an identifier:
//!
//! ```text
//! _<non-digit>     segment separator (namespace segments, type name)
//! _0               literal underscore
//! _1xxxxxx         any other character, six lowercase hex digits
//! _2               nested type follows its parent
//! _3 ... _5        each generic argument opens with _3, the list closes with _5
//! ```
//!
//! A leading digit of a segment is escaped with `_1` as well, so every
//! identifier is also a valid Rust identifier.

use std::borrow::Cow;

use crate::classify::primitive_kind;
use crate::descriptor::{TypeCategory, TypeRef};

/// Default suffix appended to binding identifiers
pub const DEFAULT_SUFFIX: &str = "_Binding";

/// Name of a type with arity markers removed and primitives canonicalized
fn canonical_name(ty: &TypeRef) -> Cow<'_, str> {
    match ty.category {
        TypeCategory::Void => Cow::Borrowed("()"),
        TypeCategory::Primitive => match primitive_kind(&ty.name) {
            Some(kind) => Cow::Borrowed(kind.rust_name()),
            None => Cow::Borrowed(ty.name.as_str()),
        },
        _ => Cow::Borrowed(ty.base_name()),
    }
}

// ============================================================================
// Reference strings
// ============================================================================

/// Native reference string of `ty`.
///
/// Namespace segments and nesting are joined with `::`; generic arguments
/// render as `<A, B>`.
pub fn reference_string(ty: &TypeRef) -> String {
    let mut out = String::new();
    write_reference(ty, &mut out);
    out
}

fn write_reference(ty: &TypeRef, out: &mut String) {
    match &ty.parent {
        Some(parent) => {
            write_reference(parent, out);
            out.push_str("::");
        }
        None => {
            for seg in ty.namespace_segments() {
                out.push_str(seg);
                out.push_str("::");
            }
        }
    }
    out.push_str(&canonical_name(ty));
    if !ty.generic_args.is_empty() {
        out.push('<');
        for (i, arg) in ty.generic_args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_reference(arg, out);
        }
        out.push('>');
    }
}

// ============================================================================
// Binding identifiers
// ============================================================================

/// Flat identifier of `ty` without the binding suffix
pub fn type_ident(ty: &TypeRef) -> String {
    let mut out = String::new();
    write_ident(ty, &mut out);
    out
}

/// Binding identifier of `ty`: the flat identifier plus `suffix`
pub fn binding_ident(ty: &TypeRef, suffix: &str) -> String {
    let mut out = type_ident(ty);
    out.push_str(suffix);
    out
}

fn write_ident(ty: &TypeRef, out: &mut String) {
    match &ty.parent {
        Some(parent) => {
            write_ident(parent, out);
            out.push_str("_2");
        }
        None => {
            for seg in ty.namespace_segments() {
                push_segment(seg, out);
                out.push('_');
            }
        }
    }
    push_segment(&canonical_name(ty), out);
    if !ty.generic_args.is_empty() {
        for arg in &ty.generic_args {
            out.push_str("_3");
            write_ident(arg, out);
        }
        out.push_str("_5");
    }
}

fn push_segment(segment: &str, out: &mut String) {
    for (i, c) in segment.chars().enumerate() {
        if c.is_ascii_alphanumeric() && !(i == 0 && c.is_ascii_digit()) {
            out.push(c);
        } else if c == '_' {
            out.push_str("_0");
        } else {
            out.push_str(&format!("_1{:06x}", c as u32));
        }
    }
}

// ============================================================================
// Method identifiers
// ============================================================================

/// Method name reduced to identifier characters
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Trampoline identifier: sanitized method name plus per-type ordinal
pub fn trampoline_ident(method: &str, ordinal: usize) -> String {
    format!("{}_{}", sanitize(method), ordinal)
}
