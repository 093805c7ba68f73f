//! Method eligibility
//!
//! Decides per method whether a trampoline is generated. Exclusions are
//! policy, not errors: they are reported as a [`SkipReason`] and logged at
//! debug level.

use std::fmt;

use crate::catalogue::{Catalogue, Member};
use crate::descriptor::{MethodDescriptor, TypeRef, Visibility};
use crate::error::GenResult;

/// Why a method gets no trampoline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Not publicly callable
    NotPublic,
    /// Has open generic parameters
    Generic,
    /// Event subscribe/unsubscribe accessor
    EventAccessor,
    /// Deprecated method
    Obsolete,
    /// Accessor of a deprecated property
    ObsoleteProperty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::NotPublic => "not public",
            SkipReason::Generic => "generic method",
            SkipReason::EventAccessor => "event accessor",
            SkipReason::Obsolete => "obsolete",
            SkipReason::ObsoleteProperty => "obsolete property",
        })
    }
}

/// Eligibility of one method of `ty`; `Ok(None)` means eligible
pub fn check<C: Catalogue + ?Sized>(
    catalogue: &C,
    ty: &TypeRef,
    method: &MethodDescriptor,
) -> GenResult<Option<SkipReason>> {
    if method.visibility != Visibility::Public {
        return Ok(Some(SkipReason::NotPublic));
    }
    if method.generic_params > 0 {
        return Ok(Some(SkipReason::Generic));
    }
    if let Some((prefix, rest)) = method.special_parts() {
        match prefix {
            "add" | "remove" => return Ok(Some(SkipReason::EventAccessor)),
            "get" | "set" => {
                if catalogue.is_obsolete(ty, Member::Property(rest))? {
                    return Ok(Some(SkipReason::ObsoleteProperty));
                }
            }
            _ => {}
        }
    }
    if catalogue.is_obsolete(ty, Member::Method(method))? {
        return Ok(Some(SkipReason::Obsolete));
    }
    Ok(None)
}

/// A method that passed the filter, with its per-type ordinal
#[derive(Debug, Clone, Copy)]
pub struct Eligible<'a> {
    /// Position among eligible methods, in declaration order
    pub ordinal: usize,
    /// The method
    pub method: &'a MethodDescriptor,
}

/// Outcome of filtering every method of a type
#[derive(Debug, Clone, Default)]
pub struct Filtered<'a> {
    /// Methods that get a trampoline
    pub eligible: Vec<Eligible<'a>>,
    /// Methods that were skipped
    pub skipped: Vec<(&'a MethodDescriptor, SkipReason)>,
}

/// Filter the declared methods of `ty` and assign ordinals.
pub fn eligible_methods<'c, C: Catalogue + ?Sized>(catalogue: &'c C, ty: &TypeRef) -> GenResult<Filtered<'c>> {
    let mut out = Filtered::default();
    for method in catalogue.methods_of(ty)? {
        match check(catalogue, ty, method)? {
            None => {
                let ordinal = out.eligible.len();
                out.eligible.push(Eligible { ordinal, method });
            }
            Some(reason) => {
                log::debug!("skipping {}.{}: {}", ty.name, method.name, reason);
                out.skipped.push((method, reason));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::StaticCatalogue;
    use crate::descriptor::TypeDescriptor;

    fn widget() -> TypeRef {
        TypeRef::class("demo", "Widget")
    }

    fn catalogue() -> StaticCatalogue {
        let i32_ty = TypeRef::primitive("i32");
        StaticCatalogue::from_types(vec![TypeDescriptor::new(widget())
            .property("Size", false)
            .property("OldSize", true)
            .method(MethodDescriptor::instance("Draw"))
            .method(MethodDescriptor::instance("Hidden").visibility(Visibility::Private))
            .method(MethodDescriptor::instance("Map").generic(1))
            .method(MethodDescriptor::instance("add_Clicked").special())
            .method(MethodDescriptor::instance("remove_Clicked").special())
            .method(MethodDescriptor::instance("get_Size").special().returns(i32_ty.clone()))
            .method(MethodDescriptor::instance("get_OldSize").special().returns(i32_ty))
            .method(MethodDescriptor::instance("Paint").obsolete())
            .method(MethodDescriptor::instance("Resize"))]).unwrap()
    }

    #[test]
    fn test_skip_reasons() {
        let catalogue = catalogue();
        let filtered = eligible_methods(&catalogue, &widget()).unwrap();
        let reasons: Vec<_> = filtered.skipped.iter().map(|(m, r)| (m.name.as_str(), *r)).collect();
        assert_eq!(
            reasons,
            vec![
                ("Hidden", SkipReason::NotPublic),
                ("Map", SkipReason::Generic),
                ("add_Clicked", SkipReason::EventAccessor),
                ("remove_Clicked", SkipReason::EventAccessor),
                ("get_OldSize", SkipReason::ObsoleteProperty),
                ("Paint", SkipReason::Obsolete),
            ]
        );
    }

    #[test]
    fn test_ordinals_follow_declaration_order() {
        let catalogue = catalogue();
        let filtered = eligible_methods(&catalogue, &widget()).unwrap();
        let names: Vec<_> = filtered.eligible.iter().map(|e| (e.ordinal, e.method.name.as_str())).collect();
        assert_eq!(names, vec![(0, "Draw"), (1, "get_Size"), (2, "Resize")]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalogue = catalogue();
        for method in catalogue.methods_of(&widget()).unwrap() {
            let first = check(&catalogue, &widget(), method).unwrap();
            let second = check(&catalogue, &widget(), method).unwrap();
            assert_eq!(first, second, "{}", method.name);
        }
    }

    #[test]
    fn test_non_special_add_prefix_is_kept() {
        let catalogue = StaticCatalogue::from_types(vec![
            TypeDescriptor::new(widget()).method(MethodDescriptor::instance("add_Item"))
        ]).unwrap();
        let filtered = eligible_methods(&catalogue, &widget()).unwrap();
        assert_eq!(filtered.eligible.len(), 1);
    }
}
