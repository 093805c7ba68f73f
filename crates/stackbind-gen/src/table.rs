//! Binding modules and the aggregate registration table
//!
//! A [`BindingModule`] holds the plans of one type in ordinal order; the
//! [`Aggregate`] lists modules in catalogue order. Lookups at run time are
//! by signature, so order only matters for deterministic output.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::catalogue::Catalogue;
use crate::descriptor::TypeRef;
use crate::error::{GenError, GenResult};
use crate::filter::{eligible_methods, SkipReason};
use crate::naming::{binding_ident, reference_string};
use crate::options::GenerateOptions;
use crate::plan::{build_plan, TrampolinePlan};

/// A member-level generation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Declaring type reference string
    pub declaring: String,
    /// Method name
    pub method: String,
    /// Error message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}: {}", self.declaring, self.method, self.message)
    }
}

/// Generated artifact for one type.
#[derive(Debug, Clone)]
pub struct BindingModule {
    /// Binding identifier (module and file name)
    pub ident: String,
    /// Bound type
    pub ty: TypeRef,
    /// Reference string of the bound type
    pub reference: String,
    /// One plan per eligible method, in ordinal order
    pub plans: Vec<TrampolinePlan>,
    /// Methods excluded by the filter
    pub skipped: Vec<(String, SkipReason)>,
    /// Methods whose generation failed
    pub diagnostics: Vec<Diagnostic>,
    /// Content fingerprint (hex SHA-256)
    pub fingerprint: String,
}

impl BindingModule {
    /// Number of registrations this module performs
    pub fn registrations(&self) -> usize {
        self.plans.len()
    }
}

/// The aggregate initializer: every module in catalogue order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    /// Module name of the initializer
    pub name: String,
    /// Binding identifiers in catalogue order
    pub modules: Vec<String>,
}

/// Fingerprint over the type descriptor and the options
pub fn fingerprint<C: Catalogue + ?Sized>(
    catalogue: &C,
    ty: &TypeRef,
    options: &GenerateOptions,
) -> GenResult<String> {
    let desc = catalogue.describe(ty)?;
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(desc)?);
    hasher.update(serde_json::to_vec(options)?);
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Build the binding module of `ty`.
///
/// Member errors are recorded as diagnostics and logged; the rest of the
/// type is still generated.
pub fn build_module<C: Catalogue + ?Sized>(
    catalogue: &C,
    ty: &TypeRef,
    options: &GenerateOptions,
) -> GenResult<BindingModule> {
    let reference = reference_string(ty);
    let filtered = eligible_methods(catalogue, ty)?;

    let mut plans = Vec::with_capacity(filtered.eligible.len());
    let mut diagnostics = Vec::new();
    for eligible in filtered.eligible {
        match build_plan(ty, eligible) {
            Ok(plan) => plans.push(plan),
            Err(err) if err.is_member_error() => {
                log::warn!("{}::{}: {}", reference, eligible.method.name, err);
                diagnostics.push(Diagnostic {
                    declaring: reference.clone(),
                    method: eligible.method.name.clone(),
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(BindingModule {
        ident: binding_ident(ty, &options.suffix),
        ty: ty.clone(),
        reference,
        plans,
        skipped: filtered
            .skipped
            .into_iter()
            .map(|(m, reason)| (m.name.clone(), reason))
            .collect(),
        diagnostics,
        fingerprint: fingerprint(catalogue, ty, options)?,
    })
}

impl Aggregate {
    /// Aggregate over `modules` in the given order
    pub fn new(name: &str, modules: &[BindingModule]) -> Self {
        Self {
            name: name.to_string(),
            modules: modules.iter().map(|m| m.ident.clone()).collect(),
        }
    }
}

/// Check that no two modules share an identifier.
///
/// Naming is injective over distinct types, so a clash means a catalogue
/// implementation reported one type twice.
pub fn check_unique(modules: &[BindingModule]) -> GenResult<()> {
    let mut seen = rustc_hash::FxHashSet::default();
    for module in modules {
        if !seen.insert(module.ident.as_str()) {
            return Err(GenError::Catalogue(format!("duplicate binding module {}", module.ident)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::StaticCatalogue;
    use crate::descriptor::{MethodDescriptor, TypeDescriptor};

    fn catalogue() -> StaticCatalogue {
        let i32_ty = TypeRef::primitive("i32");
        StaticCatalogue::from_types(vec![TypeDescriptor::new(TypeRef::class("demo", "Math"))
            .method(
                MethodDescriptor::static_method("Add")
                    .param("a", i32_ty.clone())
                    .param("b", i32_ty.clone())
                    .returns(i32_ty.clone()),
            )
            .method(MethodDescriptor::static_method("Old").obsolete())
            .method(MethodDescriptor::static_method("op_Modulus").special().param("a", i32_ty.clone()))
            .method(MethodDescriptor::static_method("Neg").param("a", i32_ty.clone()).returns(i32_ty))]).unwrap()
    }

    #[test]
    fn test_build_module_collects_diagnostics() {
        let catalogue = catalogue();
        let module = build_module(&catalogue, &TypeRef::class("demo", "Math"), &GenerateOptions::default()).unwrap();
        assert_eq!(module.ident, "demo_Math_Binding");
        assert_eq!(module.reference, "demo::Math");
        assert_eq!(module.plans.iter().map(|p| p.ident.as_str()).collect::<Vec<_>>(), vec!["Add_0", "Neg_2"]);
        assert_eq!(module.skipped, vec![("Old".to_string(), SkipReason::Obsolete)]);
        assert_eq!(module.diagnostics.len(), 1);
        assert_eq!(module.diagnostics[0].method, "op_Modulus");
    }

    #[test]
    fn test_fingerprint_is_stable_and_option_sensitive() {
        let catalogue = catalogue();
        let ty = TypeRef::class("demo", "Math");
        let defaults = GenerateOptions::default();
        let a = fingerprint(&catalogue, &ty, &defaults).unwrap();
        let b = fingerprint(&catalogue, &ty, &defaults).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let other = GenerateOptions {
            suffix: "_Gen".to_string(),
            ..GenerateOptions::default()
        };
        assert_ne!(a, fingerprint(&catalogue, &ty, &other).unwrap());
    }
}
