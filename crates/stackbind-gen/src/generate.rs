//! Generation driver
//!
//! Walks the catalogue once, in catalogue order, and builds one binding
//! module per type plus the aggregate. Generation is a pure function of
//! the catalogue and the options.

use crate::catalogue::{Catalogue, Member};
use crate::error::GenResult;
use crate::naming::reference_string;
use crate::options::GenerateOptions;
use crate::table::{build_module, check_unique, Aggregate, BindingModule, Diagnostic};

/// Result of one generation run
#[derive(Debug, Clone)]
pub struct Generation {
    /// Modules in catalogue order
    pub modules: Vec<BindingModule>,
    /// Aggregate initializer
    pub aggregate: Aggregate,
    /// Types skipped as obsolete
    pub skipped_types: Vec<String>,
}

impl Generation {
    /// Total number of registrations
    pub fn registrations(&self) -> usize {
        self.modules.iter().map(BindingModule::registrations).sum()
    }

    /// All member diagnostics, module by module
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.modules.iter().flat_map(|m| m.diagnostics.iter())
    }

    /// Module with binding identifier `ident`
    pub fn module(&self, ident: &str) -> Option<&BindingModule> {
        self.modules.iter().find(|m| m.ident == ident)
    }
}

/// Binding generator over a catalogue.
pub struct Generator<'c, C: Catalogue + ?Sized> {
    catalogue: &'c C,
    options: GenerateOptions,
}

impl<'c, C: Catalogue + ?Sized> Generator<'c, C> {
    /// Create a generator with default options
    pub fn new(catalogue: &'c C) -> Self {
        Self::with_options(catalogue, GenerateOptions::default())
    }

    /// Create a generator with explicit options
    pub fn with_options(catalogue: &'c C, options: GenerateOptions) -> Self {
        Self { catalogue, options }
    }

    /// Options in effect
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate every module and the aggregate
    pub fn generate(&self) -> GenResult<Generation> {
        self.options.validate()?;

        let mut modules = Vec::new();
        let mut skipped_types = Vec::new();
        for ty in self.catalogue.types() {
            if self.options.skip_obsolete_types && self.catalogue.is_obsolete(&ty, Member::Type)? {
                let reference = reference_string(&ty);
                log::debug!("skipping obsolete type {}", reference);
                skipped_types.push(reference);
                continue;
            }
            let module = build_module(self.catalogue, &ty, &self.options)?;
            log::debug!(
                "{}: {} trampolines, {} skipped",
                module.reference,
                module.plans.len(),
                module.skipped.len()
            );
            modules.push(module);
        }
        check_unique(&modules)?;

        let aggregate = Aggregate::new(&self.options.aggregate, &modules);
        let generation = Generation {
            modules,
            aggregate,
            skipped_types,
        };
        log::info!(
            "generated {} modules with {} registrations ({} diagnostics)",
            generation.modules.len(),
            generation.registrations(),
            generation.diagnostics().count()
        );
        Ok(generation)
    }
}
