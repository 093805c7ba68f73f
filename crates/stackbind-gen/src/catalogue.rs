//! Type descriptor catalogues
//!
//! The generator only needs three capabilities from a metadata source:
//! describe a type, list its methods and answer obsolescence queries. Any
//! reflection or static-analysis facility can implement [`Catalogue`];
//! [`StaticCatalogue`] is the JSON-backed implementation used by the CLI.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::{MethodDescriptor, TypeDescriptor, TypeRef};
use crate::error::{GenError, GenResult};
use crate::naming::reference_string;

/// A member an obsolescence query is about
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// The type itself
    Type,
    /// A declared method
    Method(&'a MethodDescriptor),
    /// A declared property, by name
    Property(&'a str),
}

/// Read-only source of type descriptors.
pub trait Catalogue {
    /// Requested target types in catalogue order
    fn types(&self) -> Vec<TypeRef>;

    /// Full descriptor of `ty`
    fn describe(&self, ty: &TypeRef) -> GenResult<&TypeDescriptor>;

    /// Declared methods of `ty` in declaration order
    fn methods_of(&self, ty: &TypeRef) -> GenResult<&[MethodDescriptor]> {
        Ok(&self.describe(ty)?.methods)
    }

    /// Check if `member` of `ty` is deprecated.
    ///
    /// Unknown properties are not obsolete.
    fn is_obsolete(&self, ty: &TypeRef, member: Member<'_>) -> GenResult<bool> {
        let desc = self.describe(ty)?;
        Ok(match member {
            Member::Type => desc.obsolete,
            Member::Method(method) => method.obsolete,
            Member::Property(name) => desc.find_property(name).is_some_and(|p| p.obsolete),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
}

/// In-memory catalogue, optionally loaded from JSON.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogue {
    types: Vec<TypeDescriptor>,
    index: FxHashMap<String, usize>,
}

impl StaticCatalogue {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from descriptors in catalogue order
    pub fn from_types(types: Vec<TypeDescriptor>) -> GenResult<Self> {
        let mut catalogue = Self::new();
        for desc in types {
            catalogue.push(desc)?;
        }
        Ok(catalogue)
    }

    /// Add a descriptor.
    ///
    /// Type identity ignores the category, so a second descriptor for the
    /// same type is rejected even when it is listed under another category.
    pub fn push(&mut self, desc: TypeDescriptor) -> GenResult<()> {
        let key = reference_string(&desc.ty);
        if self.index.contains_key(&key) {
            return Err(GenError::Catalogue(format!("duplicate catalogue entry for {}", key)));
        }
        self.index.insert(key, self.types.len());
        self.types.push(desc);
        Ok(())
    }

    /// Parse the `{ "types": [...] }` JSON form
    pub fn from_json(json: &str) -> GenResult<Self> {
        let file: CatalogueFile = serde_json::from_str(json)?;
        Self::from_types(file.types)
    }

    /// Load a JSON catalogue from disk
    pub fn load(path: &Path) -> GenResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_json(&json)?;
        log::info!("loaded {} types from {}", catalogue.len(), path.display());
        Ok(catalogue)
    }

    /// Serialize back to the JSON form
    pub fn to_json(&self) -> GenResult<String> {
        let file = CatalogueFile {
            types: self.types.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Catalogue for StaticCatalogue {
    fn types(&self) -> Vec<TypeRef> {
        self.types.iter().map(|d| d.ty.clone()).collect()
    }

    fn describe(&self, ty: &TypeRef) -> GenResult<&TypeDescriptor> {
        let key = reference_string(ty);
        self.index
            .get(&key)
            .map(|&i| &self.types[i])
            .ok_or_else(|| GenError::Catalogue(format!("unknown type {}", key)))
    }
}
