//! Stackbind generator - trampolines from a reflective catalogue
//!
//! Given a catalogue of native types, the generator derives for every
//! eligible method a marshalling plan: which evaluation-stack slots to pop,
//! how to convert them, how to reach the receiver, what to call and how to
//! push the result. Plans are grouped per type into binding modules and
//! consumed by one of two backends:
//!
//! - [`backend::closure`] compiles plans into closures over native entry
//!   points and installs them into a [`stackbind_sdk::MethodRegistry`];
//! - [`backend::rust`] renders Rust source, written by [`output`].
//!
//! # Pipeline
//!
//! ```text
//! Catalogue -> filter -> plan -> BindingModule -> backend
//!                                     |
//!                                  Aggregate (catalogue order)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stackbind_gen::{Generator, StaticCatalogue};
//!
//! let catalogue = StaticCatalogue::load(Path::new("catalogue.json"))?;
//! let generation = Generator::new(&catalogue).generate()?;
//! let rendered = stackbind_gen::backend::rust::render(&generation, &options)?;
//! stackbind_gen::output::write_generation(&rendered, Path::new("src/bindings"))?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod catalogue;
pub mod classify;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod generate;
pub mod naming;
pub mod options;
pub mod output;
pub mod plan;
pub mod table;

pub use catalogue::{Catalogue, Member, StaticCatalogue};
pub use descriptor::{
    MethodDescriptor, ParameterDescriptor, PropertyDescriptor, TypeCategory, TypeDescriptor, TypeRef, Visibility,
};
pub use error::{GenError, GenResult};
pub use filter::{eligible_methods, Eligible, SkipReason};
pub use generate::{Generation, Generator};
pub use naming::{binding_ident, reference_string, DEFAULT_SUFFIX};
pub use options::GenerateOptions;
pub use output::{write_generation, WriteReport};
pub use plan::{build_plan, Dispatch, Operator, ReturnStep, TrampolinePlan};
pub use table::{Aggregate, BindingModule, Diagnostic};
