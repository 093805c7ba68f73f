//! Backends consuming marshalling plans
//!
//! - [`closure`]: compiles plans into in-memory trampolines and installs
//!   them into a registry
//! - [`rust`]: renders plans as Rust source for a build-time step

pub mod closure;
pub mod rust;

pub use closure::{compile, execute, install, InstallReport};
pub use rust::{render, render_aggregate, render_module, RenderedGeneration, RenderedModule};
