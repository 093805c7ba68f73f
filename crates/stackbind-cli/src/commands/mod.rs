//! CLI command implementations.

pub mod generate;
pub mod inspect;

use std::path::Path;

use anyhow::Context;
use stackbind_gen::{GenerateOptions, StaticCatalogue};

/// Options from `config`, or the defaults
pub fn load_options(config: Option<&Path>) -> anyhow::Result<GenerateOptions> {
    match config {
        Some(path) => GenerateOptions::from_file(path)
            .with_context(|| format!("failed to read options from {}", path.display())),
        None => Ok(GenerateOptions::default()),
    }
}

/// Catalogue stored at `path`
pub fn load_catalogue(path: &Path) -> anyhow::Result<StaticCatalogue> {
    StaticCatalogue::load(path).with_context(|| format!("failed to load catalogue {}", path.display()))
}
