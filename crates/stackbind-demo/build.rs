//! Build script generating the demo bindings
//!
//! Renders catalogue.json with the default options and writes the single
//! file form to OUT_DIR/bindings.rs, which src/lib.rs includes.

use std::env;
use std::fs;
use std::path::Path;

use stackbind_gen::backend::rust::render;
use stackbind_gen::{GenError, GenResult, GenerateOptions, Generator, StaticCatalogue};

fn generate(catalogue: &Path, output: &Path) -> GenResult<()> {
    let catalogue = StaticCatalogue::load(catalogue)?;
    let options = GenerateOptions::default();
    let generation = Generator::with_options(&catalogue, options.clone()).generate()?;
    let rendered = render(&generation, &options)?;
    for diagnostic in rendered.modules.iter().flat_map(|m| m.diagnostics.iter()) {
        println!("cargo:warning={}", diagnostic);
    }
    let source = rendered.single_file()?;
    fs::write(output, source).map_err(|source| GenError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    let catalogue = Path::new(&manifest_dir).join("catalogue.json");
    println!("cargo:rerun-if-changed={}", catalogue.display());

    let output = Path::new(&out_dir).join("bindings.rs");
    if let Err(e) = generate(&catalogue, &output) {
        panic!("failed to generate bindings from {}: {}", catalogue.display(), e);
    }
}
