//! `stackbind generate`: render the catalogue and write the binding files.

use std::path::PathBuf;

use anyhow::Context;
use stackbind_gen::backend::rust::render;
use stackbind_gen::{write_generation, Generator};

use super::{load_catalogue, load_options};

/// Arguments of `stackbind generate`
pub struct GenerateArgs {
    pub catalogue: PathBuf,
    pub out: PathBuf,
    pub config: Option<PathBuf>,
    pub suffix: Option<String>,
    pub runtime_crate: Option<String>,
}

pub fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let mut options = load_options(args.config.as_deref())?;
    if let Some(suffix) = args.suffix {
        options.suffix = suffix;
    }
    if let Some(runtime_crate) = args.runtime_crate {
        options.runtime_crate = runtime_crate;
    }

    let catalogue = load_catalogue(&args.catalogue)?;
    let generation = Generator::with_options(&catalogue, options.clone()).generate()?;
    let rendered = render(&generation, &options)?;

    for diagnostic in rendered.modules.iter().flat_map(|m| m.diagnostics.iter()) {
        eprintln!("warning: {}", diagnostic);
    }

    let report = write_generation(&rendered, &args.out)
        .with_context(|| format!("failed to write bindings to {}", args.out.display()))?;

    println!(
        "Generated {} modules ({} registrations) in {}",
        rendered.modules.len(),
        rendered.registrations(),
        args.out.display()
    );
    println!(
        "  {} files written, {} unchanged, {} types skipped",
        report.written.len(),
        report.unchanged.len(),
        generation.skipped_types.len()
    );
    Ok(())
}
