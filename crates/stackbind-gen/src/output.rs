//! Output writer for rendered bindings
//!
//! Writes one `<ident>.rs` per module and `<aggregate>.rs` into the output
//! directory. A file whose fingerprint header matches the rendered one is
//! left untouched, so build scripts do not retrigger on unchanged bindings.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::backend::rust::{RenderedGeneration, FINGERPRINT_HEADER};
use crate::error::{GenError, GenResult};

/// Files touched by a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files created or rewritten
    pub written: Vec<PathBuf>,
    /// Files left as they were
    pub unchanged: Vec<PathBuf>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenError + '_ {
    move |source| GenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Fingerprint recorded in the first line of `path`, if any
pub fn existing_fingerprint(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut first = String::new();
    BufReader::new(file).read_line(&mut first).ok()?;
    first
        .trim_end()
        .strip_prefix(FINGERPRINT_HEADER)
        .map(str::to_string)
}

fn write_file(path: PathBuf, fingerprint: &str, source: &str, report: &mut WriteReport) -> GenResult<()> {
    if existing_fingerprint(&path).as_deref() == Some(fingerprint) {
        log::debug!("{} is up to date", path.display());
        report.unchanged.push(path);
        return Ok(());
    }
    fs::write(&path, source).map_err(io_error(&path))?;
    log::debug!("wrote {}", path.display());
    report.written.push(path);
    Ok(())
}

/// Write every module and the aggregate into `out_dir`
pub fn write_generation(rendered: &RenderedGeneration, out_dir: &Path) -> GenResult<WriteReport> {
    fs::create_dir_all(out_dir).map_err(io_error(out_dir))?;

    let mut report = WriteReport::default();
    for module in &rendered.modules {
        let path = out_dir.join(format!("{}.rs", module.ident));
        write_file(path, &module.fingerprint, &module.source, &mut report)?;
    }
    let path = out_dir.join(format!("{}.rs", rendered.aggregate_name));
    write_file(path, &rendered.aggregate_fingerprint, &rendered.aggregate, &mut report)?;

    log::info!(
        "{}: {} files written, {} unchanged",
        out_dir.display(),
        report.written.len(),
        report.unchanged.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::rust::render;
    use crate::catalogue::StaticCatalogue;
    use crate::descriptor::{MethodDescriptor, TypeDescriptor, TypeRef};
    use crate::generate::Generator;
    use crate::options::GenerateOptions;

    fn rendered(method: &str) -> RenderedGeneration {
        let catalogue = StaticCatalogue::from_types(vec![TypeDescriptor::new(TypeRef::class("demo", "Clock"))
            .method(MethodDescriptor::static_method(method).returns(TypeRef::primitive("i64")))]).unwrap();
        let generation = Generator::new(&catalogue).generate().unwrap();
        render(&generation, &GenerateOptions::default()).unwrap()
    }

    #[test]
    fn test_write_creates_directory_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen");
        let report = write_generation(&rendered("Now"), &out).unwrap();

        assert_eq!(report.written.len(), 2);
        assert!(report.unchanged.is_empty());
        assert!(out.join("demo_Clock_Binding.rs").exists());
        assert!(out.join("bindings.rs").exists());
    }

    #[test]
    fn test_unchanged_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let first = rendered("Now");
        write_generation(&first, dir.path()).unwrap();

        let report = write_generation(&first, dir.path()).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.unchanged.len(), 2);

        let report = write_generation(&rendered("Ticks"), dir.path()).unwrap();
        assert_eq!(report.written.len(), 2);
        let source = fs::read_to_string(dir.path().join("demo_Clock_Binding.rs")).unwrap();
        assert!(source.contains("Ticks_0"));
    }

    #[test]
    fn test_fingerprint_header_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let generation = rendered("Now");
        write_generation(&generation, dir.path()).unwrap();
        assert_eq!(
            existing_fingerprint(&dir.path().join("demo_Clock_Binding.rs")),
            Some(generation.modules[0].fingerprint.clone())
        );
        assert_eq!(existing_fingerprint(&dir.path().join("missing.rs")), None);
    }

    #[test]
    fn test_unwritable_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_generation(&rendered("Now"), &blocker.join("sub")).unwrap_err();
        assert!(matches!(err, GenError::Io { .. }));
    }
}
