//! End-to-end runs of the `stackbind` binary.

use std::path::PathBuf;
use std::process::Command;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn stackbind() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stackbind"))
}

#[test]
fn test_generate_writes_modules_and_aggregate() {
    let out = tempfile::tempdir().unwrap();
    let status = stackbind()
        .arg("generate")
        .arg("--catalogue")
        .arg(fixtures_dir().join("catalogue.json"))
        .arg("--out")
        .arg(out.path())
        .status()
        .unwrap();
    assert!(status.success());

    assert!(out.path().join("demo_Math_Binding.rs").exists());
    assert!(out.path().join("demo_collections_Table_3String_5_Binding.rs").exists());
    let aggregate = std::fs::read_to_string(out.path().join("bindings.rs")).unwrap();
    assert!(aggregate.starts_with("// fingerprint: "));
    assert!(aggregate.contains("demo_Math_Binding"));
}

#[test]
fn test_generate_suffix_flag_overrides_default() {
    let out = tempfile::tempdir().unwrap();
    let status = stackbind()
        .args(["generate", "--suffix", "_Gen", "--catalogue"])
        .arg(fixtures_dir().join("catalogue.json"))
        .arg("--out")
        .arg(out.path())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out.path().join("demo_Math_Gen.rs").exists());
}

#[test]
fn test_inspect_prints_signatures() {
    let output = stackbind()
        .args(["inspect", "--catalogue"])
        .arg(fixtures_dir().join("catalogue.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("demo::Math::Swap(&mut f64, &mut f64)"));
    assert!(stdout.contains("demo::collections::Table<String>::get_Item(String)"));
    assert!(stdout.contains("skipped add_Changed: "));
}

#[test]
fn test_bad_catalogue_fails() {
    let out = tempfile::tempdir().unwrap();
    let status = stackbind()
        .args(["generate", "--catalogue", "does-not-exist.json", "--out"])
        .arg(out.path())
        .status()
        .unwrap();
    assert!(!status.success());
}
