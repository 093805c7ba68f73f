//! `stackbind inspect`: print what generation would produce.

use std::io::Write;
use std::path::Path;

use stackbind_gen::Generator;

use super::{load_catalogue, load_options};

pub fn execute(catalogue: &Path, config: Option<&Path>, out: &mut impl Write) -> anyhow::Result<()> {
    let options = load_options(config)?;
    let catalogue = load_catalogue(catalogue)?;
    let generation = Generator::with_options(&catalogue, options).generate()?;

    for module in &generation.modules {
        writeln!(out, "{}  ({})", module.ident, module.reference)?;
        for plan in &module.plans {
            writeln!(out, "  {:<24} {}", plan.ident, plan.signature)?;
        }
        for (method, reason) in &module.skipped {
            writeln!(out, "  skipped {}: {}", method, reason)?;
        }
        for diagnostic in &module.diagnostics {
            writeln!(out, "  error {}: {}", diagnostic.method, diagnostic.message)?;
        }
    }
    for ty in &generation.skipped_types {
        writeln!(out, "{}  (obsolete, skipped)", ty)?;
    }
    writeln!(
        out,
        "{} modules, {} registrations",
        generation.modules.len(),
        generation.registrations()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CATALOGUE: &str = r#"{
      "types": [
        {
          "type": { "namespace": "demo", "name": "Math", "category": "Class" },
          "methods": [
            {
              "name": "Abs",
              "is_static": true,
              "params": [{ "name": "v", "type": { "name": "i64", "category": "Primitive" } }],
              "return_type": { "name": "i64", "category": "Primitive" }
            },
            { "name": "Run", "is_static": true, "generic_params": 1 }
          ]
        }
      ]
    }"#;

    #[test]
    fn test_inspect_lists_plans_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");
        fs::write(&path, CATALOGUE).unwrap();

        let mut out = Vec::new();
        execute(&path, None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("demo_Math_Binding  (demo::Math)"));
        assert!(text.contains("demo::Math::Abs(i64)"));
        assert!(text.contains("skipped Run:"));
        assert!(text.ends_with("1 modules, 1 registrations\n"));
    }

    #[test]
    fn test_inspect_honours_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");
        let config = dir.path().join("stackbind.toml");
        fs::write(&path, CATALOGUE).unwrap();
        fs::write(&config, "suffix = \"_Gen\"\n").unwrap();

        let mut out = Vec::new();
        execute(&path, Some(&config), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("demo_Math_Gen"));
    }

    #[test]
    fn test_missing_catalogue_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = execute(&dir.path().join("nope.json"), None, &mut out).unwrap_err();
        assert!(err.to_string().contains("failed to load catalogue"));
    }
}
