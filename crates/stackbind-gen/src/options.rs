//! Generation options (stackbind.toml)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::naming::DEFAULT_SUFFIX;

/// Options controlling naming and emitted code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerateOptions {
    /// Suffix appended to binding identifiers (default: "_Binding")
    pub suffix: String,

    /// Path of the runtime crate as seen from emitted code
    /// (default: "stackbind_sdk")
    pub runtime_crate: String,

    /// Module name of the aggregate initializer (default: "bindings")
    pub aggregate: String,

    /// Skip types marked obsolete (default: true)
    pub skip_obsolete_types: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            runtime_crate: "stackbind_sdk".to_string(),
            aggregate: "bindings".to_string(),
            skip_obsolete_types: true,
        }
    }
}

impl GenerateOptions {
    /// Parse options from TOML; missing keys take their defaults
    pub fn from_toml(source: &str) -> GenResult<Self> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a file
    pub fn from_file(path: &Path) -> GenResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Check that names used in emitted code are identifiers
    pub fn validate(&self) -> GenResult<()> {
        let is_ident = |s: &str| {
            !s.is_empty()
                && !s.starts_with(|c: char| c.is_ascii_digit())
                && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        };
        if !self.suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(GenError::InvalidOption(format!("invalid suffix {:?}", self.suffix)));
        }
        if !is_ident(&self.aggregate) {
            return Err(GenError::InvalidOption(format!("invalid aggregate name {:?}", self.aggregate)));
        }
        if !self.runtime_crate.split("::").all(is_ident) {
            return Err(GenError::InvalidOption(format!(
                "invalid runtime crate path {:?}",
                self.runtime_crate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GenerateOptions::from_toml("").unwrap();
        assert_eq!(options, GenerateOptions::default());
        assert_eq!(options.suffix, "_Binding");
    }

    #[test]
    fn test_partial_override() {
        let options = GenerateOptions::from_toml(
            r#"
suffix = "_Gen"
runtime_crate = "engine::sdk"
"#,
        )
        .unwrap();
        assert_eq!(options.suffix, "_Gen");
        assert_eq!(options.runtime_crate, "engine::sdk");
        assert_eq!(options.aggregate, "bindings");
        assert!(options.skip_obsolete_types);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(GenerateOptions::from_toml("aggregate = \"9lives\"").is_err());
        assert!(GenerateOptions::from_toml("suffix = \"-x\"").is_err());
        assert!(GenerateOptions::from_toml("skip_obsolete_types = \"yes\"").is_err());
    }
}
