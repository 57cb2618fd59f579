//! Per-class validation options.
//!
//! Options are plain serde data so they can live in a TOML file next to the
//! code that defines the classes:
//!
//! ```toml
//! collection_check = "first_item"
//! strict_validators = false
//! ```

use crate::core::error::OptionsError;
use crate::core::types::CollectionCheck;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs controlling how strictly a class is validated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationOptions {
    /// How many container elements the type checks inspect.
    pub collection_check: CollectionCheck,
    /// Require each `validate_<name>` to declare exactly the parameters of the
    /// method it guards and a `None` return annotation.
    pub strict_validators: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            collection_check: CollectionCheck::AllItems,
            strict_validators: true,
        }
    }
}

impl ValidationOptions {
    /// Lenient options: first-item collection checks, no validator contract.
    pub fn lenient() -> Self {
        Self {
            collection_check: CollectionCheck::FirstItem,
            strict_validators: false,
        }
    }

    /// Parse options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_strict() {
        let options = ValidationOptions::default();
        assert!(options.strict_validators);
        assert_eq!(options.collection_check, CollectionCheck::AllItems);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = ValidationOptions::from_toml_str("collection_check = \"first_item\"").unwrap();
        assert_eq!(options.collection_check, CollectionCheck::FirstItem);
        assert!(options.strict_validators);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strict_validators = false").unwrap();

        let options = ValidationOptions::from_file(file.path()).unwrap();
        assert!(!options.strict_validators);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ValidationOptions::from_toml_str("collection_check = 3").unwrap_err();
        assert!(matches!(err, OptionsError::Parse(_)));

        let err = ValidationOptions::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, OptionsError::Io(_)));
    }
}
