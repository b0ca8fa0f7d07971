// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compiler configuration.
//!
//! The defaults reproduce the limits of the MicroJava virtual machine.
//! Options can also be read from a TOML table:
//!
//! ```toml
//! max_locals = 64
//! entry_point = "start"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Options for one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Maximum number of program-level declarations
    pub max_globals: usize,

    /// Maximum number of fields per class
    pub max_fields: usize,

    /// Maximum number of parameters plus locals per method
    pub max_locals: usize,

    /// Tokens that must pass after a diagnostic before the next one is kept
    pub min_error_distance: u32,

    /// Name of the method the program starts in
    pub entry_point: String,

    /// Field width pushed by `print` when the source gives none
    pub default_print_width: i32,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_globals: 32767,
            max_fields: 32767,
            max_locals: 127,
            min_error_distance: 3,
            entry_point: "main".to_string(),
            default_print_width: 1,
        }
    }
}

impl CompilerOptions {
    /// Parse options from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults_match_vm_limits() {
        let options = CompilerOptions::default();
        assert_eq!(options.max_locals, 127);
        assert_eq!(options.max_globals, 32767);
        assert_eq!(options.entry_point, "main");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = CompilerOptions::from_toml_str("max_locals = 4\n").unwrap();
        assert_eq!(options.max_locals, 4);
        assert_eq!(options.max_fields, 32767);
        assert_eq!(options.min_error_distance, 3);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = CompilerOptions::from_toml_str("max_locals = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mj.toml");
        std::fs::write(&path, "entry_point = \"start\"\n").unwrap();

        let options = CompilerOptions::load(&path).unwrap();
        assert_eq!(options.entry_point, "start");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompilerOptions::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
