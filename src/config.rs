//! Configuration for parsing and for the command-line front end.
//!
//! [`ParseOptions`] is what the library needs per call. [`Config`] is the
//! tool-level configuration, optionally loaded from a YAML file, from which
//! per-file options are derived.
//!
//! ```yaml
//! strict: true
//! extensions: [pyi]
//! color: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-call parse options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Name shown in diagnostics, usually the file path.
    pub source_name: String,
    /// Reject documents with structural inconsistencies.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_name: "source".to_string(),
            strict: false,
        }
    }
}

impl ParseOptions {
    pub fn named(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub strict: bool,
    /// File extensions picked up when a directory is given.
    pub extensions: Vec<String>,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            extensions: vec!["pyi".to_string()],
            color: atty::is(atty::Stream::Stdout),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(code(thriftstub::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}")]
    #[diagnostic(
        code(thriftstub::config::format),
        help("expected keys: strict, extensions, color")
    )]
    Format {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Parse options for one file.
    pub fn parse_options(&self, path: &Path) -> ParseOptions {
        ParseOptions::named(path.display().to_string()).strict(self.strict)
    }

    /// Whether `path` has one of the configured extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.trim_start_matches('.') == ext))
            .unwrap_or(false)
    }
}
