//! Patch configuration
//!
//! Names the package directory, the compiled module and the identifier the
//! package is republished under. Loaded from an optional TOML file and
//! overridden field by field by the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default package directory produced by wasm-pack
pub const DEFAULT_PACKAGE_ROOT: &str = "./pkg";

/// Default compiled module base name
pub const DEFAULT_MODULE_BASE_NAME: &str = "fvd_rs";

/// Default publishable package identifier
pub const DEFAULT_TARGET_PACKAGE_NAME: &str = "@elimerl/fvd-rs";

/// Default wasm-bindgen initializer symbol
pub const DEFAULT_INIT_SYMBOL: &str = "__wbg_init";

/// Default descriptor filename
pub const DEFAULT_DESCRIPTOR_FILE: &str = "package.json";

/// Errors that can occur while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Everything the patcher needs to know about one package directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct PatchConfig {
    /// Package directory containing the descriptor, loader and wasm image
    pub package_root: PathBuf,

    /// Base name shared by `<base>.js` and `<base>_bg.wasm`
    pub module_base_name: String,

    /// Identifier written into the descriptor's `name` field
    pub target_package_name: String,

    /// Internal initializer the loader's default export points at
    pub init_symbol: String,

    /// Descriptor filename inside the package root
    pub descriptor_file: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            package_root: PathBuf::from(DEFAULT_PACKAGE_ROOT),
            module_base_name: DEFAULT_MODULE_BASE_NAME.to_string(),
            target_package_name: DEFAULT_TARGET_PACKAGE_NAME.to_string(),
            init_symbol: DEFAULT_INIT_SYMBOL.to_string(),
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_string(),
        }
    }
}

impl PatchConfig {
    /// Create a config for the given package root with default names
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a config from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file without validating the values.
    ///
    /// For callers that layer overrides on top and call [`validate`](Self::validate)
    /// on the merged result.
    pub fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content)
    }

    /// Deserialize a config without validating the values
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_package_name(&self.target_package_name) {
            return Err(ConfigError::Invalid(format!(
                "Invalid target package name: {}. Must contain only alphanumeric characters, hyphens, underscores, dots, and optional @scope/ prefix",
                self.target_package_name
            )));
        }

        if !is_valid_file_stem(&self.module_base_name) {
            return Err(ConfigError::Invalid(format!(
                "Invalid module base name: {:?}",
                self.module_base_name
            )));
        }

        if !is_valid_file_stem(&self.descriptor_file) {
            return Err(ConfigError::Invalid(format!(
                "Invalid descriptor filename: {:?}",
                self.descriptor_file
            )));
        }

        if !is_valid_js_identifier(&self.init_symbol) {
            return Err(ConfigError::Invalid(format!(
                "Invalid init symbol: {:?}. Must be a JavaScript identifier",
                self.init_symbol
            )));
        }

        Ok(())
    }

    /// Whether the target identifier carries an `@scope/` prefix
    pub fn is_scoped(&self) -> bool {
        self.target_package_name.starts_with('@')
    }

    /// Path to the package descriptor
    pub fn descriptor_path(&self) -> PathBuf {
        self.package_root.join(&self.descriptor_file)
    }

    /// Path to the JS loader module
    pub fn loader_path(&self) -> PathBuf {
        self.package_root.join(format!("{}.js", self.module_base_name))
    }

    /// Path to the compiled wasm image
    pub fn wasm_path(&self) -> PathBuf {
        self.package_root.join(format!("{}_bg.wasm", self.module_base_name))
    }
}

/// Validate a package name
fn is_valid_package_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    // Handle scoped packages (@scope/package)
    if let Some(scoped) = name.strip_prefix('@') {
        return match scoped.split_once('/') {
            Some((scope, pkg)) => is_valid_name_part(scope) && is_valid_name_part(pkg),
            None => false,
        };
    }

    is_valid_name_part(name)
}

/// Validate a name part (alphanumeric, hyphens, underscores, dots)
fn is_valid_name_part(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// A bare filename component: no separators, no whitespace
fn is_valid_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace())
}

fn is_valid_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
