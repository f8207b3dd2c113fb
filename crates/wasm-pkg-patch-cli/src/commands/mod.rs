//! Command implementations
//!
//! `patch` rewrites the package; `check` only reports its state.

pub mod check;
pub mod patch;

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use wasm_pkg_patch::PatchConfig;

/// Flags that override the config file, field by field
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Package directory produced by wasm-pack
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Base name of `<base>.js` and `<base>_bg.wasm`
    #[arg(long = "module", value_name = "NAME")]
    pub module_base_name: Option<String>,

    /// Package name to publish under (e.g. "@scope/name")
    #[arg(long = "name", value_name = "PKG")]
    pub target_package_name: Option<String>,

    /// Initializer symbol exported by the loader
    #[arg(long, value_name = "SYM")]
    pub init_symbol: Option<String>,

    /// Descriptor filename inside the package directory
    #[arg(long = "descriptor", value_name = "FILE")]
    pub descriptor_file: Option<String>,

    /// TOML file with defaults for the options above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Flags > config file > built-in defaults
    pub fn resolve(&self) -> anyhow::Result<PatchConfig> {
        let mut config = match &self.config {
            // Validated below, once the flags are applied
            Some(path) => PatchConfig::parse_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PatchConfig::default(),
        };

        if let Some(root) = &self.root {
            config.package_root = root.clone();
        }
        if let Some(name) = &self.module_base_name {
            config.module_base_name = name.clone();
        }
        if let Some(name) = &self.target_package_name {
            config.target_package_name = name.clone();
        }
        if let Some(symbol) = &self.init_symbol {
            config.init_symbol = symbol.clone();
        }
        if let Some(file) = &self.descriptor_file {
            config.descriptor_file = file.clone();
        }

        config.validate()?;
        log::debug!("resolved config: {:?}", config);
        Ok(config)
    }
}
