//! Patch pipeline
//!
//! Runs the two package rewrites against one package directory, strictly in
//! order: the descriptor first, then the loader. Any failure aborts the run,
//! so a broken descriptor never reaches the loader step.

use crate::config::{ConfigError, PatchConfig};
use crate::data_uri::DataUriError;
use crate::descriptor::{self, DescriptorError};
use crate::fs::{FsError, PackageFs};
use crate::loader::{self, LoaderError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline step, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Descriptor,
    Loader,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Descriptor => write!(f, "descriptor"),
            Step::Loader => write!(f, "loader"),
        }
    }
}

/// Errors that can abort a patch run
#[derive(Debug, Error)]
pub enum PatchError {
    /// Configuration rejected before touching any file
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A file could not be read or written
    #[error("{step} step failed: {source}")]
    Fs {
        step: Step,
        #[source]
        source: FsError,
    },

    /// Descriptor could not be patched
    #[error("descriptor step failed for {path}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: DescriptorError,
    },

    /// Loader could not be patched
    #[error("loader step failed for {path}: {source}")]
    Loader {
        path: PathBuf,
        #[source]
        source: LoaderError,
    },

    /// Loader carries an embedded image that does not decode
    #[error("embedded image in {path} is unreadable: {source}")]
    EmbeddedImage {
        path: PathBuf,
        #[source]
        source: DataUriError,
    },
}

impl PatchError {
    /// The step the failure belongs to, if it got past configuration
    pub fn step(&self) -> Option<Step> {
        match self {
            PatchError::Config(_) => None,
            PatchError::Fs { step, .. } => Some(*step),
            PatchError::Descriptor { .. } => Some(Step::Descriptor),
            PatchError::Loader { .. } | PatchError::EmbeddedImage { .. } => Some(Step::Loader),
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub descriptor_path: PathBuf,
    /// False when the descriptor was already in patched form
    pub descriptor_changed: bool,
    pub loader_path: PathBuf,
    /// Size of the wasm image that was embedded
    pub image_bytes: usize,
    /// Size of the rewritten loader
    pub loader_bytes: usize,
    /// Nothing was written
    pub dry_run: bool,
}

/// Patch state of a package directory, gathered without writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageStatus {
    pub descriptor_patched: bool,
    pub loader_patched: bool,
    /// Whether the embedded image matches `<base>_bg.wasm`; `None` when the
    /// loader embeds nothing or the wasm file is gone
    pub embedded_matches_image: Option<bool>,
}

impl PackageStatus {
    pub fn is_fully_patched(&self) -> bool {
        self.descriptor_patched && self.loader_patched && self.embedded_matches_image != Some(false)
    }
}

/// Applies the descriptor and loader patches to one package directory
pub struct Patcher<F: PackageFs> {
    fs: F,
    config: PatchConfig,
    dry_run: bool,
}

impl<F: PackageFs> Patcher<F> {
    pub fn new(fs: F, config: PatchConfig) -> Self {
        Self {
            fs,
            config,
            dry_run: false,
        }
    }

    /// Compute every change but skip the writes
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn into_fs(self) -> F {
        self.fs
    }

    /// Patch the descriptor, then embed the image into the loader
    pub fn run(&mut self) -> Result<PatchReport, PatchError> {
        self.config.validate()?;
        if !self.config.is_scoped() {
            log::warn!(
                "target package name {:?} has no @scope/ prefix",
                self.config.target_package_name
            );
        }

        let descriptor_changed = self.patch_descriptor()?;
        let (image_bytes, loader_bytes) = self.embed_loader()?;

        Ok(PatchReport {
            descriptor_path: self.config.descriptor_path(),
            descriptor_changed,
            loader_path: self.config.loader_path(),
            image_bytes,
            loader_bytes,
            dry_run: self.dry_run,
        })
    }

    /// Rewrite the descriptor in place, returning whether its text changed
    pub fn patch_descriptor(&mut self) -> Result<bool, PatchError> {
        let path = self.config.descriptor_path();
        let fs_err = |source: FsError| PatchError::Fs {
            step: Step::Descriptor,
            source,
        };

        let text = self.fs.read_text(&path).map_err(fs_err)?;
        log::debug!("read {} bytes from {}", text.len(), path.display());

        let patched = descriptor::patch_descriptor(&text, &self.config.target_package_name)
            .map_err(|source| PatchError::Descriptor {
                path: path.clone(),
                source,
            })?;
        let changed = patched != text;

        if self.dry_run {
            log::info!("dry run: would rewrite {}", path.display());
        } else {
            self.fs.write_text(&path, &patched).map_err(fs_err)?;
            log::info!("patched {}", path.display());
        }

        Ok(changed)
    }

    /// Embed the wasm image into the loader, returning the image and new
    /// loader sizes
    pub fn embed_loader(&mut self) -> Result<(usize, usize), PatchError> {
        let wasm_path = self.config.wasm_path();
        let loader_path = self.config.loader_path();
        let fs_err = |source: FsError| PatchError::Fs {
            step: Step::Loader,
            source,
        };

        let image = self.fs.read_binary(&wasm_path).map_err(fs_err)?;
        log::debug!("read {} bytes from {}", image.len(), wasm_path.display());

        let text = self.fs.read_text(&loader_path).map_err(fs_err)?;
        let patched = loader::patch_loader(&text, &image, &self.config.init_symbol).map_err(
            |source| PatchError::Loader {
                path: loader_path.clone(),
                source,
            },
        )?;

        if self.dry_run {
            log::info!("dry run: would rewrite {}", loader_path.display());
        } else {
            self.fs.write_text(&loader_path, &patched).map_err(fs_err)?;
            log::info!(
                "embedded {} into {}",
                wasm_path.display(),
                loader_path.display()
            );
        }

        Ok((image.len(), patched.len()))
    }

    /// Inspect the package without writing anything
    pub fn status(&self) -> Result<PackageStatus, PatchError> {
        let descriptor_path = self.config.descriptor_path();
        let descriptor_text = self
            .fs
            .read_text(&descriptor_path)
            .map_err(|source| PatchError::Fs {
                step: Step::Descriptor,
                source,
            })?;
        let descriptor_patched =
            descriptor::descriptor_is_patched(&descriptor_text, &self.config.target_package_name)
                .map_err(|source| PatchError::Descriptor {
                    path: descriptor_path,
                    source,
                })?;

        let loader_path = self.config.loader_path();
        let loader_err = |source: FsError| PatchError::Fs {
            step: Step::Loader,
            source,
        };
        let loader_text = self.fs.read_text(&loader_path).map_err(loader_err)?;
        let loader_patched = loader::loader_is_patched(&loader_text, &self.config.init_symbol);

        let embedded = loader::extract_embedded_image(&loader_text, &self.config.init_symbol)
            .map_err(|source| PatchError::EmbeddedImage {
                path: loader_path.clone(),
                source,
            })?;

        let embedded_matches_image = match embedded {
            Some(embedded) => match self.fs.read_binary(&self.config.wasm_path()) {
                Ok(image) => Some(image == embedded),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(loader_err(e)),
            },
            None => None,
        };

        Ok(PackageStatus {
            descriptor_patched,
            loader_patched,
            embedded_matches_image,
        })
    }
}
