//! wasm-pkg-patch library
//!
//! Post-build patching for a wasm-bindgen package directory, including:
//! - Patch configuration (package root, module base name, target package name)
//! - Filesystem access as an injected capability (disk or in-memory)
//! - Package descriptor rewriting (package.json)
//! - Embedding the wasm image into the JS loader as a base64url data URI
//! - The patch pipeline tying both steps together

pub mod config;
pub mod data_uri;
pub mod descriptor;
pub mod fs;
pub mod loader;
pub mod patch;

pub use config::{ConfigError, PatchConfig};
pub use data_uri::{decode_wasm_data_uri, wasm_data_uri, DataUriError, WASM_DATA_URI_PREFIX};
pub use descriptor::{descriptor_is_patched, patch_descriptor, DescriptorError};
pub use fs::{DiskFs, FsError, MemoryFs, PackageFs};
pub use loader::{
    default_export_marker, extract_embedded_image, loader_is_patched, patch_loader, LoaderError,
};
pub use patch::{PackageStatus, PatchError, PatchReport, Patcher, Step};
