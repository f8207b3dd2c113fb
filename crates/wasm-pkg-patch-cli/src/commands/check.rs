//! `wasm-pkg-patch --check` — Report whether a package is already patched.

use crate::output::{FileState, StyledOutput};
use wasm_pkg_patch::{DiskFs, PatchConfig, Patcher};

/// Returns true when both files are in patched form
pub fn execute(config: PatchConfig, out: &mut StyledOutput) -> anyhow::Result<bool> {
    let descriptor_path = config.descriptor_path();
    let loader_path = config.loader_path();

    let status = Patcher::new(DiskFs::new(), config).status()?;

    out.file_line(state(status.descriptor_patched), "", &descriptor_path, "");
    out.file_line(state(status.loader_patched), "", &loader_path, "");

    match status.embedded_matches_image {
        Some(true) => out.note("embedded image matches the wasm file", false),
        Some(false) => out.note("embedded image differs from the wasm file", true),
        None => {}
    }

    let patched = status.is_fully_patched();
    if patched {
        out.summary(true, "Package is patched.");
    } else {
        out.summary(false, "Package is not fully patched.");
    }

    Ok(patched)
}

fn state(patched: bool) -> FileState {
    if patched {
        FileState::Patched
    } else {
        FileState::Pending
    }
}
