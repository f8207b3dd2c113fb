//! `wasm-pkg-patch` — Patch the descriptor and embed the wasm image.

use crate::output::{FileState, StyledOutput};
use wasm_pkg_patch::{DiskFs, PatchConfig, Patcher};

pub fn execute(config: PatchConfig, dry_run: bool, out: &mut StyledOutput) -> anyhow::Result<()> {
    let target = config.target_package_name.clone();
    let wasm_path = config.wasm_path();

    let report = Patcher::new(DiskFs::new(), config).dry_run(dry_run).run()?;

    let (state, verb) = if dry_run {
        (FileState::Planned, "would patch")
    } else {
        (FileState::Written, "patched")
    };

    let descriptor_detail = if report.descriptor_changed {
        format!("name = {}", target)
    } else {
        "already up to date".to_string()
    };
    out.file_line(state, verb, &report.descriptor_path, &descriptor_detail);
    out.file_line(
        state,
        verb,
        &report.loader_path,
        &format!("embedded {} bytes from {}", report.image_bytes, wasm_path.display()),
    );

    if !dry_run {
        out.summary(true, "Package is ready to publish.");
    }

    Ok(())
}
