//! Embedding the wasm image into the JS loader
//!
//! wasm-bindgen ends the loader with `export default __wbg_init;`, leaving the
//! caller to point the initializer at the `_bg.wasm` file. The patch swaps that
//! statement for a default export that hands the initializer the image as a
//! data URI, so the package no longer needs the separate file at runtime.

use crate::data_uri::{decode_wasm_data_uri, wasm_data_uri, DataUriError, WASM_DATA_URI_PREFIX};
use thiserror::Error;

/// Longest line excerpt carried in a [`LoaderError`]
const EXCERPT_LEN: usize = 120;

/// Errors that can occur while patching a loader
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Marker statement absent
    #[error(
        "Patch target {marker:?} not found in loader (first line: {first_line:?}, last line: {last_line:?}); {}",
        not_found_hint(.already_patched)
    )]
    PatchTargetNotFound {
        marker: String,
        first_line: String,
        last_line: String,
        already_patched: bool,
    },

    /// Marker statement present more than once
    #[error("Patch target {marker:?} found {occurrences} times in loader, expected exactly once")]
    AmbiguousPatchTarget { marker: String, occurrences: usize },
}

fn not_found_hint(already_patched: &bool) -> &'static str {
    if *already_patched {
        "the loader already embeds a wasm image"
    } else {
        "the generated loader format may have changed"
    }
}

/// The default-export statement wasm-bindgen emits for `init_symbol`
pub fn default_export_marker(init_symbol: &str) -> String {
    format!("export default {};", init_symbol)
}

/// Default export that initializes from an inline data URI
fn embedded_default_export(init_symbol: &str, data_uri: &str) -> String {
    format!(
        "export default function () {{\n    return {}(\"{}\");\n}}",
        init_symbol, data_uri
    )
}

fn embedded_call_prefix(init_symbol: &str) -> String {
    format!("{}(\"{}", init_symbol, WASM_DATA_URI_PREFIX)
}

/// Replace the loader's default export with one that embeds `image`
///
/// The marker must appear exactly once. A loader that was already patched no
/// longer contains it and is rejected with
/// [`LoaderError::PatchTargetNotFound`].
pub fn patch_loader(text: &str, image: &[u8], init_symbol: &str) -> Result<String, LoaderError> {
    let marker = default_export_marker(init_symbol);

    match text.matches(marker.as_str()).count() {
        0 => {
            return Err(LoaderError::PatchTargetNotFound {
                first_line: excerpt(text.lines().find(|l| !l.trim().is_empty())),
                last_line: excerpt(text.lines().rev().find(|l| !l.trim().is_empty())),
                already_patched: loader_is_patched(text, init_symbol),
                marker,
            })
        }
        1 => {}
        occurrences => {
            return Err(LoaderError::AmbiguousPatchTarget {
                marker,
                occurrences,
            })
        }
    }

    let data_uri = wasm_data_uri(image);
    log::debug!(
        "embedding {} byte image as {} byte data URI",
        image.len(),
        data_uri.len()
    );

    Ok(text.replacen(
        marker.as_str(),
        &embedded_default_export(init_symbol, &data_uri),
        1,
    ))
}

/// Whether the loader already passes an inline image to `init_symbol`
pub fn loader_is_patched(text: &str, init_symbol: &str) -> bool {
    text.contains(&embedded_call_prefix(init_symbol))
}

/// Decode the image embedded by [`patch_loader`], if there is one
pub fn extract_embedded_image(
    text: &str,
    init_symbol: &str,
) -> Result<Option<Vec<u8>>, DataUriError> {
    let call = format!("{}(\"", init_symbol);
    let start = match text.find(&embedded_call_prefix(init_symbol)) {
        Some(pos) => pos + call.len(),
        None => return Ok(None),
    };

    let rest = &text[start..];
    let uri = match rest.find('"') {
        Some(end) => &rest[..end],
        None => rest,
    };
    decode_wasm_data_uri(uri).map(Some)
}

fn excerpt(line: Option<&str>) -> String {
    let line = line.unwrap_or("").trim();
    match line.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];

    const LOADER: &str = "let wasm;\n\
        async function __wbg_init(input) {\n    return wasm;\n}\n\
        \n\
        export { initSync };\n\
        export default __wbg_init;\n";

    #[test]
    fn test_marker() {
        assert_eq!(default_export_marker("__wbg_init"), "export default __wbg_init;");
        assert_eq!(default_export_marker("init"), "export default init;");
    }

    #[test]
    fn test_patch_embeds_data_uri() {
        let patched = patch_loader(LOADER, &WASM_MAGIC, "__wbg_init").unwrap();

        assert!(!patched.contains("export default __wbg_init;"));
        assert!(patched.contains("__wbg_init(\"data:application/wasm;base64,AGFzbQ\")"));
        assert_eq!(patched.matches("export default function").count(), 1);
        assert!(patched.starts_with("let wasm;\n"));
        assert!(patched.ends_with("}\n"));
    }

    #[test]
    fn test_patch_is_exact() {
        let patched = patch_loader("export default __wbg_init;", &WASM_MAGIC, "__wbg_init").unwrap();
        assert_eq!(
            patched,
            "export default function () {\n    return __wbg_init(\"data:application/wasm;base64,AGFzbQ\");\n}"
        );
    }

    #[test]
    fn test_custom_init_symbol() {
        let loader = "function init(input) {}\nexport default init;\n";
        let patched = patch_loader(loader, &WASM_MAGIC, "init").unwrap();
        assert!(patched.contains("return init(\"data:application/wasm;base64,AGFzbQ\");"));
        assert!(!patched.contains("export default init;"));
    }

    #[test]
    fn test_missing_marker() {
        let loader = "// header\nexport default something_else;\n\n";
        let err = patch_loader(loader, &WASM_MAGIC, "__wbg_init").unwrap_err();

        match err {
            LoaderError::PatchTargetNotFound {
                marker,
                first_line,
                last_line,
                already_patched,
            } => {
                assert_eq!(marker, "export default __wbg_init;");
                assert_eq!(first_line, "// header");
                assert_eq!(last_line, "export default something_else;");
                assert!(!already_patched);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_second_patch_fails_fast() {
        let patched = patch_loader(LOADER, &WASM_MAGIC, "__wbg_init").unwrap();
        let err = patch_loader(&patched, &WASM_MAGIC, "__wbg_init").unwrap_err();

        assert!(matches!(
            err,
            LoaderError::PatchTargetNotFound {
                already_patched: true,
                ..
            }
        ));
        assert!(err.to_string().contains("already embeds"));
    }

    #[test]
    fn test_duplicate_marker() {
        let loader = "export default __wbg_init;\nexport default __wbg_init;\n";
        let err = patch_loader(loader, &WASM_MAGIC, "__wbg_init").unwrap_err();
        assert!(matches!(
            err,
            LoaderError::AmbiguousPatchTarget { occurrences: 2, .. }
        ));
    }

    #[test]
    fn test_extract_embedded_image() {
        let image: Vec<u8> = (0..=255u8).rev().collect();
        let patched = patch_loader(LOADER, &image, "__wbg_init").unwrap();

        assert!(loader_is_patched(&patched, "__wbg_init"));
        assert_eq!(
            extract_embedded_image(&patched, "__wbg_init").unwrap(),
            Some(image)
        );
    }

    #[test]
    fn test_extract_from_unpatched_loader() {
        assert!(!loader_is_patched(LOADER, "__wbg_init"));
        assert_eq!(extract_embedded_image(LOADER, "__wbg_init").unwrap(), None);
    }

    #[test]
    fn test_excerpt_truncates_long_lines() {
        let long = "x".repeat(500);
        let cut = excerpt(Some(&long));
        assert_eq!(cut.len(), EXCERPT_LEN + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt(None), "");
    }
}
