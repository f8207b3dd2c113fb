//! Integration tests for package descriptor patching
//!
//! Tests patch_descriptor with package.json files as wasm-pack writes them.

use serde_json::Value;
use wasm_pkg_patch::{descriptor_is_patched, patch_descriptor, DescriptorError};

const TARGET: &str = "@elimerl/fvd-rs";

const WASM_PACK_DESCRIPTOR: &str = r#"{
  "name": "fvd-rs",
  "collaborators": [
    "elimerl"
  ],
  "version": "0.1.0",
  "files": [
    "fvd_rs_bg.wasm",
    "fvd_rs.js",
    "fvd_rs.d.ts"
  ],
  "module": "fvd_rs.js",
  "types": "fvd_rs.d.ts",
  "sideEffects": [
    "./snippets/*"
  ]
}"#;

fn keys(text: &str) -> Vec<String> {
    let value: Value = serde_json::from_str(text).unwrap();
    value.as_object().unwrap().keys().cloned().collect()
}

#[test]
fn test_module_only_scenario() {
    let patched = patch_descriptor(r#"{"module": "fvd_rs.js"}"#, TARGET).unwrap();

    assert!(patched.contains("\"type\": \"module\""));
    assert!(patched.contains("\"main\": \"fvd_rs.js\""));
    assert!(patched.contains("\"name\": \"@elimerl/fvd-rs\""));
    assert!(patched.contains("\"module\": \"fvd_rs.js\""));
}

#[test]
fn test_wasm_pack_descriptor() {
    let patched = patch_descriptor(WASM_PACK_DESCRIPTOR, TARGET).unwrap();
    let value: Value = serde_json::from_str(&patched).unwrap();

    assert_eq!(value["name"], TARGET);
    assert_eq!(value["type"], "module");
    assert_eq!(value["main"], "fvd_rs.js");
    assert_eq!(value["module"], "fvd_rs.js");
    assert_eq!(value["version"], "0.1.0");
    assert_eq!(value["sideEffects"][0], "./snippets/*");

    // `name` stays first, new keys go after everything that was there
    assert_eq!(
        keys(&patched),
        vec![
            "name",
            "collaborators",
            "version",
            "files",
            "module",
            "types",
            "sideEffects",
            "type",
            "main",
        ]
    );
}

#[test]
fn test_four_space_indent_and_trailing_newline() {
    let patched = patch_descriptor(WASM_PACK_DESCRIPTOR, TARGET).unwrap();

    assert!(patched.starts_with("{\n    \"name\": \"@elimerl/fvd-rs\",\n"));
    assert!(patched.contains("\n    \"files\": [\n        \"fvd_rs_bg.wasm\","));
    assert!(patched.ends_with("}\n"));
    assert!(!patched.ends_with("\n\n"));
}

#[test]
fn test_patching_twice_is_identical() {
    let inputs = [
        WASM_PACK_DESCRIPTOR,
        r#"{"module": "fvd_rs.js"}"#,
        r#"{"type": "commonjs", "main": "x.cjs", "module": "y.mjs", "name": "old"}"#,
        r#"{"module": "a.js", "nested": {"deep": [1, {"x": null}]}, "unicode": "héllo ☃"}"#,
    ];

    for input in inputs {
        let once = patch_descriptor(input, TARGET).unwrap();
        let twice = patch_descriptor(&once, TARGET).unwrap();
        assert_eq!(once, twice, "not idempotent for {input}");
    }
}

#[test]
fn test_main_equals_input_module() {
    let inputs = [
        (r#"{"module": "fvd_rs.js"}"#, "fvd_rs.js"),
        (r#"{"main": "index.cjs", "module": "index.mjs"}"#, "index.mjs"),
        (r#"{"module": "./dist/entry.js", "main": "./dist/entry.js"}"#, "./dist/entry.js"),
    ];

    for (input, module) in inputs {
        let patched = patch_descriptor(input, TARGET).unwrap();
        let value: Value = serde_json::from_str(&patched).unwrap();
        assert_eq!(value["main"], module);
        assert_eq!(value["module"], module);
    }
}

#[test]
fn test_parse_error_reports_position() {
    let err = patch_descriptor("{\n  \"module\": \"a.js\",\n}", TARGET).unwrap_err();
    match err {
        DescriptorError::Parse(source) => assert_eq!(source.line(), 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_is_patched_requires_all_fields() {
    let partial = r#"{"module": "a.js", "type": "module", "name": "@elimerl/fvd-rs"}"#;
    assert!(!descriptor_is_patched(partial, TARGET).unwrap());

    let complete = r#"{"module": "a.js", "type": "module", "main": "a.js", "name": "@elimerl/fvd-rs"}"#;
    assert!(descriptor_is_patched(complete, TARGET).unwrap());

    assert!(matches!(
        descriptor_is_patched("\"just a string\"", TARGET),
        Err(DescriptorError::NotAnObject)
    ));
}
