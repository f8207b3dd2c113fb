//! Package descriptor rewriting (package.json)
//!
//! The descriptor emitted by wasm-pack is republished as an ES module under a
//! different identifier:
//! - `type` becomes `"module"`
//! - `main` is aliased to the value of `module`
//! - `name` becomes the target identifier
//!
//! Every other field is carried through untouched and in its original order.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use thiserror::Error;

/// Indentation used when writing the descriptor back
const INDENT: &[u8] = b"    ";

/// Errors that can occur while patching a descriptor
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Descriptor text is not valid JSON
    #[error("Failed to parse descriptor: {0}")]
    Parse(#[source] serde_json::Error),

    /// Top-level JSON value is not an object
    #[error("Descriptor must be a JSON object")]
    NotAnObject,

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Failed to serialize the patched descriptor
    #[error("Failed to serialize descriptor: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Rewrite descriptor text, returning the new text
///
/// `main` is set from `module` as it was read, before any field in this pass
/// is assigned. Output uses 4-space indentation and ends with a newline, so
/// patching already-patched text reproduces it byte for byte.
pub fn patch_descriptor(text: &str, target_name: &str) -> Result<String, DescriptorError> {
    let mut root = parse_value(text)?;
    let fields = object_mut(&mut root)?;

    let module = fields
        .get("module")
        .cloned()
        .ok_or_else(|| DescriptorError::MissingField("module".to_string()))?;

    fields.insert("type".to_string(), Value::String("module".to_string()));
    fields.insert("main".to_string(), module);
    fields.insert("name".to_string(), Value::String(target_name.to_string()));

    to_pretty_string(&root)
}

/// Whether the descriptor already satisfies the patched invariants
pub fn descriptor_is_patched(text: &str, target_name: &str) -> Result<bool, DescriptorError> {
    let root = parse_value(text)?;
    let fields = root.as_object().ok_or(DescriptorError::NotAnObject)?;

    let module = match fields.get("module") {
        Some(module) => module,
        None => return Ok(false),
    };

    Ok(fields.get("type").and_then(Value::as_str) == Some("module")
        && fields.get("main") == Some(module)
        && fields.get("name").and_then(Value::as_str) == Some(target_name))
}

fn parse_value(text: &str) -> Result<Value, DescriptorError> {
    serde_json::from_str(text).map_err(DescriptorError::Parse)
}

fn object_mut(root: &mut Value) -> Result<&mut Map<String, Value>, DescriptorError> {
    root.as_object_mut().ok_or(DescriptorError::NotAnObject)
}

fn to_pretty_string(root: &Value) -> Result<String, DescriptorError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    root.serialize(&mut serializer).map_err(DescriptorError::Serialize)?;
    out.push(b'\n');

    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
