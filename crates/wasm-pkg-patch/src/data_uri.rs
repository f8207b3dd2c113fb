//! Data URIs for embedded wasm images
//!
//! The payload uses the URL-safe base64 alphabet without padding or line
//! wrapping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

/// Prefix of every data URI produced by [`wasm_data_uri`]
pub const WASM_DATA_URI_PREFIX: &str = "data:application/wasm;base64,";

/// Errors that can occur while decoding a data URI
#[derive(Debug, Error)]
pub enum DataUriError {
    /// Not a wasm data URI
    #[error("Expected a URI starting with \"data:application/wasm;base64,\"")]
    WrongPrefix,

    /// Payload is not valid base64url
    #[error("Invalid base64url payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Encode a wasm image as `data:application/wasm;base64,<base64url>`
pub fn wasm_data_uri(image: &[u8]) -> String {
    let mut uri = String::with_capacity(WASM_DATA_URI_PREFIX.len() + image.len() * 4 / 3 + 4);
    uri.push_str(WASM_DATA_URI_PREFIX);
    URL_SAFE_NO_PAD.encode_string(image, &mut uri);
    uri
}

/// Decode a URI produced by [`wasm_data_uri`] back into the image bytes
pub fn decode_wasm_data_uri(uri: &str) -> Result<Vec<u8>, DataUriError> {
    let payload = uri
        .strip_prefix(WASM_DATA_URI_PREFIX)
        .ok_or(DataUriError::WrongPrefix)?;
    Ok(URL_SAFE_NO_PAD.decode(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasm_magic() {
        let uri = wasm_data_uri(&[0x00, 0x61, 0x73, 0x6d]);
        assert_eq!(uri, "data:application/wasm;base64,AGFzbQ");
    }

    #[test]
    fn test_empty_image() {
        assert_eq!(wasm_data_uri(&[]), WASM_DATA_URI_PREFIX);
        assert_eq!(decode_wasm_data_uri(WASM_DATA_URI_PREFIX).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_url_safe_alphabet() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet
        let uri = wasm_data_uri(&[0xfb, 0xff]);
        assert_eq!(uri, "data:application/wasm;base64,-_8");
        let payload = &uri[WASM_DATA_URI_PREFIX.len()..];
        assert!(!payload.contains('+'));
        assert!(!payload.contains('/'));
        assert!(!payload.ends_with('='));
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let image: Vec<u8> = (0..=255u8).cycle().take(1027).collect();
        let uri = wasm_data_uri(&image);
        assert!(!uri.contains('\n'));
        assert_eq!(decode_wasm_data_uri(&uri).unwrap(), image);
    }

    #[test]
    fn test_decode_wrong_prefix() {
        let result = decode_wasm_data_uri("data:text/plain;base64,AGFzbQ");
        assert!(matches!(result, Err(DataUriError::WrongPrefix)));
    }

    #[test]
    fn test_decode_rejects_padding() {
        let result = decode_wasm_data_uri("data:application/wasm;base64,AGFzbQ==");
        assert!(matches!(result, Err(DataUriError::Payload(_))));
    }
}
