//! Padded standard base64 (RFC 4648) for token bytes.

use crate::error::{ExportError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw token bytes as padded standard base64.
#[inline]
pub fn encode_token(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a padded standard base64 string back to raw token bytes.
///
/// Unpadded or URL-safe input is rejected so every stored string has exactly
/// one spelling.
pub fn decode_token(value: &str) -> Result<Vec<u8>> {
    STANDARD.decode(value).map_err(|e| ExportError::Base64 {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_single_byte_roundtrips() {
        for b in 0u8..=255 {
            let encoded = encode_token(&[b]);
            assert_eq!(decode_token(&encoded).unwrap(), vec![b]);
        }
    }

    #[test]
    fn test_full_byte_range_with_embedded_zeros() {
        let mut bytes: Vec<u8> = (0u8..=255).collect();
        bytes.extend_from_slice(&[0, 0, 0xff, 0, 0x80]);

        let encoded = encode_token(&bytes);
        assert!(!encoded.contains('"'));
        assert!(!encoded.contains('\\'));
        assert_eq!(decode_token(&encoded).unwrap(), bytes);
    }

    #[test]
    fn test_invalid_utf8_roundtrips() {
        let bytes = [0xe4, 0xbd];
        assert_eq!(decode_token(&encode_token(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_canonical_padded_form() {
        assert_eq!(encode_token(b"a"), "YQ==");
        assert_eq!(encode_token(b"ab"), "YWI=");
        assert_eq!(encode_token(b""), "");
    }

    #[test]
    fn test_rejects_unpadded_and_garbage() {
        assert!(decode_token("YQ").is_err());
        assert!(decode_token("not base64!").is_err());
    }
}
