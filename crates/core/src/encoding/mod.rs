//! Binary-safe text encodings for raw token bytes.
//!
//! Token byte sequences are arbitrary octets (embedded NULs, partial UTF-8
//! sequences). Every stage past the source stores them as padded standard
//! base64 so no value needs escaping in JSON or C string literals.

pub mod binary_safe;

pub use binary_safe::{decode_token, encode_token};
