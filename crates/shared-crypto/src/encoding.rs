//! # Hex Text Encodings
//!
//! Two textual forms are used across the consensus core:
//!
//! - `0x` + lowercase hex: hashes and signatures.
//! - `0X` + uppercase hex: participant and validator identities. Identity
//!   lookups are case-insensitive, so the uppercase form is canonical.

use crate::CryptoError;

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Encode bytes as `0X`-prefixed uppercase hex.
pub fn encode_hex_upper(bytes: &[u8]) -> String {
    format!("0X{}", hex::encode_upper(bytes))
}

/// Decode `0x`/`0X`-prefixed hex (either case).
///
/// The prefix is mandatory; an odd number of digits or a non-hex digit is
/// an error, never a panic.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, CryptoError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| CryptoError::InvalidHex(format!("missing 0x prefix: {text:.16}")))?;

    hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))
}

/// Normalize an identity string for case-insensitive comparison.
pub fn normalize_identity(text: &str) -> String {
    text.to_ascii_uppercase()
}
