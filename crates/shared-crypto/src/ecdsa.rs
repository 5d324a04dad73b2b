//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures over Keccak-256 digests.
//!
//! ## Signature Format
//!
//! A signature is 65 bytes: `r (32) || s (32) || v (1)` where `v` is the
//! recovery ID (0 or 1). Its textual form is `0x` + lowercase hex.
//! Verification checks `r || s` against the claimed public key and discards
//! the trailing recovery byte; the byte must still be present and in range.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)
//! - Malformed input returns an error, never panics

use crate::encoding::{decode_hex, encode_hex, encode_hex_upper};
use crate::hashing::Hash;
use crate::CryptoError;
use k256::ecdsa::{signature::hazmat::PrehashVerifier, Signature, SigningKey, VerifyingKey};

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of a SEC1 compressed public key.
pub const COMPRESSED_PUBKEY_LENGTH: usize = 33;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Secp256k1PublicKey([u8; COMPRESSED_PUBKEY_LENGTH]);

impl Secp256k1PublicKey {
    /// Parse a SEC1 public key, compressed (33 bytes) or uncompressed (65 bytes).
    ///
    /// The key is always stored compressed.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&verifying_key))
    }

    /// Parse a `0x`/`0X` hex-encoded SEC1 public key.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        Self::from_sec1(&decode_hex(text)?)
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; COMPRESSED_PUBKEY_LENGTH];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBKEY_LENGTH] {
        &self.0
    }

    /// Uncompressed SEC1 encoding (65 bytes, `0x04` prefix).
    pub fn to_uncompressed(&self) -> Result<Vec<u8>, CryptoError> {
        let key = self.verifying_key()?;
        Ok(key.to_encoded_point(false).as_bytes().to_vec())
    }

    /// Canonical identity string: `0X` + uppercase hex of the compressed key.
    pub fn to_identity(&self) -> String {
        encode_hex_upper(&self.0)
    }

    fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Verify a recoverable signature over a 32-byte digest.
    ///
    /// The recovery byte is discarded; only `r || s` is checked.
    pub fn verify_prehash(&self, digest: &Hash, signature: &RecoverableSignature) -> bool {
        let Ok(key) = self.verifying_key() else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature.rs_bytes()) else {
            return false;
        };
        key.verify_prehash(digest, &sig).is_ok()
    }
}

/// Recoverable ECDSA signature (65 bytes, `r || s || v`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Create from raw bytes, checking the recovery byte.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureFormat {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            });
        }
        let v = bytes[SIGNATURE_LENGTH - 1];
        if v > 1 {
            return Err(CryptoError::InvalidRecoveryId(v));
        }
        let mut raw = [0u8; SIGNATURE_LENGTH];
        raw.copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// Parse the `0x`-prefixed textual form.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        Self::from_slice(&decode_hex(text)?)
    }

    /// Textual form: `0x` + lowercase hex of all 65 bytes.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    /// All 65 bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// `r || s` without the recovery byte.
    pub fn rs_bytes(&self) -> &[u8] {
        &self.0[..SIGNATURE_LENGTH - 1]
    }

    /// Trailing recovery ID.
    pub fn recovery_id(&self) -> u8 {
        self.0[SIGNATURE_LENGTH - 1]
    }
}

/// secp256k1 ECDSA keypair.
///
/// The inner `SigningKey` zeroizes its scalar on drop.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest (deterministic RFC 6979, low-S).
    pub fn sign_prehash(&self, digest: &Hash) -> Result<RecoverableSignature, CryptoError> {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut raw = [0u8; SIGNATURE_LENGTH];
        raw[..SIGNATURE_LENGTH - 1].copy_from_slice(&sig.to_bytes());
        raw[SIGNATURE_LENGTH - 1] = recid.to_byte();
        Ok(RecoverableSignature(raw))
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key().to_identity())
            .finish_non_exhaustive()
    }
}

/// Verify a textual signature over `digest` against a SEC1 public key.
///
/// Returns `Ok(false)` when the signature is well-formed but does not match;
/// returns an error when the key, hex text, length or recovery byte is
/// malformed.
pub fn verify_signature(
    public_key: &[u8],
    digest: &Hash,
    signature_hex: &str,
) -> Result<bool, CryptoError> {
    let key = Secp256k1PublicKey::from_sec1(public_key)?;
    let signature = RecoverableSignature::from_hex(signature_hex)?;
    Ok(key.verify_prehash(digest, &signature))
}

/// Identity string (`0X` + uppercase compressed hex) of a SEC1 public key.
pub fn public_key_identity(public_key: &[u8]) -> Result<String, CryptoError> {
    Ok(Secp256k1PublicKey::from_sec1(public_key)?.to_identity())
}
