//! `WebAuthn` decoding error types
//!
//! Every failure here is deterministic and input-driven. Errors carry enough
//! context (field name, byte offset) to render a precise diagnostic.

use thiserror::Error;

/// Errors that can occur while decoding a ceremony response or recovering keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebAuthnError {
    /// A structurally required field runs past the end of the buffer
    #[error("truncated data: {field} needs {needed} bytes at offset {offset}, {remaining} remaining")]
    TruncatedData {
        field: &'static str,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// CBOR structure does not match the expected shape
    #[error("malformed CBOR at offset {offset}: {reason}")]
    MalformedCbor { offset: usize, reason: String },

    /// DER signature violates ASN.1 rules or r/s exceed 32 bytes
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// COSE key type is not EC2 or curve is not P-256
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// EC2 key coordinates are missing or not exactly 32 bytes
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// A recovery candidate does not satisfy the curve equation
    #[error("invalid point for recovery id {recovery_id}: {reason}")]
    InvalidPoint { recovery_id: u8, reason: String },

    /// Base64url or JSON envelope could not be decoded
    #[error("encoding error in {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    /// `clientDataJSON` is not the expected JSON object
    #[error("malformed client data: {0}")]
    MalformedClientData(String),
}

impl WebAuthnError {
    pub(crate) fn cbor(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCbor {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn encoding(field: &'static str, reason: impl ToString) -> Self {
        Self::Encoding {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the decoder
pub type Result<T> = std::result::Result<T, WebAuthnError>;
