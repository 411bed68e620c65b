//! Encoding helpers for the JSON boundary
//!
//! Binary fields arrive as base64url (RFC 4648 §5) and leave as hex strings.

use base64::engine::{general_purpose, DecodePaddingMode, GeneralPurpose};
use base64::{alphabet, Engine as _};

/// base64url engine that emits no padding and accepts input with or without it
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    general_purpose::NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64url string into raw bytes
///
/// # Errors
///
/// Returns the underlying `base64` error when the input is not valid base64url.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT.decode(input.trim())
}

/// Encode bytes as unpadded base64url
#[must_use]
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}

/// How hex strings are rendered in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexStyle {
    /// `0x`-prefixed lowercase hex
    #[default]
    Prefixed,
    /// Bare lowercase hex
    Bare,
}

impl HexStyle {
    #[must_use]
    pub const fn from_prefix_flag(prefix: bool) -> Self {
        if prefix {
            Self::Prefixed
        } else {
            Self::Bare
        }
    }

    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Prefixed => format!("0x{}", hex::encode(bytes)),
            Self::Bare => hex::encode(bytes),
        }
    }
}
