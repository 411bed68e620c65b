//! DER-encoded ECDSA signature parsing
//!
//! WebAuthn signatures are ASN.1 DER `SEQUENCE { INTEGER r, INTEGER s }`.
//! Parsing is delegated to `p256`, which enforces canonical DER and the
//! `[1, n-1]` scalar range, and the scalars are kept as fixed 32-byte
//! big-endian arrays for display and key recovery.

use super::errors::{Result, WebAuthnError};
use p256::ecdsa::Signature;

const SCALAR_LEN: usize = 32;

/// ECDSA signature as two fixed-width big-endian scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: [u8; SCALAR_LEN],
    pub s: [u8; SCALAR_LEN],
}

impl EcdsaSignature {
    /// Raw `r || s` encoding (64 bytes)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..SCALAR_LEN].copy_from_slice(&self.r);
        out[SCALAR_LEN..].copy_from_slice(&self.s);
        out
    }

    /// Re-encode as minimal DER
    ///
    /// # Errors
    ///
    /// Returns `MalformedSignature` if `r` or `s` is zero or not below the curve order.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_p256()?.to_der().as_bytes().to_vec())
    }

    /// Convert into a p256 signature
    ///
    /// # Errors
    ///
    /// Returns `MalformedSignature` if `r` or `s` is zero or not below the curve order.
    pub fn to_p256(&self) -> Result<Signature> {
        Signature::from_scalars(self.r, self.s).map_err(|_| {
            WebAuthnError::MalformedSignature("r and s must be in the range [1, n-1]".to_string())
        })
    }
}

impl From<Signature> for EcdsaSignature {
    fn from(signature: Signature) -> Self {
        let (r, s) = signature.split_bytes();
        Self {
            r: r.into(),
            s: s.into(),
        }
    }
}

/// Parse a DER-encoded ECDSA signature
///
/// # Errors
///
/// Returns `MalformedSignature` on invalid ASN.1 structure, non-minimal
/// encodings, negative integers, trailing bytes, values wider than 32 bytes
/// or values outside `[1, n-1]`.
pub fn parse_der_signature(der: &[u8]) -> Result<EcdsaSignature> {
    let signature = Signature::from_der(der).map_err(|_| {
        WebAuthnError::MalformedSignature(format!(
            "{} bytes are not a canonical DER ECDSA P-256 signature",
            der.len()
        ))
    })?;
    Ok(signature.into())
}
