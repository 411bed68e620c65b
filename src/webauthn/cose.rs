//! COSE key decoding
//!
//! For P-256 (ES256), the COSE key structure is:
//! - kty (1): 2 (EC2 key type)
//! - alg (3): -7 (ES256 algorithm)
//! - crv (-1): 1 (P-256 curve)
//! - x (-2): x-coordinate (32 bytes)
//! - y (-3): y-coordinate (32 bytes)

use super::cbor;
use super::errors::{Result, WebAuthnError};
use ciborium::value::Value;
use std::fmt;

const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV: i64 = -1;
const LABEL_X: i64 = -2;
const LABEL_Y: i64 = -3;

pub const KTY_EC2: i64 = 2;
pub const CRV_P256: i64 = 1;

/// COSE algorithm identifier with symbolic names for the common ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoseAlgorithm {
    Es256,
    Rs256,
    /// Any identifier without a symbolic name, passed through untouched
    Other(i64),
}

impl CoseAlgorithm {
    #[must_use]
    pub const fn from_id(id: i64) -> Self {
        match id {
            -7 => Self::Es256,
            -257 => Self::Rs256,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Es256 => -7,
            Self::Rs256 => -257,
            Self::Other(id) => id,
        }
    }

    /// Symbolic name, or `None` for unrecognised identifiers
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Es256 => Some("ES256"),
            Self::Rs256 => Some("RS256"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for CoseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.id()),
        }
    }
}

/// EC2 public key on P-256
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseKey {
    pub kty: i64,
    pub alg: CoseAlgorithm,
    pub crv: i64,
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl CoseKey {
    /// Interpret a decoded `COSE_Key` map
    ///
    /// # Errors
    ///
    /// - `MalformedKey` if the value is not a map or a label is missing or mistyped,
    ///   or if `x`/`y` are not exactly 32 bytes
    /// - `UnsupportedKeyType` if `kty` is not EC2 or `crv` is not P-256
    pub fn from_cbor(value: &Value) -> Result<Self> {
        let Value::Map(entries) = value else {
            return Err(WebAuthnError::MalformedKey("COSE key is not a map".to_string()));
        };

        let kty = int_label(entries, LABEL_KTY, "kty")?;
        if kty != KTY_EC2 {
            return Err(WebAuthnError::UnsupportedKeyType(format!(
                "kty {kty}, only EC2 ({KTY_EC2}) is supported"
            )));
        }

        let alg = CoseAlgorithm::from_id(int_label(entries, LABEL_ALG, "alg")?);

        let crv = int_label(entries, LABEL_CRV, "crv")?;
        if crv != CRV_P256 {
            return Err(WebAuthnError::UnsupportedKeyType(format!(
                "crv {crv}, only P-256 ({CRV_P256}) is supported"
            )));
        }

        let x = coordinate(entries, LABEL_X, "x")?;
        let y = coordinate(entries, LABEL_Y, "y")?;

        Ok(Self { kty, alg, crv, x, y })
    }

    /// Decode a COSE key from raw CBOR bytes
    ///
    /// # Errors
    ///
    /// Returns `MalformedCbor` for invalid CBOR, otherwise as [`CoseKey::from_cbor`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_cbor(&cbor::decode_exact(bytes)?)
    }

    /// Uncompressed SEC1 encoding: `0x04 || x || y`
    #[must_use]
    pub fn to_sec1_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x);
        out[33..].copy_from_slice(&self.y);
        out
    }
}

fn int_label(entries: &[(Value, Value)], label: i64, name: &str) -> Result<i64> {
    match cbor::map_get_int(entries, label) {
        Some(Value::Integer(i)) => i64::try_from(*i)
            .map_err(|_| WebAuthnError::MalformedKey(format!("{name} out of range"))),
        Some(_) => Err(WebAuthnError::MalformedKey(format!("{name} is not an integer"))),
        None => Err(WebAuthnError::MalformedKey(format!("missing {name} ({label})"))),
    }
}

fn coordinate(entries: &[(Value, Value)], label: i64, name: &str) -> Result<[u8; 32]> {
    match cbor::map_get_int(entries, label) {
        Some(Value::Bytes(bytes)) => <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
            WebAuthnError::MalformedKey(format!(
                "invalid {name} coordinate length: {}",
                bytes.len()
            ))
        }),
        Some(_) => Err(WebAuthnError::MalformedKey(format!("{name} is not a byte string"))),
        None => Err(WebAuthnError::MalformedKey(format!("missing {name} coordinate"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;

    fn key_map(kty: i64, alg: i64, crv: i64, x: Vec<u8>, y: Vec<u8>) -> Value {
        Value::Map(vec![
            (Value::Integer(1.into()), Value::Integer(kty.into())),
            (Value::Integer(3.into()), Value::Integer(alg.into())),
            (Value::Integer((-1).into()), Value::Integer(crv.into())),
            (Value::Integer((-2).into()), Value::Bytes(x)),
            (Value::Integer((-3).into()), Value::Bytes(y)),
        ])
    }

    #[test]
    fn test_es256_alg_name() {
        let key = CoseKey::from_cbor(&key_map(2, -7, 1, vec![1; 32], vec![2; 32])).unwrap();
        assert_eq!(key.alg, CoseAlgorithm::Es256);
        assert_eq!(key.alg.name(), Some("ES256"));
        assert_eq!(key.x, [1; 32]);
        assert_eq!(key.y, [2; 32]);
    }

    #[test]
    fn test_unknown_alg_passes_through() {
        let key = CoseKey::from_cbor(&key_map(2, -36, 1, vec![1; 32], vec![2; 32])).unwrap();
        assert_eq!(key.alg, CoseAlgorithm::Other(-36));
        assert_eq!(key.alg.name(), None);
        assert_eq!(key.alg.to_string(), "-36");
        assert_eq!(CoseAlgorithm::from_id(-257).to_string(), "RS256");
    }

    #[test]
    fn test_rejects_non_ec2() {
        // RSA key type
        let err = CoseKey::from_cbor(&key_map(3, -257, 1, vec![1; 32], vec![2; 32])).unwrap_err();
        assert!(matches!(err, WebAuthnError::UnsupportedKeyType(_)));
    }

    #[test]
    fn test_rejects_other_curves() {
        // P-384
        let err = CoseKey::from_cbor(&key_map(2, -35, 2, vec![1; 48], vec![2; 48])).unwrap_err();
        assert!(matches!(err, WebAuthnError::UnsupportedKeyType(_)));
    }

    #[test]
    fn test_rejects_bad_coordinate_length() {
        let err = CoseKey::from_cbor(&key_map(2, -7, 1, vec![1; 31], vec![2; 32])).unwrap_err();
        assert_eq!(
            err,
            WebAuthnError::MalformedKey("invalid x coordinate length: 31".to_string())
        );
        let err = CoseKey::from_cbor(&key_map(2, -7, 1, vec![1; 32], vec![2; 33])).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedKey(_)));
    }

    #[test]
    fn test_rejects_missing_labels() {
        let value = Value::Map(vec![(Value::Integer(1.into()), Value::Integer(2.into()))]);
        assert!(matches!(
            CoseKey::from_cbor(&value).unwrap_err(),
            WebAuthnError::MalformedKey(_)
        ));
        assert!(CoseKey::from_cbor(&Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_from_bytes_matches_signing_key() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let point = signing_key.verifying_key().to_encoded_point(false);
        let x = point.x().unwrap().to_vec();
        let y = point.y().unwrap().to_vec();

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&key_map(2, -7, 1, x, y), &mut bytes).unwrap();

        let key = CoseKey::from_bytes(&bytes).unwrap();
        assert_eq!(key.to_sec1_uncompressed()[..], point.as_bytes()[..]);
    }

    #[test]
    fn test_from_bytes_rejects_trailing_bytes() {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&key_map(2, -7, 1, vec![1; 32], vec![2; 32]), &mut bytes)
            .unwrap();
        bytes.push(0x00);
        assert!(matches!(
            CoseKey::from_bytes(&bytes).unwrap_err(),
            WebAuthnError::MalformedCbor { .. }
        ));
    }
}
