//! P-256 public key recovery from an ECDSA signature
//!
//! An ECDSA signature does not carry the signer's key. Given `(r, s)` and the
//! message hash `z`, every point `R` on the curve whose x-coordinate reduces
//! to `r` yields a key `Q = r⁻¹ (s·R − z·G)` for which the signature verifies.
//! The recovery id names which `R` was used:
//!
//! | id | x(R)    | y(R) |
//! |----|---------|------|
//! | 0  | `r`     | even |
//! | 1  | `r`     | odd  |
//! | 2  | `r + n` | even |
//! | 3  | `r + n` | odd  |
//!
//! On P-256 `n` is just below `p`, so `x = r` nearly always names a curve
//! point. Only when it does not are ids 2 and 3 tried. Either way exactly two
//! candidates come back; picking the right one needs an out-of-band key.

use super::cose::CoseKey;
use super::der::EcdsaSignature;
use super::errors::{Result, WebAuthnError};
use p256::elliptic_curve::bigint::U256;
use p256::elliptic_curve::group::Group;
use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::point::DecompressPoint;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::subtle::Choice;
use p256::elliptic_curve::{Field, PrimeField};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};

/// Order of the P-256 base point, big-endian
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xBC, 0xE6, 0xFA, 0xAD, 0xA7, 0x17, 0x9E, 0x84, 0xF3, 0xB9, 0xCA, 0xC2, 0xFC, 0x63, 0x25, 0x51,
];

/// One key consistent with a signature and message hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredPublicKeyCandidate {
    pub recovery_id: u8,
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl RecoveredPublicKeyCandidate {
    /// Parity of the `R` point this candidate was recovered from
    #[must_use]
    pub const fn r_point_y_is_odd(&self) -> bool {
        self.recovery_id & 1 == 1
    }

    /// Whether x(R) was `r + n` rather than `r`
    #[must_use]
    pub const fn is_x_reduced(&self) -> bool {
        self.recovery_id & 2 == 2
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

    /// Whether this candidate is the given credential key
    #[must_use]
    pub fn matches(&self, key: &CoseKey) -> bool {
        self.x == key.x && self.y == key.y
    }
}

/// Which recovery ids a signature's `r` value admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryBranch {
    /// x(R) = r, recovery ids 0 and 1
    Direct,
    /// x(R) = r + n, recovery ids 2 and 3
    Overflow,
}

impl RecoveryBranch {
    #[must_use]
    pub const fn recovery_ids(self) -> [u8; 2] {
        match self {
            Self::Direct => [0, 1],
            Self::Overflow => [2, 3],
        }
    }
}

/// Choose the branch: `Direct` when a curve point with x = r exists
#[must_use]
pub fn select_branch(r: &[u8; 32]) -> RecoveryBranch {
    let x = FieldBytes::from(*r);
    let exists: bool = AffinePoint::decompress(&x, Choice::from(0)).is_some().into();
    if exists {
        RecoveryBranch::Direct
    } else {
        RecoveryBranch::Overflow
    }
}

/// Recover the two public key candidates for a signature over `message_hash`
///
/// # Errors
///
/// - `MalformedSignature` if `r` or `s` is not a valid non-zero scalar
/// - `InvalidPoint` if no curve point exists for a recovery id, or a
///   recovered key is the identity or fails the curve equation
pub fn recover_public_keys(
    signature: &EcdsaSignature,
    message_hash: &[u8; 32],
) -> Result<[RecoveredPublicKeyCandidate; 2]> {
    let branch = select_branch(&signature.r);
    log::debug!("Recovering public keys using {branch:?} branch");

    let [first, second] = branch.recovery_ids();
    Ok([
        recover_with_id(signature, message_hash, first)?,
        recover_with_id(signature, message_hash, second)?,
    ])
}

/// Recover the key for one recovery id
///
/// # Errors
///
/// As [`recover_public_keys`]; also `InvalidPoint` for ids above 3.
pub fn recover_with_id(
    signature: &EcdsaSignature,
    message_hash: &[u8; 32],
    recovery_id: u8,
) -> Result<RecoveredPublicKeyCandidate> {
    let invalid = |reason: &str| WebAuthnError::InvalidPoint {
        recovery_id,
        reason: reason.to_string(),
    };
    if recovery_id > 3 {
        return Err(invalid("recovery id must be 0..=3"));
    }

    let r = scalar(&signature.r, "r")?;
    let s = scalar(&signature.s, "s")?;
    let z = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*message_hash));

    let x_bytes = if recovery_id & 2 == 0 {
        signature.r
    } else {
        add_curve_order(&signature.r).ok_or_else(|| invalid("r + n exceeds 256 bits"))?
    };
    let y_is_odd = Choice::from(recovery_id & 1);
    let big_r = Option::<AffinePoint>::from(AffinePoint::decompress(
        &FieldBytes::from(x_bytes),
        y_is_odd,
    ))
    .ok_or_else(|| invalid("no curve point has this x-coordinate"))?;

    let r_inv = Option::<Scalar>::from(r.invert()).ok_or_else(|| invalid("r is not invertible"))?;
    let u1 = -(z * r_inv);
    let u2 = s * r_inv;
    let q = ProjectivePoint::GENERATOR * u1 + ProjectivePoint::from(big_r) * u2;

    if bool::from(q.is_identity()) {
        return Err(invalid("recovered key is the point at infinity"));
    }

    let encoded = q.to_affine().to_encoded_point(false);
    let (Some(x), Some(y)) = (encoded.x(), encoded.y()) else {
        return Err(invalid("recovered key has no affine coordinates"));
    };

    let candidate = RecoveredPublicKeyCandidate {
        recovery_id,
        x: (*x).into(),
        y: (*y).into(),
    };
    ensure_on_curve(&candidate)?;
    Ok(candidate)
}

/// Check `y² = x³ − 3x + b (mod p)` for a candidate
///
/// # Errors
///
/// Returns `InvalidPoint` if the coordinates are not a point on P-256.
pub fn ensure_on_curve(candidate: &RecoveredPublicKeyCandidate) -> Result<()> {
    let point = EncodedPoint::from_affine_coordinates(
        &FieldBytes::from(candidate.x),
        &FieldBytes::from(candidate.y),
        false,
    );
    let on_curve: bool = AffinePoint::from_encoded_point(&point).is_some().into();
    if on_curve {
        Ok(())
    } else {
        Err(WebAuthnError::InvalidPoint {
            recovery_id: candidate.recovery_id,
            reason: "coordinates do not satisfy the curve equation".to_string(),
        })
    }
}

fn scalar(bytes: &[u8; 32], name: &str) -> Result<Scalar> {
    let value = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
        .filter(|v| !bool::from(v.is_zero()));
    value.ok_or_else(|| WebAuthnError::MalformedSignature(format!("{name} is not in [1, n-1]")))
}

/// `r + n` as 32 big-endian bytes, or `None` if the sum overflows 256 bits
fn add_curve_order(r: &[u8; 32]) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for i in (0..32).rev() {
        let sum = u16::from(r[i]) + u16::from(CURVE_ORDER[i]) + carry;
        out[i] = sum.to_le_bytes()[0];
        carry = sum >> 8;
    }
    (carry == 0).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webauthn::crypto;
    use p256::ecdsa::signature::hazmat::PrehashVerifier;
    use p256::ecdsa::signature::Signer;
    use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
    use sha2::{Digest, Sha256};

    fn small(value: u8) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[31] = value;
        out
    }

    fn verifying_key(candidate: &RecoveredPublicKeyCandidate) -> VerifyingKey {
        let point = EncodedPoint::from_bytes(candidate.to_sec1_uncompressed()).unwrap();
        VerifyingKey::from_encoded_point(&point).unwrap()
    }

    fn sign(signing_key: &SigningKey, signed: &[u8]) -> EcdsaSignature {
        let signature: Signature = signing_key.sign(signed);
        signature.into()
    }

    #[test]
    fn test_curve_order_constant() {
        let n = FieldBytes::from(CURVE_ORDER);
        assert!(bool::from(Scalar::from_repr(n).is_none()));
        let mut n_minus_one = CURVE_ORDER;
        n_minus_one[31] -= 1;
        assert!(bool::from(
            Scalar::from_repr(FieldBytes::from(n_minus_one)).is_some()
        ));
    }

    #[test]
    fn test_recovers_known_key() {
        let signing_key = SigningKey::from_bytes(&[0x2A; 32].into()).unwrap();
        let auth_data = [0x11u8; 37];
        let client_data = br#"{"type":"webauthn.get","challenge":"AAAA","origin":"https://a.example"}"#;
        let signed = crypto::signed_data(&auth_data, client_data);
        let hash = crypto::message_hash(&auth_data, client_data);

        let signature = sign(&signing_key, &signed);
        let candidates = recover_public_keys(&signature, &hash).unwrap();

        let expected = signing_key.verifying_key().to_encoded_point(false);
        let matching: Vec<_> = candidates
            .iter()
            .filter(|c| c.to_sec1_uncompressed().as_slice() == expected.as_bytes())
            .collect();
        assert_eq!(matching.len(), 1);

        assert_eq!(candidates[0].recovery_id, 0);
        assert_eq!(candidates[1].recovery_id, 1);
        assert_ne!(
            candidates[0].r_point_y_is_odd(),
            candidates[1].r_point_y_is_odd()
        );
        assert_ne!(candidates[0], candidates[1]);
    }

    #[test]
    fn test_candidate_matches_registered_key() {
        let signing_key = SigningKey::from_bytes(&[0x33; 32].into()).unwrap();
        let point = signing_key.verifying_key().to_encoded_point(false);
        let registered = CoseKey {
            kty: crate::webauthn::cose::KTY_EC2,
            alg: crate::webauthn::cose::CoseAlgorithm::Es256,
            crv: crate::webauthn::cose::CRV_P256,
            x: (*point.x().unwrap()).into(),
            y: (*point.y().unwrap()).into(),
        };

        let signed = b"registered key lookup";
        let hash: [u8; 32] = Sha256::digest(signed).into();
        let candidates = recover_public_keys(&sign(&signing_key, signed), &hash).unwrap();

        assert_eq!(candidates.iter().filter(|c| c.matches(&registered)).count(), 1);
    }

    #[test]
    fn test_every_candidate_verifies() {
        let signing_key = SigningKey::from_bytes(&[0x05; 32].into()).unwrap();
        let signed = b"arbitrary signed bytes";
        let hash: [u8; 32] = Sha256::digest(signed).into();
        let signature = sign(&signing_key, signed);
        let p256_signature = signature.to_p256().unwrap();

        for candidate in recover_public_keys(&signature, &hash).unwrap() {
            verifying_key(&candidate)
                .verify_prehash(&hash, &p256_signature)
                .unwrap();
        }
    }

    #[test]
    fn test_branch_selection() {
        // x = 5 lies on the curve, x = 3 does not but 3 + n does
        assert_eq!(select_branch(&small(5)), RecoveryBranch::Direct);
        assert_eq!(select_branch(&small(3)), RecoveryBranch::Overflow);
    }

    #[test]
    fn test_overflow_branch_recovers_ids_two_and_three() {
        let signature = EcdsaSignature {
            r: small(3),
            s: small(7),
        };
        let hash = [0x5Au8; 32];
        let candidates = recover_public_keys(&signature, &hash).unwrap();

        assert_eq!(candidates[0].recovery_id, 2);
        assert_eq!(candidates[1].recovery_id, 3);
        assert!(candidates.iter().all(RecoveredPublicKeyCandidate::is_x_reduced));

        let p256_signature = signature.to_p256().unwrap();
        for candidate in &candidates {
            verifying_key(candidate)
                .verify_prehash(&hash, &p256_signature)
                .unwrap();
        }
    }

    #[test]
    fn test_no_point_on_either_branch() {
        // neither x = 1 nor x = 1 + n is on the curve
        let signature = EcdsaSignature {
            r: small(1),
            s: small(7),
        };
        let err = recover_public_keys(&signature, &[0u8; 32]).unwrap_err();
        assert!(matches!(err, WebAuthnError::InvalidPoint { recovery_id: 2, .. }));
    }

    #[test]
    fn test_direct_id_fails_when_x_not_on_curve() {
        let signature = EcdsaSignature {
            r: small(3),
            s: small(7),
        };
        let err = recover_with_id(&signature, &[0u8; 32], 0).unwrap_err();
        assert!(matches!(err, WebAuthnError::InvalidPoint { recovery_id: 0, .. }));
        assert!(recover_with_id(&signature, &[0u8; 32], 4).is_err());
    }

    #[test]
    fn test_overflowing_r_plus_n() {
        let mut r = [0xFFu8; 32];
        r[0] = 0x7F;
        assert!(add_curve_order(&r).is_none());
        assert_eq!(add_curve_order(&[0u8; 32]), Some(CURVE_ORDER));
    }

    #[test]
    fn test_zero_scalars_rejected() {
        let signature = EcdsaSignature {
            r: small(5),
            s: [0u8; 32],
        };
        let err = recover_public_keys(&signature, &[1u8; 32]).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedSignature(_)));
    }

    #[test]
    fn test_ensure_on_curve_rejects_garbage() {
        let candidate = RecoveredPublicKeyCandidate {
            recovery_id: 1,
            x: [1u8; 32],
            y: [2u8; 32],
        };
        assert!(matches!(
            ensure_on_curve(&candidate).unwrap_err(),
            WebAuthnError::InvalidPoint { recovery_id: 1, .. }
        ));
    }
}
