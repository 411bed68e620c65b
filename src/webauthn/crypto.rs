//! `WebAuthn` signed message assembly
//!
//! Assertion signatures cover `authenticatorData || SHA-256(clientDataJSON)`,
//! and ES256 hashes that again before signing:
//!
//! ```text
//! client_data_hash = SHA-256(clientDataJSON)
//! signed_data      = authenticatorData || client_data_hash
//! message_hash     = SHA-256(signed_data)
//! ```
//!
//! Hashing the concatenation of the raw `clientDataJSON` in a single pass
//! yields a different (wrong) digest.

use sha2::{Digest, Sha256};

/// SHA-256 of the raw `clientDataJSON` bytes
#[must_use]
pub fn client_data_hash(client_data_json: &[u8]) -> [u8; 32] {
    Sha256::digest(client_data_json).into()
}

/// `authenticatorData || SHA-256(clientDataJSON)`
#[must_use]
pub fn signed_data(authenticator_data: &[u8], client_data_json: &[u8]) -> Vec<u8> {
    let client_data_hash = client_data_hash(client_data_json);
    let mut signed = Vec::with_capacity(authenticator_data.len() + client_data_hash.len());
    signed.extend_from_slice(authenticator_data);
    signed.extend_from_slice(&client_data_hash);
    signed
}

/// The 32-byte digest the authenticator's ECDSA signature was computed over
#[must_use]
pub fn message_hash(authenticator_data: &[u8], client_data_json: &[u8]) -> [u8; 32] {
    Sha256::digest(signed_data(authenticator_data, client_data_json)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH_DATA: [u8; 37] = [0x42; 37];
    const CLIENT_DATA: &[u8] =
        br#"{"type":"webauthn.get","challenge":"Y2hhbGxlbmdl","origin":"https://example.com"}"#;

    #[test]
    fn test_signed_data_layout() {
        let signed = signed_data(&AUTH_DATA, CLIENT_DATA);
        assert_eq!(signed.len(), 37 + 32);
        assert_eq!(&signed[..37], &AUTH_DATA);
        assert_eq!(&signed[37..], &client_data_hash(CLIENT_DATA));
    }

    #[test]
    fn test_message_hash_is_two_stage() {
        let expected: [u8; 32] = Sha256::digest(
            [AUTH_DATA.as_slice(), &Sha256::digest(CLIENT_DATA)[..]].concat(),
        )
        .into();
        assert_eq!(message_hash(&AUTH_DATA, CLIENT_DATA), expected);

        let single_pass: [u8; 32] = Sha256::digest([AUTH_DATA.as_slice(), CLIENT_DATA].concat()).into();
        assert_ne!(message_hash(&AUTH_DATA, CLIENT_DATA), single_pass);
    }

    #[test]
    fn test_message_hash_is_deterministic() {
        assert_eq!(
            message_hash(&AUTH_DATA, CLIENT_DATA),
            message_hash(&AUTH_DATA, CLIENT_DATA)
        );
    }

    #[test]
    fn test_single_byte_changes_alter_hash() {
        let baseline = message_hash(&AUTH_DATA, CLIENT_DATA);

        let mut auth_data = AUTH_DATA;
        auth_data[36] ^= 0x01;
        assert_ne!(message_hash(&auth_data, CLIENT_DATA), baseline);

        let mut client_data = CLIENT_DATA.to_vec();
        client_data[0] ^= 0x01;
        assert_ne!(message_hash(&AUTH_DATA, &client_data), baseline);
    }

    #[test]
    fn test_known_empty_input_digest() {
        // SHA-256("")
        assert_eq!(
            hex::encode(client_data_hash(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
