//! Authenticator data parsing
//!
//! Layout:
//! - 32 bytes: RP ID hash
//! - 1 byte: flags
//! - 4 bytes: signature counter (big-endian)
//! - attested credential data (if AT flag is set):
//!   - 16 bytes: AAGUID
//!   - 2 bytes: credential ID length (L, big-endian)
//!   - L bytes: credential ID
//!   - variable: COSE public key (one CBOR item)
//! - extensions (if ED flag is set): one CBOR item
//!
//! Bytes left after that are kept as `trailing` rather than rejected.

use super::cbor;
use super::cose::CoseKey;
use super::errors::{Result, WebAuthnError};
use super::reader::ByteReader;
use ciborium::value::Value;

/// rpIdHash (32) + flags (1) + signCount (4)
pub const MIN_AUTH_DATA_LEN: usize = 37;

/// Bit view over the authenticator data flags byte
///
/// Bits 1 and 5 are reserved and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatorFlags(u8);

impl AuthenticatorFlags {
    pub const USER_PRESENT: u8 = 0x01;
    pub const USER_VERIFIED: u8 = 0x04;
    pub const BACKUP_ELIGIBLE: u8 = 0x08;
    pub const BACKUP_STATE: u8 = 0x10;
    pub const ATTESTED_CREDENTIAL_DATA: u8 = 0x40;
    pub const EXTENSION_DATA: u8 = 0x80;

    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// The raw flags byte, reserved bits included
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    const fn has(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    #[must_use]
    pub const fn user_present(self) -> bool {
        self.has(Self::USER_PRESENT)
    }

    #[must_use]
    pub const fn user_verified(self) -> bool {
        self.has(Self::USER_VERIFIED)
    }

    #[must_use]
    pub const fn backup_eligible(self) -> bool {
        self.has(Self::BACKUP_ELIGIBLE)
    }

    #[must_use]
    pub const fn backup_state(self) -> bool {
        self.has(Self::BACKUP_STATE)
    }

    #[must_use]
    pub const fn attested_credential_data(self) -> bool {
        self.has(Self::ATTESTED_CREDENTIAL_DATA)
    }

    #[must_use]
    pub const fn extension_data(self) -> bool {
        self.has(Self::EXTENSION_DATA)
    }
}

/// Credential data attached during registration
#[derive(Debug, Clone, PartialEq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    pub credential_public_key: CoseKey,
    /// The COSE key exactly as it appeared in the authenticator data
    pub credential_public_key_bytes: Vec<u8>,
}

/// Parsed authenticator data
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: AuthenticatorFlags,
    pub sign_count: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
    pub extensions: Option<Value>,
    /// Unparsed bytes after the last recognised field
    pub trailing: Vec<u8>,
}

impl AuthenticatorData {
    /// Re-serialize the fixed prefix: `rpIdHash || flags || signCount`
    #[must_use]
    pub fn prefix_bytes(&self) -> [u8; MIN_AUTH_DATA_LEN] {
        let mut out = [0u8; MIN_AUTH_DATA_LEN];
        out[..32].copy_from_slice(&self.rp_id_hash);
        out[32] = self.flags.bits();
        out[33..].copy_from_slice(&self.sign_count.to_be_bytes());
        out
    }
}

/// Parse raw authenticator data
///
/// # Errors
///
/// - `TruncatedData` if a fixed-size field runs past the end of the buffer
/// - `MalformedCbor` if the embedded COSE key or extensions are not valid CBOR
/// - COSE key errors (`UnsupportedKeyType`, `MalformedKey`) from the credential key
pub fn parse_authenticator_data(bytes: &[u8]) -> Result<AuthenticatorData> {
    let mut reader = ByteReader::new(bytes);

    let rp_id_hash = reader.read_array::<32>("rpIdHash")?;
    let flags = AuthenticatorFlags::from_byte(reader.read_u8("flags")?);
    let sign_count = reader.read_u32_be("signCount")?;

    let attested_credential_data = if flags.attested_credential_data() {
        Some(parse_attested_credential_data(&mut reader)?)
    } else {
        None
    };

    let extensions = if flags.extension_data() {
        Some(read_cbor_item(&mut reader)?.0)
    } else {
        None
    };

    let trailing = reader.rest().to_vec();
    if !trailing.is_empty() {
        log::debug!("Authenticator data has {} trailing bytes", trailing.len());
    }

    Ok(AuthenticatorData {
        rp_id_hash,
        flags,
        sign_count,
        attested_credential_data,
        extensions,
        trailing,
    })
}

fn parse_attested_credential_data(reader: &mut ByteReader<'_>) -> Result<AttestedCredentialData> {
    let aaguid = reader.read_array::<16>("aaguid")?;
    let credential_id_len = reader.read_u16_be("credentialIdLength")?;
    let credential_id = reader
        .read_bytes(usize::from(credential_id_len), "credentialId")?
        .to_vec();

    let (key_value, key_bytes) = read_cbor_item(reader)?;
    let credential_public_key = CoseKey::from_cbor(&key_value)?;

    Ok(AttestedCredentialData {
        aaguid,
        credential_id,
        credential_public_key,
        credential_public_key_bytes: key_bytes.to_vec(),
    })
}

/// Decode one CBOR item at the cursor and advance past it
///
/// Offsets in CBOR errors are rebased onto the authenticator data buffer.
fn read_cbor_item<'a>(reader: &mut ByteReader<'a>) -> Result<(Value, &'a [u8])> {
    let start = reader.position();
    let rest = reader.rest();
    let (value, consumed) = cbor::decode_item(rest).map_err(|err| match err {
        WebAuthnError::MalformedCbor { offset, reason } => WebAuthnError::MalformedCbor {
            offset: start + offset,
            reason,
        },
        other => other,
    })?;
    reader.advance(consumed, "cbor item")?;
    Ok((value, &rest[..consumed]))
}
