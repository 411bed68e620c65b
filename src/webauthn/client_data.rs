//! `clientDataJSON` decoding
//!
//! The browser serialises the collected client data as UTF-8 JSON. The
//! challenge inside is itself base64url, so it is decoded a second time for
//! display.

use super::errors::{Result, WebAuthnError};
use crate::utils::encoding::decode_base64url;
use serde::{Deserialize, Serialize};

pub const TYPE_CREATE: &str = "webauthn.create";
pub const TYPE_GET: &str = "webauthn.get";

/// Collected client data as produced by the browser
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    #[serde(rename = "type")]
    pub ceremony_type: String, // "webauthn.create" or "webauthn.get"
    pub challenge: String, // Base64URL-encoded challenge
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_origin: Option<String>,
}

impl ClientData {
    /// Decode the base64url challenge into raw bytes
    ///
    /// # Errors
    ///
    /// Returns `MalformedClientData` if the challenge is not valid base64url.
    pub fn challenge_bytes(&self) -> Result<Vec<u8>> {
        decode_base64url(&self.challenge)
            .map_err(|e| WebAuthnError::MalformedClientData(format!("challenge: {e}")))
    }

    #[must_use]
    pub fn is_registration(&self) -> bool {
        self.ceremony_type == TYPE_CREATE
    }

    #[must_use]
    pub fn is_authentication(&self) -> bool {
        self.ceremony_type == TYPE_GET
    }
}

/// Parse the raw `clientDataJSON` bytes
///
/// Unknown members are ignored; the type value is reported as-is.
///
/// # Errors
///
/// Returns `MalformedClientData` if the bytes are not UTF-8 JSON or a
/// required member (`type`, `challenge`, `origin`) is missing.
pub fn parse_client_data(bytes: &[u8]) -> Result<ClientData> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| WebAuthnError::MalformedClientData(format!("not UTF-8: {e}")))?;
    let client_data: ClientData = serde_json::from_str(text)
        .map_err(|e| WebAuthnError::MalformedClientData(e.to_string()))?;

    log::trace!(
        "Parsed client data: type={}, origin={}",
        client_data.ceremony_type,
        client_data.origin
    );
    Ok(client_data)
}
