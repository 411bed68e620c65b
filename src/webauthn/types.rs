//! `WebAuthn` boundary types
//!
//! Input shapes follow the JSON serialisation of `PublicKeyCredential` used
//! by browsers and client libraries. Output shapes are the reports rendered by
//! the inspector; binary values in them are hex unless noted otherwise.

use super::client_data::ClientData;
use serde::{Deserialize, Serialize};

/// Registration response from client
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponseJson {
    pub id: String,     // Base64URL-encoded credential ID
    pub raw_id: String, // Base64URL-encoded raw credential ID
    pub response: AuthenticatorAttestationResponseJson,
    #[serde(default)]
    pub authenticator_attachment: Option<String>, // "platform", "cross-platform"
    #[serde(default)]
    pub client_extension_results: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub r#type: String, // Always "public-key"
}

/// Authentication response from client
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponseJson {
    pub id: String,     // Base64URL-encoded credential ID
    pub raw_id: String, // Base64URL-encoded raw credential ID
    pub response: AuthenticatorAssertionResponseJson,
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
    #[serde(default)]
    pub client_extension_results: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub r#type: String, // Always "public-key"
}

/// Authenticator attestation response during registration
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAttestationResponseJson {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String, // Base64URL-encoded client data JSON
    pub attestation_object: String, // Base64URL-encoded attestation object
    #[serde(default)]
    pub transports: Option<Vec<String>>, // "usb", "nfc", "ble", "internal", "hybrid"
}

/// Authenticator assertion response during authentication
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAssertionResponseJson {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String, // Base64URL-encoded client data JSON
    pub authenticator_data: String, // Base64URL-encoded authenticator data
    pub signature: String,          // Base64URL-encoded DER signature
    #[serde(default)]
    pub user_handle: Option<String>, // Base64URL-encoded user handle
}

/// Flag bits of the authenticator data, one field per defined bit
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlagsReport {
    pub raw: u8,
    pub user_present: bool,
    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_state: bool,
    pub attested_credential_data: bool,
    pub extension_data: bool,
}

/// Decoded authenticator data
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorDataReport {
    pub rp_id_hash: String,
    pub flags: FlagsReport,
    pub counter: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aaguid: Option<String>, // UUID string form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>, // Base64URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_public_key: Option<String>, // Base64URL of the raw COSE key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing: Option<String>,
}

/// Decoded EC2 credential public key
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CoseKeyReport {
    pub kty: i64,
    pub alg: String, // "ES256", "RS256" or the numeric identifier
    pub alg_id: i64,
    pub crv: i64,
    pub x: String,
    pub y: String,
    pub uncompressed: String, // SEC1 0x04 || x || y
}

/// Decoded attestation object
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AttestationObjectReport {
    pub fmt: String,
    pub att_stmt: serde_json::Value,
    pub auth_data: AuthenticatorDataReport,
}

/// Everything decoded from a registration response
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReport {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_extension_results: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: ClientData,
    pub attestation_object: AttestationObjectReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<CoseKeyReport>,
}

/// ECDSA signature components
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReport {
    pub der: String,
    pub r: String,
    pub s: String,
    pub uncompressed: String, // r || s
}

/// One recovered public key
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredKeyReport {
    pub recovery_id: u8,
    pub x: String,
    pub y: String,
    pub uncompressed: String,
}

/// The signed bytes laid out in FIDO U2F terms
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FidoU2fReport {
    pub authenticator_data: String,
    pub app_id_hash: String,        // 32 bytes
    pub user_presence_flag: String, // 1 byte
    pub counter: String,            // 4 bytes
    pub client_data_sha256: String, // 32 bytes
}

/// Everything decoded from an authentication response
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationReport {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_extension_results: Option<serde_json::Value>,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: ClientData,
    pub challenge: String,
    pub authenticator_data: AuthenticatorDataReport,
    pub signature: SignatureReport,
    pub message_hash: String,
    pub recovered_public_keys: Vec<RecoveredKeyReport>,
    pub fido_u2f: FidoU2fReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Report for either ceremony, tagged with its kind
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "ceremony", rename_all = "camelCase")]
pub enum CeremonyReport {
    Registration(RegistrationReport),
    Authentication(AuthenticationReport),
}
