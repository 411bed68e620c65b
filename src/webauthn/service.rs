//! Ceremony inspection
//!
//! Ties the decoders together: takes the JSON form of a registration or
//! authentication response, decodes every binary member and renders the
//! result as a report.

use super::attestation;
use super::authenticator_data::{parse_authenticator_data, AuthenticatorData};
use super::cbor;
use super::client_data::parse_client_data;
use super::cose::CoseKey;
use super::crypto;
use super::der::{parse_der_signature, EcdsaSignature};
use super::errors::{Result, WebAuthnError};
use super::recovery::{recover_public_keys, RecoveredPublicKeyCandidate};
use super::types::{
    AttestationObjectReport, AuthenticationReport, AuthenticationResponseJson,
    AuthenticatorDataReport, CeremonyReport, CoseKeyReport, FidoU2fReport, FlagsReport,
    RecoveredKeyReport, RegistrationReport, RegistrationResponseJson, SignatureReport,
};
use crate::settings::OutputSettings;
use crate::utils::encoding::{decode_base64url, encode_base64url, HexStyle};
use crate::utils::logging::LoggingHelper;

/// Inspect a credential JSON document with default output options
///
/// # Errors
///
/// See [`CeremonyInspector::inspect_json`].
pub fn inspect_json(json: &str) -> Result<CeremonyReport> {
    CeremonyInspector::default().inspect_json(json)
}

/// Decodes ceremony responses into reports
#[derive(Debug, Clone, Copy, Default)]
pub struct CeremonyInspector {
    hex: HexStyle,
}

impl CeremonyInspector {
    #[must_use]
    pub const fn new(hex: HexStyle) -> Self {
        Self { hex }
    }

    #[must_use]
    pub const fn from_settings(output: &OutputSettings) -> Self {
        Self::new(output.hex_style())
    }

    /// Detect the ceremony from the response members and inspect it
    ///
    /// A `response.attestationObject` member marks a registration, a
    /// `response.signature` member an authentication.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the document is not JSON of either shape,
    /// otherwise any error of the selected inspection.
    pub fn inspect_json(&self, json: &str) -> Result<CeremonyReport> {
        let document: serde_json::Value =
            serde_json::from_str(json).map_err(|e| WebAuthnError::encoding("credential", e))?;

        let response = document
            .get("response")
            .ok_or_else(|| WebAuthnError::encoding("response", "missing response object"))?;

        if response.get("attestationObject").is_some() {
            let registration: RegistrationResponseJson = serde_json::from_value(document)
                .map_err(|e| WebAuthnError::encoding("credential", e))?;
            self.inspect_registration(&registration)
                .map(CeremonyReport::Registration)
        } else if response.get("signature").is_some() {
            let authentication: AuthenticationResponseJson = serde_json::from_value(document)
                .map_err(|e| WebAuthnError::encoding("credential", e))?;
            self.inspect_authentication(&authentication)
                .map(CeremonyReport::Authentication)
        } else {
            Err(WebAuthnError::encoding(
                "response",
                "neither attestationObject nor signature present",
            ))
        }
    }

    /// Decode a registration response
    ///
    /// # Errors
    ///
    /// - `Encoding` if a binary member is not valid base64url
    /// - `MalformedClientData` if `clientDataJSON` is not a client data object
    /// - any attestation object, authenticator data or COSE key error
    pub fn inspect_registration(
        &self,
        response: &RegistrationResponseJson,
    ) -> Result<RegistrationReport> {
        LoggingHelper::log_ceremony_start("registration", &response.id);

        let raw_id = decode_field("rawId", &response.raw_id)?;
        let client_data_bytes =
            decode_field("response.clientDataJSON", &response.response.client_data_json)?;
        let client_data = parse_client_data(&client_data_bytes)?;
        LoggingHelper::log_client_data_type(
            "registration",
            client_data.is_registration(),
            &client_data,
        );

        let attestation_bytes = decode_field(
            "response.attestationObject",
            &response.response.attestation_object,
        )?;
        let attestation = attestation::decode_attestation_object(&attestation_bytes)?;
        let auth_data = parse_authenticator_data(&attestation.auth_data)?;
        LoggingHelper::log_authenticator_data("attestation", &auth_data);

        let public_key = auth_data
            .attested_credential_data
            .as_ref()
            .map(|attested| self.cose_key_report(&attested.credential_public_key));

        Ok(RegistrationReport {
            id: response.id.clone(),
            raw_id: self.hex.encode(&raw_id),
            r#type: response.r#type.clone(),
            authenticator_attachment: response.authenticator_attachment.clone(),
            client_extension_results: response.client_extension_results.clone(),
            transports: response.response.transports.clone(),
            client_data_json: client_data,
            attestation_object: AttestationObjectReport {
                fmt: attestation.fmt,
                att_stmt: cbor::to_json(&attestation.att_stmt, self.hex),
                auth_data: self.authenticator_data_report(&auth_data),
            },
            public_key,
        })
    }

    /// Decode an authentication response and recover the signer's key candidates
    ///
    /// # Errors
    ///
    /// - `Encoding` if a binary member is not valid base64url
    /// - `MalformedClientData` if `clientDataJSON` or its challenge is malformed
    /// - `TruncatedData`/`MalformedCbor` from the authenticator data
    /// - `MalformedSignature` if the signature is not valid DER
    /// - `InvalidPoint` if key recovery fails
    pub fn inspect_authentication(
        &self,
        response: &AuthenticationResponseJson,
    ) -> Result<AuthenticationReport> {
        LoggingHelper::log_ceremony_start("authentication", &response.id);

        let raw_id = decode_field("rawId", &response.raw_id)?;
        let client_data_bytes =
            decode_field("response.clientDataJSON", &response.response.client_data_json)?;
        let client_data = parse_client_data(&client_data_bytes)?;
        LoggingHelper::log_client_data_type(
            "authentication",
            client_data.is_authentication(),
            &client_data,
        );
        let challenge = client_data.challenge_bytes()?;

        let auth_data_bytes = decode_field(
            "response.authenticatorData",
            &response.response.authenticator_data,
        )?;
        let auth_data = parse_authenticator_data(&auth_data_bytes)?;
        LoggingHelper::log_authenticator_data("assertion", &auth_data);

        let signature_der = decode_field("response.signature", &response.response.signature)?;
        let signature = parse_der_signature(&signature_der)?;

        let client_data_hash = crypto::client_data_hash(&client_data_bytes);
        let message_hash = crypto::message_hash(&auth_data_bytes, &client_data_bytes);
        LoggingHelper::log_message_hash(auth_data_bytes.len(), &message_hash);

        let candidates = recover_public_keys(&signature, &message_hash)?;
        LoggingHelper::log_recovered_keys(&candidates);

        let user_handle = response
            .response
            .user_handle
            .as_deref()
            .map(|handle| decode_field("response.userHandle", handle))
            .transpose()?;

        let prefix = auth_data.prefix_bytes();
        Ok(AuthenticationReport {
            id: response.id.clone(),
            raw_id: self.hex.encode(&raw_id),
            r#type: response.r#type.clone(),
            authenticator_attachment: response.authenticator_attachment.clone(),
            client_extension_results: response.client_extension_results.clone(),
            client_data_json: client_data,
            challenge: self.hex.encode(&challenge),
            authenticator_data: self.authenticator_data_report(&auth_data),
            signature: self.signature_report(&signature, &signature_der),
            message_hash: self.hex.encode(&message_hash),
            recovered_public_keys: candidates
                .iter()
                .map(|candidate| self.recovered_key_report(candidate))
                .collect(),
            fido_u2f: FidoU2fReport {
                authenticator_data: self.hex.encode(&auth_data_bytes),
                app_id_hash: self.hex.encode(&prefix[..32]),
                user_presence_flag: self.hex.encode(&prefix[32..33]),
                counter: self.hex.encode(&prefix[33..]),
                client_data_sha256: self.hex.encode(&client_data_hash),
            },
            user_handle: user_handle.map(|handle| self.hex.encode(&handle)),
        })
    }

    fn authenticator_data_report(&self, auth_data: &AuthenticatorData) -> AuthenticatorDataReport {
        let flags = auth_data.flags;
        let attested = auth_data.attested_credential_data.as_ref();

        AuthenticatorDataReport {
            rp_id_hash: self.hex.encode(&auth_data.rp_id_hash),
            flags: FlagsReport {
                raw: flags.bits(),
                user_present: flags.user_present(),
                user_verified: flags.user_verified(),
                backup_eligible: flags.backup_eligible(),
                backup_state: flags.backup_state(),
                attested_credential_data: flags.attested_credential_data(),
                extension_data: flags.extension_data(),
            },
            counter: auth_data.sign_count,
            aaguid: attested.map(|a| uuid::Uuid::from_bytes(a.aaguid).to_string()),
            credential_id: attested.map(|a| encode_base64url(&a.credential_id)),
            credential_public_key: attested
                .map(|a| encode_base64url(&a.credential_public_key_bytes)),
            extensions: auth_data
                .extensions
                .as_ref()
                .map(|ext| cbor::to_json(ext, self.hex)),
            trailing: (!auth_data.trailing.is_empty()).then(|| self.hex.encode(&auth_data.trailing)),
        }
    }

    fn cose_key_report(&self, key: &CoseKey) -> CoseKeyReport {
        CoseKeyReport {
            kty: key.kty,
            alg: key.alg.to_string(),
            alg_id: key.alg.id(),
            crv: key.crv,
            x: self.hex.encode(&key.x),
            y: self.hex.encode(&key.y),
            uncompressed: self.hex.encode(&key.to_sec1_uncompressed()),
        }
    }

    fn signature_report(&self, signature: &EcdsaSignature, der: &[u8]) -> SignatureReport {
        SignatureReport {
            der: self.hex.encode(der),
            r: self.hex.encode(&signature.r),
            s: self.hex.encode(&signature.s),
            uncompressed: self.hex.encode(&signature.to_bytes()),
        }
    }

    fn recovered_key_report(&self, candidate: &RecoveredPublicKeyCandidate) -> RecoveredKeyReport {
        RecoveredKeyReport {
            recovery_id: candidate.recovery_id,
            x: self.hex.encode(&candidate.x),
            y: self.hex.encode(&candidate.y),
            uncompressed: self.hex.encode(&candidate.to_sec1_uncompressed()),
        }
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>> {
    decode_base64url(value).map_err(|e| WebAuthnError::encoding(field, e))
}
