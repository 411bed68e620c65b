// Centralized logging for decode progress
use log::{debug, trace, warn};

use crate::webauthn::{AuthenticatorData, ClientData, RecoveredPublicKeyCandidate};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log which ceremony is being inspected
    pub fn log_ceremony_start(ceremony: &str, credential_id: &str) {
        debug!("🔍 Inspecting {ceremony} response for credential {credential_id}");
    }

    /// Warn when the client data type does not belong to the ceremony being inspected
    pub fn log_client_data_type(ceremony: &str, expected: bool, client_data: &ClientData) {
        if !expected {
            warn!(
                "⚠️ {ceremony} response carries client data of type {:?}",
                client_data.ceremony_type
            );
        }
    }

    /// Log the decoded authenticator data in one line
    pub fn log_authenticator_data(source: &str, auth_data: &AuthenticatorData) {
        debug!(
            "Parsed {source} authenticator data: flags=0x{:02x}, counter={}, attested={}, extensions={}, trailing={} bytes",
            auth_data.flags.bits(),
            auth_data.sign_count,
            auth_data.attested_credential_data.is_some(),
            auth_data.extensions.is_some(),
            auth_data.trailing.len()
        );
        if let Some(attested) = &auth_data.attested_credential_data {
            trace!(
                "Attested credential: id {} bytes, alg {}, COSE key {} bytes",
                attested.credential_id.len(),
                attested.credential_public_key.alg,
                attested.credential_public_key_bytes.len()
            );
        }
    }

    /// Log the message hash that recovery runs against
    pub fn log_message_hash(authenticator_data_len: usize, message_hash: &[u8]) {
        trace!(
            "Signed data is {} bytes, message hash {}",
            authenticator_data_len + 32,
            hex::encode(message_hash)
        );
    }

    /// Log the recovered candidates
    pub fn log_recovered_keys(candidates: &[RecoveredPublicKeyCandidate]) {
        let ids: Vec<u8> = candidates.iter().map(|c| c.recovery_id).collect();
        debug!("✅ Recovered {} public key candidates, recovery ids {ids:?}", candidates.len());
    }
}
