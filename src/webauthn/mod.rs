//! `WebAuthn` response decoding
//!
//! This module decodes the binary structures inside `WebAuthn` registration
//! and authentication responses (attestation objects, authenticator data,
//! COSE keys, DER signatures) and recovers the P-256 public keys consistent
//! with an assertion signature. Everything here is a pure function of its
//! input.

pub mod attestation;
pub mod authenticator_data;
pub mod cbor;
pub mod client_data;
pub mod cose;
pub mod crypto;
pub mod der;
mod errors;
pub mod reader;
pub mod recovery;
mod service;
mod types;

// Re-exports for public use
pub use attestation::{decode_attestation_object, AttestationObject};
pub use authenticator_data::{
    parse_authenticator_data, AttestedCredentialData, AuthenticatorData, AuthenticatorFlags,
};
pub use client_data::{parse_client_data, ClientData};
pub use cose::{CoseAlgorithm, CoseKey};
pub use crypto::{client_data_hash, message_hash, signed_data};
pub use der::{parse_der_signature, EcdsaSignature};
pub use errors::{Result, WebAuthnError};
pub use recovery::{recover_public_keys, RecoveredPublicKeyCandidate};
pub use service::{inspect_json, CeremonyInspector};
pub use types::*;
