//! `WebAuthn` attestation object decoding
//!
//! The attestation object is a CBOR map with the text keys `fmt`, `attStmt`
//! and `authData`. The attestation statement is format specific and is kept
//! as an opaque CBOR value.

use super::authenticator_data::MIN_AUTH_DATA_LEN;
use super::cbor;
use super::errors::{Result, WebAuthnError};
use ciborium::value::Value;

/// Decoded attestation object
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationObject {
    /// Attestation statement format identifier, e.g. `none` or `packed`
    pub fmt: String,
    /// Opaque attestation statement map
    pub att_stmt: Value,
    /// Raw authenticator data
    pub auth_data: Vec<u8>,
}

/// Decode an attestation object from its raw CBOR bytes
///
/// # Errors
///
/// - `MalformedCbor` if the bytes are not a single CBOR map, or if `fmt`,
///   `attStmt` or `authData` is missing or has the wrong type
/// - `TruncatedData` if `authData` is shorter than 37 bytes
pub fn decode_attestation_object(bytes: &[u8]) -> Result<AttestationObject> {
    let value = cbor::decode_exact(bytes)?;
    let Value::Map(entries) = value else {
        return Err(WebAuthnError::cbor(0, "attestation object is not a map"));
    };

    let fmt = match cbor::map_get_text(&entries, "fmt") {
        Some(Value::Text(fmt)) => fmt.clone(),
        Some(_) => return Err(WebAuthnError::cbor(0, "fmt is not a text string")),
        None => return Err(WebAuthnError::cbor(0, "missing fmt")),
    };

    let att_stmt = match cbor::map_get_text(&entries, "attStmt") {
        Some(stmt @ Value::Map(_)) => stmt.clone(),
        Some(_) => return Err(WebAuthnError::cbor(0, "attStmt is not a map")),
        None => return Err(WebAuthnError::cbor(0, "missing attStmt")),
    };

    let auth_data = match cbor::map_get_text(&entries, "authData") {
        Some(Value::Bytes(data)) => data.clone(),
        Some(_) => return Err(WebAuthnError::cbor(0, "authData is not a byte string")),
        None => return Err(WebAuthnError::cbor(0, "missing authData")),
    };

    if auth_data.len() < MIN_AUTH_DATA_LEN {
        return Err(WebAuthnError::TruncatedData {
            field: "authData",
            offset: 0,
            needed: MIN_AUTH_DATA_LEN,
            remaining: auth_data.len(),
        });
    }

    log::debug!(
        "Decoded attestation object: fmt={fmt}, authData={} bytes",
        auth_data.len()
    );

    Ok(AttestationObject {
        fmt,
        att_stmt,
        auth_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(value, &mut out).unwrap();
        out
    }

    fn attestation(fmt: Value, att_stmt: Value, auth_data: Value) -> Vec<u8> {
        encode(&Value::Map(vec![
            (Value::Text("fmt".into()), fmt),
            (Value::Text("attStmt".into()), att_stmt),
            (Value::Text("authData".into()), auth_data),
        ]))
    }

    #[test]
    fn test_decode_none_attestation() {
        let auth_data = vec![0x11; 37];
        let bytes = attestation(
            Value::Text("none".into()),
            Value::Map(vec![]),
            Value::Bytes(auth_data.clone()),
        );

        let decoded = decode_attestation_object(&bytes).unwrap();
        assert_eq!(decoded.fmt, "none");
        assert_eq!(decoded.att_stmt, Value::Map(vec![]));
        assert_eq!(decoded.auth_data, auth_data);
    }

    #[test]
    fn test_att_stmt_is_kept_opaque() {
        let stmt = Value::Map(vec![
            (Value::Text("alg".into()), Value::Integer((-7).into())),
            (Value::Text("sig".into()), Value::Bytes(vec![0x30, 0x01])),
        ]);
        let bytes = attestation(
            Value::Text("packed".into()),
            stmt.clone(),
            Value::Bytes(vec![0; 37]),
        );

        let decoded = decode_attestation_object(&bytes).unwrap();
        assert_eq!(decoded.fmt, "packed");
        assert_eq!(decoded.att_stmt, stmt);
    }

    #[test]
    fn test_auth_data_must_be_byte_string() {
        let bytes = attestation(
            Value::Text("none".into()),
            Value::Map(vec![]),
            Value::Array(vec![Value::Integer(1.into())]),
        );
        let err = decode_attestation_object(&bytes).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedCbor { .. }));
    }

    #[test]
    fn test_missing_fmt() {
        let bytes = encode(&Value::Map(vec![
            (Value::Text("attStmt".into()), Value::Map(vec![])),
            (Value::Text("authData".into()), Value::Bytes(vec![0; 37])),
        ]));
        let err = decode_attestation_object(&bytes).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedCbor { ref reason, .. } if reason == "missing fmt"));
    }

    #[test]
    fn test_short_auth_data() {
        let bytes = attestation(
            Value::Text("none".into()),
            Value::Map(vec![]),
            Value::Bytes(vec![0; 36]),
        );
        let err = decode_attestation_object(&bytes).unwrap_err();
        assert!(matches!(
            err,
            WebAuthnError::TruncatedData {
                field: "authData",
                needed: 37,
                remaining: 36,
                ..
            }
        ));
    }

    #[test]
    fn test_top_level_must_be_map() {
        let bytes = encode(&Value::Array(vec![]));
        assert!(decode_attestation_object(&bytes).is_err());
    }
}
