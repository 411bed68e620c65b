//! CBOR processing for `WebAuthn`
//!
//! Decodes single definite-length CBOR data items into `ciborium` values and
//! reports how many bytes each item occupied. Authenticator data embeds the
//! COSE key and extensions back to back without length prefixes, so the
//! consumed byte count is what lets the caller locate the next field.
//!
//! Each item is first walked header by header with `ciborium_ll` to find its
//! extent and reject indefinite lengths, then deserialized with `ciborium`.

use super::errors::{Result, WebAuthnError};
use crate::utils::encoding::HexStyle;
use ciborium::value::{Integer, Value};
use ciborium_io::Read as _;
use ciborium_ll::{Decoder, Header};

/// Maximum nesting of arrays, maps and tags accepted in one item
const MAX_DEPTH: usize = 16;

/// Decode one CBOR item from the start of `bytes`
///
/// Returns the decoded value and the number of bytes it occupied. Bytes after
/// the item are left untouched.
///
/// # Errors
///
/// Returns `MalformedCbor` on truncated items, indefinite lengths, reserved
/// encodings, invalid UTF-8, duplicate map keys or excessive nesting.
pub fn decode_item(bytes: &[u8]) -> Result<(Value, usize)> {
    let consumed = item_extent(bytes)?;

    let mut item = &bytes[..consumed];
    let value: Value = ciborium::de::from_reader(&mut item).map_err(|err| match err {
        ciborium::de::Error::Syntax(offset) => WebAuthnError::cbor(offset, "invalid item"),
        ciborium::de::Error::Semantic(offset, reason) => {
            WebAuthnError::cbor(offset.unwrap_or(0), reason)
        }
        ciborium::de::Error::Io(e) => WebAuthnError::cbor(0, format!("truncated item ({e})")),
        ciborium::de::Error::RecursionLimitExceeded => WebAuthnError::cbor(0, "nesting too deep"),
    })?;

    reject_duplicate_keys(&value)?;
    Ok((value, consumed))
}

/// Decode exactly one CBOR item spanning all of `bytes`
///
/// # Errors
///
/// Returns `MalformedCbor` if the item is invalid or bytes remain after it.
pub fn decode_exact(bytes: &[u8]) -> Result<Value> {
    let (value, consumed) = decode_item(bytes)?;
    if consumed != bytes.len() {
        return Err(WebAuthnError::cbor(
            consumed,
            format!("{} trailing bytes after item", bytes.len() - consumed),
        ));
    }
    Ok(value)
}

/// Length in bytes of the first item in `bytes`
fn item_extent(bytes: &[u8]) -> Result<usize> {
    let mut decoder = Decoder::from(bytes);
    // Items still owed to each open array, map or tag
    let mut pending: Vec<usize> = Vec::new();

    loop {
        let offset = decoder.offset();
        let header = decoder.pull().map_err(|err| match err {
            ciborium_ll::Error::Syntax(at) => WebAuthnError::cbor(at, "reserved additional info"),
            ciborium_ll::Error::Io(_) => WebAuthnError::cbor(offset, "truncated item"),
        })?;

        let children = match header {
            Header::Positive(_) | Header::Negative(_) | Header::Float(_) | Header::Simple(_) => 0,
            Header::Tag(_) => 1,
            Header::Bytes(Some(len)) | Header::Text(Some(len)) => {
                if len > bytes.len() - decoder.offset() {
                    return Err(WebAuthnError::cbor(offset, "truncated item"));
                }
                let mut payload = vec![0u8; len];
                decoder
                    .read_exact(&mut payload)
                    .map_err(|_| WebAuthnError::cbor(offset, "truncated item"))?;
                0
            }
            Header::Array(Some(len)) => len,
            Header::Map(Some(len)) => len
                .checked_mul(2)
                .ok_or_else(|| WebAuthnError::cbor(offset, "map length overflows"))?,
            Header::Bytes(None) | Header::Text(None) | Header::Array(None) | Header::Map(None) => {
                return Err(WebAuthnError::cbor(offset, "indefinite length not supported"));
            }
            Header::Break => return Err(WebAuthnError::cbor(offset, "unexpected break")),
        };

        if children > 0 {
            if pending.len() >= MAX_DEPTH {
                return Err(WebAuthnError::cbor(offset, "nesting too deep"));
            }
            pending.push(children);
            continue;
        }

        // A complete item closes every container it was the last child of
        loop {
            match pending.last_mut() {
                None => return Ok(decoder.offset()),
                Some(remaining) if *remaining > 1 => {
                    *remaining -= 1;
                    break;
                }
                Some(_) => {
                    pending.pop();
                }
            }
        }
    }
}

fn reject_duplicate_keys(value: &Value) -> Result<()> {
    match value {
        Value::Map(entries) => {
            for (i, (key, child)) in entries.iter().enumerate() {
                if entries[..i].iter().any(|(earlier, _)| earlier == key) {
                    return Err(WebAuthnError::cbor(0, "duplicate map key"));
                }
                reject_duplicate_keys(key)?;
                reject_duplicate_keys(child)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_duplicate_keys),
        Value::Tag(_, inner) => reject_duplicate_keys(inner),
        _ => Ok(()),
    }
}

/// Look up a text key in a CBOR map
#[must_use]
pub fn map_get_text<'v>(entries: &'v [(Value, Value)], key: &str) -> Option<&'v Value> {
    entries
        .iter()
        .find(|(k, _)| k.as_text() == Some(key))
        .map(|(_, v)| v)
}

/// Look up an integer key in a CBOR map
#[must_use]
pub fn map_get_int(entries: &[(Value, Value)], key: i64) -> Option<&Value> {
    entries
        .iter()
        .find(|(k, _)| k.as_integer().is_some_and(|i| i128::from(i) == i128::from(key)))
        .map(|(_, v)| v)
}

/// Render a CBOR value as JSON for display
///
/// Byte strings become hex strings and non-text map keys are stringified,
/// since JSON objects only allow string keys.
#[must_use]
pub fn to_json(value: &Value, hex: HexStyle) -> serde_json::Value {
    match value {
        Value::Integer(i) => integer_to_json(*i),
        Value::Bytes(bytes) => serde_json::Value::String(hex.encode(bytes)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Tag(tag, inner) => serde_json::json!({ "tag": tag, "value": to_json(inner, hex) }),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(|item| to_json(item, hex)).collect())
        }
        Value::Map(entries) => {
            let object = entries
                .iter()
                .map(|(k, v)| (map_key_to_string(k, hex), to_json(v, hex)))
                .collect();
            serde_json::Value::Object(object)
        }
        _ => serde_json::Value::Null,
    }
}

fn integer_to_json(integer: Integer) -> serde_json::Value {
    let wide = i128::from(integer);
    if let Ok(n) = i64::try_from(wide) {
        serde_json::Value::from(n)
    } else if let Ok(n) = u64::try_from(wide) {
        serde_json::Value::from(n)
    } else {
        serde_json::Value::String(wide.to_string())
    }
}

fn map_key_to_string(key: &Value, hex: HexStyle) -> String {
    match key {
        Value::Text(text) => text.clone(),
        Value::Integer(i) => i128::from(*i).to_string(),
        other => to_json(other, hex).to_string(),
    }
}
