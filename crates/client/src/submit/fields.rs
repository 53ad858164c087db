//! Top-level field sealing for JSON request bodies.

use common::protocol::ENCRYPTED_FIELDS_SEPARATOR;
use http::HeaderValue;
use serde_json::{Map, Value};

use super::SubmitError;
use crate::crypto::{self, RsaPublicKey};

/// A request body after sealing, with the names of the fields that now hold
/// ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct SealedPayload {
    pub payload: Value,
    /// Fields actually replaced, in request order, without duplicates.
    pub encrypted_fields: Vec<String>,
}

impl SealedPayload {
    /// Value for the `X-Encrypted-Fields` header, or `None` when nothing was
    /// sealed.
    pub fn marker(&self) -> Option<String> {
        if self.encrypted_fields.is_empty() {
            return None;
        }
        let sep = ENCRYPTED_FIELDS_SEPARATOR.to_string();
        Some(self.encrypted_fields.join(&sep))
    }
}

/// Replace each named top-level field of `body` with its RSA ciphertext.
///
/// Absent and `null` fields are left alone and do not appear in
/// [`SealedPayload::encrypted_fields`]. Every name is validated before any
/// field is touched, so a bad name never leaves a half-sealed body behind.
///
/// # Errors
///
/// - [`SubmitError::InvalidFieldName`] for an empty name, a name containing
///   the separator, or one that cannot travel in a header.
/// - [`SubmitError::UnsupportedFieldValue`] for floats, booleans, arrays and
///   objects.
/// - [`SubmitError::Encrypt`] if a value is too long for the key.
pub fn seal_fields(
    mut body: Map<String, Value>,
    fields: &[&str],
    key: &RsaPublicKey,
) -> Result<SealedPayload, SubmitError> {
    let names = unique_field_names(fields)?;

    let mut encrypted_fields = Vec::with_capacity(names.len());
    for name in names {
        let Some(slot) = body.get_mut(name) else {
            continue;
        };
        let Some(plaintext) = field_text(name, slot)? else {
            continue;
        };
        let ciphertext =
            crypto::encrypt(&plaintext, key).map_err(|source| SubmitError::Encrypt {
                field: name.to_owned(),
                source,
            })?;
        *slot = Value::String(ciphertext);
        encrypted_fields.push(name.to_owned());
    }

    Ok(SealedPayload {
        payload: Value::Object(body),
        encrypted_fields,
    })
}

/// Validate `fields` and drop repeats, keeping first-seen order.
fn unique_field_names<'a>(fields: &[&'a str]) -> Result<Vec<&'a str>, SubmitError> {
    let mut names: Vec<&str> = Vec::with_capacity(fields.len());
    for &name in fields {
        let valid = !name.is_empty()
            && name.trim() == name
            && !name.contains(ENCRYPTED_FIELDS_SEPARATOR)
            && HeaderValue::from_str(name).is_ok();
        if !valid {
            return Err(SubmitError::InvalidFieldName(name.to_owned()));
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Text to encrypt for a field value. `None` for `null`.
fn field_text(name: &str, value: &Value) -> Result<Option<String>, SubmitError> {
    let unsupported = |kind| SubmitError::UnsupportedFieldValue {
        field: name.to_owned(),
        kind,
    };
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        Value::Number(_) => Err(unsupported("float")),
        Value::Bool(_) => Err(unsupported("boolean")),
        Value::Array(_) => Err(unsupported("array")),
        Value::Object(_) => Err(unsupported("object")),
    }
}
