//! PEM armor removal and base64 body decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::key::KeyError;

const DASHES: &str = "-----";

/// Decode the DER bytes inside a PEM block.
///
/// Removes every `-----BEGIN <label>-----` and `-----END <label>-----`
/// delimiter, drops all whitespace and base64-decodes the rest. Text without
/// armor is decoded as a bare base64 body.
///
/// # Errors
///
/// [`KeyError::EmptyPem`] if nothing remains after stripping,
/// [`KeyError::Base64`] if the residue is not valid base64.
pub fn decode_pem(pem: &str) -> Result<Vec<u8>, KeyError> {
    let body = strip_armor(pem);
    if body.is_empty() {
        return Err(KeyError::EmptyPem);
    }
    Ok(STANDARD.decode(body.as_bytes())?)
}

fn strip_armor(pem: &str) -> String {
    let mut body = String::with_capacity(pem.len());
    let mut rest = pem;

    while let Some(start) = rest.find(DASHES) {
        body.push_str(&rest[..start]);
        let after_open = &rest[start + DASHES.len()..];
        match after_open.find(DASHES) {
            Some(end) if is_delimiter_label(&after_open[..end]) => {
                rest = &after_open[end + DASHES.len()..];
            }
            // Not a delimiter; keep the dashes so base64 decoding rejects them.
            _ => {
                body.push_str(DASHES);
                rest = after_open;
            }
        }
    }
    body.push_str(rest);
    body.retain(|c| !c.is_whitespace());
    body
}

fn is_delimiter_label(label: &str) -> bool {
    label
        .strip_prefix("BEGIN ")
        .or_else(|| label.strip_prefix("END "))
        .is_some_and(|name| !name.is_empty() && !name.contains('-'))
}
