//! RSA public key extraction from SPKI or bare PKCS#1 DER.

use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::bigint::os2ip;
use super::der::{DerCursor, DerError};
use super::pem::decode_pem;

/// Errors produced while turning PEM text into an [`RsaPublicKey`].
///
/// Every variant means the key material is malformed.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Nothing left after removing armor and whitespace.
    #[error("public key PEM has an empty body")]
    EmptyPem,

    /// The PEM body is not valid base64.
    #[error("public key PEM body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Neither layout could be read. Carries the failure of each attempt.
    #[error("public key DER is neither SPKI nor PKCS#1 (as SPKI: {spki}; as PKCS#1: {pkcs1})")]
    Unrecognised { spki: DerError, pkcs1: DerError },

    /// The modulus has redundant leading zero bytes.
    #[error("RSA modulus is not minimally encoded")]
    NonCanonicalModulus,

    /// Modulus or exponent is zero.
    #[error("RSA public key has a zero modulus or exponent")]
    Degenerate,
}

/// Layout the key was delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// `SubjectPublicKeyInfo` (`-----BEGIN PUBLIC KEY-----`).
    Spki,
    /// Bare `RSAPublicKey` (`-----BEGIN RSA PUBLIC KEY-----`).
    Pkcs1,
}

/// An RSA public key ready for PKCS#1 v1.5 encryption.
///
/// `key_byte_len` is the length of the encoded modulus without its sign byte,
/// which is the fixed width of every padded block and ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    modulus: BigUint,
    exponent: BigUint,
    key_byte_len: usize,
    format: KeyFormat,
    fingerprint: String,
}

/// Integer fields of a `RSAPublicKey` structure, still borrowed from the buffer.
struct RawKey<'a> {
    der: &'a [u8],
    modulus: &'a [u8],
    exponent: &'a [u8],
}

impl RsaPublicKey {
    /// Parse PEM text holding an SPKI or PKCS#1 RSA public key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the armor, base64 or DER structure is invalid.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        Self::from_der(&decode_pem(pem)?)
    }

    /// Parse DER bytes, trying SPKI first and bare PKCS#1 second.
    ///
    /// # Errors
    ///
    /// [`KeyError::Unrecognised`] when both layouts fail, carrying each
    /// attempt's error; [`KeyError::Degenerate`] or
    /// [`KeyError::NonCanonicalModulus`] for structurally valid but unusable
    /// keys.
    pub fn from_der(der: &[u8]) -> Result<Self, KeyError> {
        let (format, raw) = match parse_spki(der) {
            Ok(raw) => (KeyFormat::Spki, raw),
            Err(spki) => match parse_pkcs1(der) {
                Ok(raw) => (KeyFormat::Pkcs1, raw),
                Err(pkcs1) => return Err(KeyError::Unrecognised { spki, pkcs1 }),
            },
        };
        Self::from_raw(format, raw)
    }

    fn from_raw(format: KeyFormat, raw: RawKey<'_>) -> Result<Self, KeyError> {
        let modulus = os2ip(raw.modulus);
        let exponent = os2ip(raw.exponent);
        if modulus.is_zero() || exponent.is_zero() {
            return Err(KeyError::Degenerate);
        }
        if raw.modulus[0] == 0 {
            return Err(KeyError::NonCanonicalModulus);
        }

        Ok(Self {
            modulus,
            exponent,
            key_byte_len: raw.modulus.len(),
            format,
            fingerprint: hex::encode(Sha256::digest(raw.der)),
        })
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The public exponent `e`.
    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    /// `k`: modulus length in bytes.
    pub fn key_byte_len(&self) -> usize {
        self.key_byte_len
    }

    /// Modulus length in bits.
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    /// Hex SHA-256 of the `RSAPublicKey` DER. Identical for the SPKI and
    /// PKCS#1 encodings of the same key; safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl std::fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPublicKey")
            .field("format", &self.format)
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// `SEQUENCE { SEQUENCE { OID, [NULL] }, BIT STRING { RSAPublicKey } }`
fn parse_spki(der: &[u8]) -> Result<RawKey<'_>, DerError> {
    let mut spki = DerCursor::new(der).read_sequence()?;
    let mut algorithm = spki.read_sequence()?;
    algorithm.read_oid()?;
    // Parameters: absent or NULL.
    if !algorithm.is_empty() {
        algorithm.read_null()?;
    }
    let subject_public_key = spki.read_bit_string()?;
    parse_pkcs1(subject_public_key)
}

/// `SEQUENCE { INTEGER modulus, INTEGER publicExponent }`
fn parse_pkcs1(der: &[u8]) -> Result<RawKey<'_>, DerError> {
    let mut key = DerCursor::new(der).read_sequence()?;
    let modulus = key.read_integer()?;
    let exponent = key.read_integer()?;
    Ok(RawKey {
        der,
        modulus: modulus.bytes,
        exponent: exponent.bytes,
    })
}
