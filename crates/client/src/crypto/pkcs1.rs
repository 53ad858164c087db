//! RSAES-PKCS1-v1_5 encryption (RFC 8017 §7.2.1).
//!
//! ```text
//! EM = 0x00 || 0x02 || PS || 0x00 || M        (exactly k bytes)
//! ```
//!
//! `PS` is at least [`MIN_PADDING_LEN`] non-zero random bytes drawn from the
//! OS CSPRNG. Zero bytes are rejected and redrawn, never clamped.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use super::bigint::{i2osp, mod_pow, os2ip};
use super::key::RsaPublicKey;

/// Minimum length of the random padding string.
pub const MIN_PADDING_LEN: usize = 8;

/// Bytes of `EM` not available to the message: two header bytes, the
/// separator and the minimum padding.
pub const PADDING_OVERHEAD: usize = 3 + MIN_PADDING_LEN;

/// Errors produced by the encryption layer.
#[derive(Debug, Error)]
pub enum EncryptError {
    /// The UTF-8 plaintext does not fit in one block for this key.
    #[error("message too long: {len} bytes, key allows at most {max}")]
    MessageTooLong { len: usize, max: usize },

    /// The OS random source failed.
    #[error("random source failure: {0}")]
    Rng(#[from] rand::Error),

    /// `c` did not fit in `k` bytes. Unreachable for a well-formed key.
    #[error("ciphertext integer exceeds the key length")]
    CiphertextOverflow,
}

/// Largest message, in bytes, that `key` can encrypt.
pub fn max_message_len(key: &RsaPublicKey) -> usize {
    key.key_byte_len().saturating_sub(PADDING_OVERHEAD)
}

/// Build the `k`-byte encoded block for `message`.
///
/// # Errors
///
/// [`EncryptError::MessageTooLong`] if `message.len() > k - 11`,
/// [`EncryptError::Rng`] if `rng` fails.
pub fn encode_block<R: RngCore + ?Sized>(
    message: &[u8],
    k: usize,
    rng: &mut R,
) -> Result<Vec<u8>, EncryptError> {
    let max = k.saturating_sub(PADDING_OVERHEAD);
    if k < PADDING_OVERHEAD || message.len() > max {
        return Err(EncryptError::MessageTooLong {
            len: message.len(),
            max,
        });
    }

    let ps_len = k - message.len() - 3;
    let mut block = vec![0u8; k];
    block[1] = 0x02;
    fill_non_zero(rng, &mut block[2..2 + ps_len])?;
    // block[2 + ps_len] stays 0x00 as the separator.
    block[3 + ps_len..].copy_from_slice(message);
    Ok(block)
}

/// Fill `out` with non-zero random bytes, redrawing any zeros.
fn fill_non_zero<R: RngCore + ?Sized>(rng: &mut R, out: &mut [u8]) -> Result<(), rand::Error> {
    let mut scratch = vec![0u8; out.len()];
    let mut filled = 0;
    while filled < out.len() {
        let want = out.len() - filled;
        rng.try_fill_bytes(&mut scratch[..want])?;
        for &b in scratch[..want].iter().filter(|&&b| b != 0) {
            out[filled] = b;
            filled += 1;
        }
    }
    Ok(())
}

/// Encrypt `message` and return the raw `k`-byte ciphertext.
pub fn encrypt_bytes_with<R: RngCore + ?Sized>(
    message: &[u8],
    key: &RsaPublicKey,
    rng: &mut R,
) -> Result<Vec<u8>, EncryptError> {
    let k = key.key_byte_len();
    let block = encode_block(message, k, rng)?;
    let c = mod_pow(&os2ip(&block), key.exponent(), key.modulus());
    i2osp(&c, k).ok_or(EncryptError::CiphertextOverflow)
}

/// Encrypt `plaintext` under `key` and return base64 ciphertext.
///
/// Output differs on every call because the padding is random.
///
/// # Errors
///
/// [`EncryptError::MessageTooLong`] if the UTF-8 plaintext exceeds
/// `k - 11` bytes.
pub fn encrypt(plaintext: &str, key: &RsaPublicKey) -> Result<String, EncryptError> {
    let ciphertext = encrypt_bytes_with(plaintext.as_bytes(), key, &mut OsRng)?;
    Ok(STANDARD.encode(ciphertext))
}
