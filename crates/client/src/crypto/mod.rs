//! RSA PKCS#1 v1.5 public-key encryption of individual string fields.
//!
//! This module is free of HTTP and caching concerns. It turns PEM text into
//! an [`RsaPublicKey`] and encrypts short strings under it.
//!
//! # Pipeline
//!
//! ```text
//! PEM ─pem─► DER ─der/key─► (n, e, k) ─pkcs1─► EM ─bigint─► c ─► base64
//! ```
//!
//! Only encryption is implemented; decryption belongs to the server.

pub mod bigint;
pub mod der;
pub mod key;
pub mod pem;
pub mod pkcs1;

#[cfg(test)]
pub(crate) mod test_vectors;

pub use key::{KeyError, KeyFormat, RsaPublicKey};
pub use pkcs1::{encrypt, EncryptError};
