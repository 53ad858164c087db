//! Client-side field sealing for the admin console API.
//!
//! Sensitive request fields (passwords, secrets) are encrypted with the
//! server's RSA public key using PKCS#1 v1.5 padding before they leave the
//! process. The key is fetched once per [`PublicKeyProvider`] and cached.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use console_client::{ConsoleClient, HyperTransport};
//!
//! let transport = HyperTransport::new(
//!     "https://console.example.com/api/v1",
//!     std::time::Duration::from_secs(30),
//! )?;
//! let client = ConsoleClient::new(Arc::new(transport));
//! let session = client.login("admin", "hunter2").await?;
//! println!("{}", session.user);
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod pubkey;
pub mod submit;
pub mod transport;

pub use crypto::{encrypt, EncryptError, KeyError, KeyFormat, RsaPublicKey};
pub use pubkey::{PublicKeyError, PublicKeyProvider};
pub use submit::{ConsoleClient, ErrorKind, SealedPayload, SubmitError};
pub use transport::{ApiRequest, HyperTransport, Transport, TransportError};
