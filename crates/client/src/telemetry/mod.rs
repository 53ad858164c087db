//! Logging setup for `console-login`.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, ciphertext or key material** in any log field. Keys are
//!   identified by size and SHA-256 fingerprint only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
