//! Common wire types and errors shared by consumers of the admin console API.

pub mod error;
pub mod protocol;

pub use error::ApiError;
