//! Utility functions for code encoding, input validation, and request handling.
//!
//! - [`base62`] - Counter-to-code codec
//! - [`alias`] - Custom alias validation
//! - [`url_validator`] - Target URL validation
//! - [`client_ip`] - Client identity extraction for rate limiting

pub mod alias;
pub mod base62;
pub mod client_ip;
pub mod url_validator;
