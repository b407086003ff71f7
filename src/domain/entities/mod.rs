//! Core domain entities.
//!
//! - [`ShortLink`] - A stored short code to target URL mapping
//! - [`NewShortLink`] - Insert payload
//! - [`LinkAnalytics`] - Per-code usage counters

pub mod link;

pub use link::{LinkAnalytics, NewShortLink, ShortLink};
