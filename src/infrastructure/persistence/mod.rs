//! PostgreSQL repository implementations.
//!
//! - [`PgLinkRepository`] - Link storage, click counters and expiry purge

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
