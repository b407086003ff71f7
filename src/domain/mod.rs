//! Domain layer: entities, repository contracts and click processing.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click counter updates
//! - [`expiry_sweeper`] - Periodic purge of expired links
//!
//! Repository traits are implemented in `crate::infrastructure`.
//!
//! # Click Processing Flow
//!
//! 1. [`crate::application::services::LinkService::resolve`] returns a target
//! 2. A [`click_event::ClickEvent`] is offered to a bounded channel without waiting
//! 3. [`click_worker::run_click_worker`] applies it via [`repositories::LinkRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod expiry_sweeper;
pub mod repositories;
