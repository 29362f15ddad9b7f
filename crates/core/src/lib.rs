//! Domain types and pure logic shared by every Beacon crate.
//!
//! Nothing in here performs IO, so it can be used by the repository layer,
//! the vendor clients, the campaign reconciler and the HTTP handlers alike.

pub mod email_events;
pub mod error;
pub mod metrics;
pub mod pagination;
pub mod roles;
pub mod tickets;
pub mod types;
