//! Request handlers.
//!
//! Each submodule groups the handlers for one resource. Handlers authorize
//! through the extractors in [`crate::middleware`] and the company checks in
//! [`crate::access`], delegate storage to `beacon_db` repositories, and map
//! failures via [`crate::error::AppError`].

pub mod admin;
pub mod auth;
pub mod chat;
pub mod companies;
pub mod integrations;
pub mod mailgun;
pub mod metrics;
pub mod notification;
pub mod sync;
pub mod tickets;
pub mod webhooks;
