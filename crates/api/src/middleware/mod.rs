//! Request extractors for authentication and role checks.
//!
//! - [`auth::AuthUser`]: caller identity from a Bearer token or session cookie.
//! - [`rbac`]: role-gated wrappers around it.

pub mod auth;
pub mod rbac;
