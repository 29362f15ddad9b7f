//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod company;
pub mod conversation;
pub mod direct_mail;
pub mod email_campaign;
pub mod email_recipient;
pub mod ga;
pub mod mailgun_send;
pub mod notification;
pub mod role;
pub mod session;
pub mod social;
pub mod ticket;
pub mod user;
