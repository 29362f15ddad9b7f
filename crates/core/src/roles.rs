//! Well-known role name constants.
//!
//! These must match the seed data in `20250101000002_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ACCOUNT_REP: &str = "account_rep";
pub const ROLE_CLIENT: &str = "client";

/// Every role the application understands.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ACCOUNT_REP, ROLE_CLIENT];

/// Whether `role` is one of the seeded role names.
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

/// Staff roles are the ones allowed into the `/rep` area.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_ACCOUNT_REP
}
