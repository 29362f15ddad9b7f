//! Repository for `users`. Every read joins `roles` so callers get the
//! role name without a second query.

use beacon_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserFilter};

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.role_id, \
                            r.name AS role, u.company_id, u.is_active, u.last_login_at, \
                            u.failed_login_count, u.locked_until, u.created_at, u.updated_at";

/// Wrap a statement returning `users` rows as `u` so the result carries the
/// role name.
fn with_role(statement: &str) -> String {
    format!(
        "WITH u AS ({statement} RETURNING *)
         SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
    )
}

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = with_role(
            "INSERT INTO users (username, email, password_hash, role_id, company_id)
             VALUES ($1, $2, $3, $4, $5)",
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(input.company_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact, case-sensitive username match.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.username = $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Newest first. Deactivated users are left out unless asked for.
    pub async fn list(pool: &PgPool, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE ($1::TEXT IS NULL OR r.name = $1)
               AND ($2::BIGINT IS NULL OR u.company_id = $2)
               AND ($3 OR u.is_active)
             ORDER BY u.created_at DESC, u.id DESC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&filter.role)
            .bind(filter.company_id)
            .bind(filter.include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = with_role(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                role_id = COALESCE($4, role_id),
                company_id = COALESCE($5, company_id),
                is_active = COALESCE($6, is_active)
             WHERE id = $1",
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(input.company_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Returns `false` when the user does not exist or is already inactive.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed login and lock the account once `max_failures` is
    /// reached. Returns the lock expiry when this failure locked it.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_failures: i32,
        lock_until: Timestamp,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        let locked: Option<Option<Timestamp>> = sqlx::query_scalar(
            "UPDATE users SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE WHEN failed_login_count + 1 >= $2 THEN $3
                                    ELSE locked_until END
             WHERE id = $1
             RETURNING CASE WHEN failed_login_count >= $2 THEN locked_until END",
        )
        .bind(id)
        .bind(max_failures)
        .bind(lock_until)
        .fetch_optional(pool)
        .await?;
        Ok(locked.flatten())
    }

    /// Clear the failure counter and stamp `last_login_at`.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET failed_login_count = 0, locked_until = NULL, last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the password hash and lift any lockout.
    pub async fn set_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, failed_login_count = 0, locked_until = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
