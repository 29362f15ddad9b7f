//! Read access to `roles`. Roles are seeded by migration and never written
//! at runtime.

use sqlx::PgPool;

use crate::models::role::Role;

const SELECT_ROLE: &str = "SELECT r.id, r.name, r.description,
        (SELECT COUNT(*) FROM users u WHERE u.role_id = r.id AND u.is_active)::BIGINT
            AS active_users
     FROM roles r";

pub struct RoleRepo;

impl RoleRepo {
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("{SELECT_ROLE} WHERE r.name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("{SELECT_ROLE} ORDER BY r.id");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }
}
