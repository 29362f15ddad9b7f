//! Repository for the `companies` table.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::{Company, CreateCompany, UpdateCompany};

const COLUMNS: &str =
    "id, name, website, account_rep_id, email_category, is_active, created_at, updated_at";

/// Provides CRUD operations for client companies.
pub struct CompanyRepo;

impl CompanyRepo {
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (name, website, account_rep_id, email_category)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .bind(&input.website)
            .bind(input.account_rep_id)
            .bind(&input.email_category)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every company, active first, then by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY is_active DESC, name ASC");
        sqlx::query_as::<_, Company>(&query).fetch_all(pool).await
    }

    /// Active companies whose account rep is `rep_id`.
    pub async fn list_for_rep(pool: &PgPool, rep_id: DbId) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companies
             WHERE account_rep_id = $1 AND is_active = true
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(rep_id)
            .fetch_all(pool)
            .await
    }

    /// Update a company. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCompany,
    ) -> Result<Option<Company>, sqlx::Error> {
        let query = format!(
            "UPDATE companies SET
                name = COALESCE($2, name),
                website = COALESCE($3, website),
                account_rep_id = COALESCE($4, account_rep_id),
                email_category = COALESCE($5, email_category),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.website)
            .bind(input.account_rep_id)
            .bind(&input.email_category)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a company. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE companies SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
