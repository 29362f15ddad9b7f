//! Repository for the `ga_accounts` table.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::ga::{CreateGaAccount, GaAccount, UpdateGaAccount};

const COLUMNS: &str = "id, company_id, property_id, display_name, is_active, created_at, updated_at";

/// Google Analytics property registrations.
pub struct GaAccountRepo;

impl GaAccountRepo {
    pub async fn create(pool: &PgPool, input: &CreateGaAccount) -> Result<GaAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO ga_accounts (company_id, property_id, display_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GaAccount>(&query)
            .bind(input.company_id)
            .bind(&input.property_id)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// List accounts, optionally restricted to one company.
    pub async fn list(
        pool: &PgPool,
        company_id: Option<DbId>,
    ) -> Result<Vec<GaAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ga_accounts
             WHERE ($1::BIGINT IS NULL OR company_id = $1)
             ORDER BY company_id ASC, display_name ASC"
        );
        sqlx::query_as::<_, GaAccount>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_active_for_company(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<GaAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ga_accounts
             WHERE company_id = $1 AND is_active = true
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, GaAccount>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGaAccount,
    ) -> Result<Option<GaAccount>, sqlx::Error> {
        let query = format!(
            "UPDATE ga_accounts SET
                display_name = COALESCE($2, display_name),
                is_active = COALESCE($3, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GaAccount>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an account and its daily metrics. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ga_accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
