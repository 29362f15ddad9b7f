//! Repository for the `social_profiles` table.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::social::{CreateSocialProfile, SocialProfile};

const COLUMNS: &str = "id, company_id, sprout_profile_id, network, name, created_at, updated_at";

pub struct SocialProfileRepo;

impl SocialProfileRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSocialProfile,
    ) -> Result<SocialProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO social_profiles (company_id, sprout_profile_id, network, name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SocialProfile>(&query)
            .bind(input.company_id)
            .bind(input.sprout_profile_id)
            .bind(&input.network)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// List profiles, optionally restricted to one company.
    pub async fn list(
        pool: &PgPool,
        company_id: Option<DbId>,
    ) -> Result<Vec<SocialProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM social_profiles
             WHERE ($1::BIGINT IS NULL OR company_id = $1)
             ORDER BY company_id ASC, network ASC, name ASC"
        );
        sqlx::query_as::<_, SocialProfile>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM social_profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
