//! PostgreSQL implementations of the campaign seams.

use async_trait::async_trait;
use beacon_core::types::DbId;
use beacon_db::models::email_campaign::UpsertEmailCampaign;
use beacon_db::repositories::{EmailCampaignRepo, EmailRecipientRepo};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::reconciler::{EventHit, RecipientStore};
use crate::sync::CampaignStore;

#[async_trait]
impl CampaignStore for PgPool {
    async fn upsert_campaign(&self, campaign: &UpsertEmailCampaign) -> Result<(), StoreError> {
        EmailCampaignRepo::upsert_by_external_id(self, campaign).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipientStore for PgPool {
    async fn campaign_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<DbId>, StoreError> {
        Ok(EmailCampaignRepo::find_by_external_id(self, external_id)
            .await?
            .map(|c| c.id))
    }

    async fn campaign_by_name(&self, name: &str) -> Result<Option<DbId>, StoreError> {
        Ok(EmailCampaignRepo::find_by_name(self, name).await?.map(|c| c.id))
    }

    async fn campaign_by_category(&self, category: &str) -> Result<Option<DbId>, StoreError> {
        Ok(EmailCampaignRepo::find_by_category(self, category)
            .await?
            .map(|c| c.id))
    }

    async fn recipient_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<DbId>, StoreError> {
        Ok(EmailRecipientRepo::find_by_message_id(self, message_id)
            .await?
            .map(|r| r.id))
    }

    async fn recipient_by_campaign_email(
        &self,
        campaign_id: DbId,
        email: &str,
    ) -> Result<Option<DbId>, StoreError> {
        Ok(
            EmailRecipientRepo::find_by_campaign_email(self, campaign_id, email)
                .await?
                .map(|r| r.id),
        )
    }

    async fn create_recipient(
        &self,
        campaign_id: DbId,
        email: &str,
        hit: &EventHit,
        with_message_id: bool,
    ) -> Result<DbId, StoreError> {
        Ok(EmailRecipientRepo::create(
            self,
            campaign_id,
            email,
            hit.kind,
            hit.at,
            hit.message_id.as_deref(),
            with_message_id,
        )
        .await?)
    }

    async fn increment_recipient(
        &self,
        recipient_id: DbId,
        hit: &EventHit,
        with_message_id: bool,
    ) -> Result<(), StoreError> {
        let updated = EmailRecipientRepo::increment(
            self,
            recipient_id,
            hit.kind,
            hit.at,
            hit.message_id.as_deref(),
            with_message_id,
        )
        .await?;
        if updated {
            Ok(())
        } else {
            Err(StoreError::Other(format!("recipient {recipient_id} disappeared")))
        }
    }
}
