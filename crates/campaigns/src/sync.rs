//! Single-send synchronizer.
//!
//! Walks the vendor's paginated single-send listing and upserts every usable
//! item into `email_campaigns`, keyed by the vendor id. Re-running with the
//! same vendor data rewrites the same rows.

use std::collections::HashSet;

use async_trait::async_trait;
use beacon_db::models::email_campaign::UpsertEmailCampaign;
use beacon_vendors::sendgrid::{
    parse_vendor_timestamp, SendGridClient, SingleSendItem, SingleSendPage,
};
use beacon_vendors::VendorError;
use futures::future::join_all;
use serde::Serialize;

use crate::error::{StoreError, SyncError};

/// Pages fetched before the loop gives up on a vendor that never stops
/// returning a next cursor.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Upserts in flight at once.
pub const DEFAULT_UPSERT_CONCURRENCY: usize = 10;

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// A paginated source of single sends.
#[async_trait]
pub trait SingleSendSource: Send + Sync {
    /// Fetch the page after `cursor`; `None` fetches the first page.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<SingleSendPage, VendorError>;
}

#[async_trait]
impl SingleSendSource for SendGridClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<SingleSendPage, VendorError> {
        self.list_single_sends(cursor).await
    }
}

/// Where synchronized campaigns are written.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn upsert_campaign(&self, campaign: &UpsertEmailCampaign) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Settings / summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub max_pages: u32,
    pub upsert_concurrency: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            upsert_concurrency: DEFAULT_UPSERT_CONCURRENCY,
        }
    }
}

/// Counts reported back to the caller of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub pages: u32,
    /// Items returned by the vendor, usable or not.
    pub fetched: usize,
    pub upserted: usize,
    /// Items without an id or a name.
    pub skipped: usize,
    /// Items whose upsert returned an error.
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Fetch every page from `source` and upsert its items into `store`.
///
/// The loop ends when a page has no next cursor, when a cursor repeats, or
/// after `settings.max_pages` pages. A page that cannot be fetched aborts the
/// run; rows already written stay written.
pub async fn sync_single_sends(
    source: &dyn SingleSendSource,
    store: &dyn CampaignStore,
    settings: &SyncSettings,
) -> Result<SyncSummary, SyncError> {
    let chunk_size = settings.upsert_concurrency.max(1);
    let mut summary = SyncSummary::default();
    let mut cursor: Option<String> = None;
    let mut seen_cursors: HashSet<String> = HashSet::new();

    loop {
        if summary.pages >= settings.max_pages {
            tracing::warn!(
                pages = summary.pages,
                max_pages = settings.max_pages,
                "Single sends sync stopped at page cap",
            );
            break;
        }

        let page = source.fetch_page(cursor.as_deref()).await?;
        summary.pages += 1;
        summary.fetched += page.items.len();

        let mut valid = Vec::with_capacity(page.items.len());
        for item in &page.items {
            match to_upsert(item) {
                Some(campaign) => valid.push(campaign),
                None => {
                    tracing::debug!(id = ?item.id, "Skipping single send without id or name");
                    summary.skipped += 1;
                }
            }
        }

        for chunk in valid.chunks(chunk_size) {
            let results = join_all(chunk.iter().map(|c| store.upsert_campaign(c))).await;
            for (campaign, result) in chunk.iter().zip(results) {
                match result {
                    Ok(()) => summary.upserted += 1,
                    Err(e) => {
                        tracing::warn!(
                            external_id = %campaign.external_id,
                            error = %e,
                            "Failed to upsert single send",
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        match page.next {
            None => break,
            Some(next) => {
                if !seen_cursors.insert(next.clone()) {
                    tracing::warn!(cursor = %next, "Vendor repeated a page cursor; stopping");
                    break;
                }
                cursor = Some(next);
            }
        }
    }

    tracing::info!(
        pages = summary.pages,
        fetched = summary.fetched,
        upserted = summary.upserted,
        skipped = summary.skipped,
        failed = summary.failed,
        "Single sends sync finished",
    );
    Ok(summary)
}

/// Map a vendor item to an upsert, or `None` when it lacks an id or a name.
///
/// The first category tag is kept; it drives company attribution.
pub fn to_upsert(item: &SingleSendItem) -> Option<UpsertEmailCampaign> {
    let external_id = item.id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let name = item.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some(UpsertEmailCampaign {
        external_id: external_id.to_string(),
        name: name.to_string(),
        status: item.status.clone(),
        category: item.categories.first().cloned(),
        send_at: item.send_at.as_deref().and_then(parse_vendor_timestamp),
        vendor_updated_at: item.updated_at.as_deref().and_then(parse_vendor_timestamp),
    })
}
