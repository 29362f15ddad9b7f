//! Webhook event reconciler.
//!
//! Folds vendor delivery/engagement events into `email_recipients`
//! counters. Each event is resolved to a campaign (by id, then name, then
//! category tag) and a recipient (by message id, then by campaign and
//! email). Known recipients get their counter bumped. Unknown ones are
//! created when the event carries an email.
//!
//! The `message_id` column arrived in a later migration. The first time a
//! statement fails because the column is missing, message-id matching is
//! switched off for the lifetime of the reconciler and the statement is
//! retried without it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use beacon_core::email_events::{normalize_email, normalize_message_id, EmailEventKind};
use beacon_core::types::{DbId, Timestamp};
use beacon_vendors::sendgrid::VendorEvent;
use chrono::Utc;
use serde::Serialize;

use crate::error::StoreError;

/// Campaign and recipient lookups and writes the reconciler needs.
///
/// Methods taking `with_message_id` must not reference the `message_id`
/// column when it is `false`.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    async fn campaign_by_external_id(&self, external_id: &str)
        -> Result<Option<DbId>, StoreError>;

    async fn campaign_by_name(&self, name: &str) -> Result<Option<DbId>, StoreError>;

    async fn campaign_by_category(&self, category: &str) -> Result<Option<DbId>, StoreError>;

    async fn recipient_by_message_id(&self, message_id: &str)
        -> Result<Option<DbId>, StoreError>;

    async fn recipient_by_campaign_email(
        &self,
        campaign_id: DbId,
        email: &str,
    ) -> Result<Option<DbId>, StoreError>;

    /// Insert a recipient with the hit's counter at 1.
    async fn create_recipient(
        &self,
        campaign_id: DbId,
        email: &str,
        hit: &EventHit,
        with_message_id: bool,
    ) -> Result<DbId, StoreError>;

    /// Bump the hit's counter, stamp the last event, and backfill a null
    /// message id when `with_message_id` is set.
    async fn increment_recipient(
        &self,
        recipient_id: DbId,
        hit: &EventHit,
        with_message_id: bool,
    ) -> Result<(), StoreError>;
}

/// The parts of an event that get written to a recipient row.
#[derive(Debug, Clone, PartialEq)]
pub struct EventHit {
    pub kind: EmailEventKind,
    pub at: Timestamp,
    pub message_id: Option<String>,
}

/// Outcome counts for one webhook batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub received: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Updated,
    Skipped(&'static str),
}

pub struct EventReconciler {
    message_id_enabled: AtomicBool,
}

impl Default for EventReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReconciler {
    pub fn new() -> Self {
        Self {
            message_id_enabled: AtomicBool::new(true),
        }
    }

    /// Whether message-id matching is still in use.
    pub fn message_id_enabled(&self) -> bool {
        self.message_id_enabled.load(Ordering::Relaxed)
    }

    /// Apply a batch of events, one at a time.
    ///
    /// Never fails as a whole: an event that cannot be applied is logged and
    /// counted as skipped.
    pub async fn reconcile(
        &self,
        store: &dyn RecipientStore,
        events: &[VendorEvent],
    ) -> ReconcileSummary {
        let mut summary = ReconcileSummary {
            received: events.len(),
            ..Default::default()
        };

        for event in events {
            match self.apply(store, event).await {
                Ok(Outcome::Created) => summary.created += 1,
                Ok(Outcome::Updated) => summary.updated += 1,
                Ok(Outcome::Skipped(reason)) => {
                    tracing::debug!(event = ?event.event, reason, "Skipping webhook event");
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        event = ?event.event,
                        email = ?event.email,
                        error = %e,
                        "Failed to reconcile webhook event",
                    );
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            received = summary.received,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "Webhook batch reconciled",
        );
        summary
    }

    async fn apply(
        &self,
        store: &dyn RecipientStore,
        event: &VendorEvent,
    ) -> Result<Outcome, StoreError> {
        let Some(kind) = event.event.as_deref().and_then(EmailEventKind::from_vendor_tag) else {
            return Ok(Outcome::Skipped("unsupported event type"));
        };

        let email = event.email.as_deref().and_then(normalize_email);
        let message_id = event.sg_message_id.as_deref().and_then(normalize_message_id);
        if email.is_none() && message_id.is_none() {
            return Ok(Outcome::Skipped("no email or message id"));
        }

        let Some(campaign_id) = resolve_campaign(store, event).await? else {
            return Ok(Outcome::Skipped("no matching campaign"));
        };

        let hit = EventHit {
            kind,
            at: event.occurred_at().unwrap_or_else(Utc::now),
            message_id,
        };

        let existing = self
            .find_recipient(store, campaign_id, email.as_deref(), &hit)
            .await?;
        if let Some(recipient_id) = existing {
            self.increment(store, recipient_id, &hit).await?;
            return Ok(Outcome::Updated);
        }

        let Some(email) = email else {
            return Ok(Outcome::Skipped("unknown message id and no email"));
        };

        match self.create(store, campaign_id, &email, &hit).await {
            Ok(_) => Ok(Outcome::Created),
            Err(StoreError::UniqueViolation(_)) => {
                // Another delivery of the same event created the row first.
                let recipient_id = store
                    .recipient_by_campaign_email(campaign_id, &email)
                    .await?
                    .ok_or_else(|| {
                        StoreError::Other(format!(
                            "recipient {email} in campaign {campaign_id} conflicted but is not readable"
                        ))
                    })?;
                self.increment(store, recipient_id, &hit).await?;
                Ok(Outcome::Updated)
            }
            Err(e) => Err(e),
        }
    }

    async fn find_recipient(
        &self,
        store: &dyn RecipientStore,
        campaign_id: DbId,
        email: Option<&str>,
        hit: &EventHit,
    ) -> Result<Option<DbId>, StoreError> {
        if let Some(message_id) = hit.message_id.as_deref() {
            let by_message_id = self
                .with_message_id_fallback(move |enabled| async move {
                    if enabled {
                        store.recipient_by_message_id(message_id).await
                    } else {
                        Ok(None)
                    }
                })
                .await?;
            if by_message_id.is_some() {
                return Ok(by_message_id);
            }
        }
        match email {
            Some(email) => store.recipient_by_campaign_email(campaign_id, email).await,
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        store: &dyn RecipientStore,
        campaign_id: DbId,
        email: &str,
        hit: &EventHit,
    ) -> Result<DbId, StoreError> {
        self.with_message_id_fallback(move |enabled| {
            store.create_recipient(campaign_id, email, hit, enabled)
        })
        .await
    }

    async fn increment(
        &self,
        store: &dyn RecipientStore,
        recipient_id: DbId,
        hit: &EventHit,
    ) -> Result<(), StoreError> {
        self.with_message_id_fallback(move |enabled| {
            store.increment_recipient(recipient_id, hit, enabled)
        })
        .await
    }

    /// Run `op` with message-id support as currently configured. If it
    /// fails on a missing column while support is on, switch support off
    /// and run it once more without.
    async fn with_message_id_fallback<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: Fn(bool) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let enabled = self.message_id_enabled();
        match op(enabled).await {
            Err(StoreError::MissingColumn(detail)) if enabled => {
                if self.message_id_enabled.swap(false, Ordering::Relaxed) {
                    tracing::warn!(
                        detail = %detail,
                        "email_recipients.message_id is missing; disabling message-id matching",
                    );
                }
                op(false).await
            }
            other => other,
        }
    }
}

/// Campaign lookup: external ids, then names, then category tags.
async fn resolve_campaign(
    store: &dyn RecipientStore,
    event: &VendorEvent,
) -> Result<Option<DbId>, StoreError> {
    for external_id in event.campaign_ids() {
        if let Some(id) = store.campaign_by_external_id(external_id).await? {
            return Ok(Some(id));
        }
    }
    for name in event.campaign_names() {
        if let Some(id) = store.campaign_by_name(name).await? {
            return Ok(Some(id));
        }
    }
    for category in &event.category {
        if let Some(id) = store.campaign_by_category(category).await? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: DbId,
        campaign_id: DbId,
        email: String,
        message_id: Option<String>,
        counts: HashMap<EmailEventKind, i32>,
        last_event: Option<EmailEventKind>,
    }

    /// In-memory store with switches for the schema and race scenarios.
    struct FakeStore {
        campaigns_by_id: HashMap<String, DbId>,
        campaigns_by_name: HashMap<String, DbId>,
        campaigns_by_category: HashMap<String, DbId>,
        rows: Mutex<Vec<Row>>,
        has_message_id_column: bool,
        /// Simulate a concurrent writer winning the next insert.
        race_next_create: AtomicBool,
        missing_column_errors: AtomicUsize,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                campaigns_by_id: HashMap::from([("ss-1".to_string(), 10)]),
                campaigns_by_name: HashMap::from([("Spring Sale".to_string(), 20)]),
                campaigns_by_category: HashMap::from([("acme".to_string(), 30)]),
                rows: Mutex::new(Vec::new()),
                has_message_id_column: true,
                race_next_create: AtomicBool::new(false),
                missing_column_errors: AtomicUsize::new(0),
            }
        }

        fn without_message_id_column() -> Self {
            Self {
                has_message_id_column: false,
                ..Self::new()
            }
        }

        fn check_column(&self, with_message_id: bool) -> Result<(), StoreError> {
            if with_message_id && !self.has_message_id_column {
                self.missing_column_errors.fetch_add(1, Ordering::SeqCst);
                return Err(StoreError::MissingColumn("message_id".into()));
            }
            Ok(())
        }

        fn rows(&self) -> Vec<Row> {
            self.rows.lock().unwrap().clone()
        }

        fn insert(&self, campaign_id: DbId, email: &str, hit: &EventHit, with_message_id: bool) -> DbId {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as DbId + 1;
            rows.push(Row {
                id,
                campaign_id,
                email: email.to_string(),
                message_id: if with_message_id { hit.message_id.clone() } else { None },
                counts: HashMap::from([(hit.kind, 1)]),
                last_event: Some(hit.kind),
            });
            id
        }
    }

    #[async_trait]
    impl RecipientStore for FakeStore {
        async fn campaign_by_external_id(&self, external_id: &str) -> Result<Option<DbId>, StoreError> {
            Ok(self.campaigns_by_id.get(external_id).copied())
        }

        async fn campaign_by_name(&self, name: &str) -> Result<Option<DbId>, StoreError> {
            Ok(self.campaigns_by_name.get(name).copied())
        }

        async fn campaign_by_category(&self, category: &str) -> Result<Option<DbId>, StoreError> {
            Ok(self.campaigns_by_category.get(category).copied())
        }

        async fn recipient_by_message_id(&self, message_id: &str) -> Result<Option<DbId>, StoreError> {
            self.check_column(true)?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.message_id.as_deref() == Some(message_id))
                .map(|r| r.id))
        }

        async fn recipient_by_campaign_email(
            &self,
            campaign_id: DbId,
            email: &str,
        ) -> Result<Option<DbId>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.campaign_id == campaign_id && r.email == email)
                .map(|r| r.id))
        }

        async fn create_recipient(
            &self,
            campaign_id: DbId,
            email: &str,
            hit: &EventHit,
            with_message_id: bool,
        ) -> Result<DbId, StoreError> {
            self.check_column(with_message_id)?;
            if self.race_next_create.swap(false, Ordering::SeqCst) {
                // The competing writer's row lands, then our insert conflicts.
                let rival = EventHit {
                    kind: EmailEventKind::Delivered,
                    ..hit.clone()
                };
                self.insert(campaign_id, email, &rival, with_message_id);
                return Err(StoreError::UniqueViolation("uq_email_recipients_campaign_email".into()));
            }
            if self.recipient_by_campaign_email(campaign_id, email).await?.is_some() {
                return Err(StoreError::UniqueViolation("uq_email_recipients_campaign_email".into()));
            }
            Ok(self.insert(campaign_id, email, hit, with_message_id))
        }

        async fn increment_recipient(
            &self,
            recipient_id: DbId,
            hit: &EventHit,
            with_message_id: bool,
        ) -> Result<(), StoreError> {
            self.check_column(with_message_id)?;
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == recipient_id)
                .ok_or_else(|| StoreError::Other("no such recipient".into()))?;
            *row.counts.entry(hit.kind).or_insert(0) += 1;
            row.last_event = Some(hit.kind);
            if with_message_id && row.message_id.is_none() {
                row.message_id = hit.message_id.clone();
            }
            Ok(())
        }
    }

    fn event(kind: &str, email: Option<&str>, message_id: Option<&str>) -> VendorEvent {
        VendorEvent {
            event: Some(kind.to_string()),
            email: email.map(str::to_string),
            sg_message_id: message_id.map(str::to_string),
            singlesend_id: Some("ss-1".into()),
            timestamp: Some(1_700_000_000),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn events_without_email_or_message_id_are_not_persisted() {
        let store = FakeStore::new();
        let reconciler = EventReconciler::new();

        let summary = reconciler
            .reconcile(&store, &[event("open", None, None), event("open", Some("   "), Some(""))])
            .await;

        assert_eq!(summary.received, 2);
        assert_eq!(summary.skipped, 2);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn unsupported_tags_and_unknown_campaigns_are_skipped() {
        let store = FakeStore::new();
        let reconciler = EventReconciler::new();
        let mut orphan = event("open", Some("a@x.com"), None);
        orphan.singlesend_id = Some("unknown".into());

        let summary = reconciler
            .reconcile(&store, &[event("processed", Some("a@x.com"), None), orphan])
            .await;

        assert_eq!(summary.skipped, 2);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn first_event_creates_and_later_events_increment() {
        let store = FakeStore::new();
        let reconciler = EventReconciler::new();

        let summary = reconciler
            .reconcile(
                &store,
                &[
                    event("delivered", Some("Jane@X.com"), None),
                    event("open", Some("jane@x.com"), None),
                    event("open", Some("jane@x.com"), None),
                ],
            )
            .await;

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 2);
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "jane@x.com");
        assert_eq!(rows[0].counts[&EmailEventKind::Delivered], 1);
        assert_eq!(rows[0].counts[&EmailEventKind::Open], 2);
        assert_eq!(rows[0].last_event, Some(EmailEventKind::Open));
    }

    #[tokio::test]
    async fn campaign_falls_back_to_name_then_category() {
        let store = FakeStore::new();
        let reconciler = EventReconciler::new();

        let by_name = VendorEvent {
            event: Some("click".into()),
            email: Some("a@x.com".into()),
            singlesend_id: Some("unknown".into()),
            singlesend_name: Some("Spring Sale".into()),
            ..Default::default()
        };
        let by_category = VendorEvent {
            event: Some("click".into()),
            email: Some("b@x.com".into()),
            category: vec!["nope".into(), "acme".into()],
            ..Default::default()
        };

        reconciler.reconcile(&store, &[by_name, by_category]).await;

        let rows = store.rows();
        assert_eq!(rows[0].campaign_id, 20);
        assert_eq!(rows[1].campaign_id, 30);
    }

    #[tokio::test]
    async fn unique_race_on_create_falls_back_to_update() {
        let store = FakeStore::new();
        store.race_next_create.store(true, Ordering::SeqCst);
        let reconciler = EventReconciler::new();

        let summary = reconciler
            .reconcile(&store, &[event("open", Some("a@x.com"), None)])
            .await;

        assert_eq!(summary.created, 0);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 0);
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].counts[&EmailEventKind::Open], 1);
    }

    #[tokio::test]
    async fn message_id_matches_without_email_and_is_backfilled() {
        let store = FakeStore::new();
        let reconciler = EventReconciler::new();

        reconciler
            .reconcile(&store, &[event("delivered", Some("a@x.com"), None)])
            .await;
        assert_eq!(store.rows()[0].message_id, None);

        let summary = reconciler
            .reconcile(
                &store,
                &[
                    event("open", Some("a@x.com"), Some("msg123.filterdrecv-1")),
                    event("click", None, Some("msg123.filterdrecv-2")),
                ],
            )
            .await;

        assert_eq!(summary.updated, 2);
        let rows = store.rows();
        assert_eq!(rows[0].message_id.as_deref(), Some("msg123"));
        assert_eq!(rows[0].counts[&EmailEventKind::Click], 1);
    }

    #[tokio::test]
    async fn unknown_message_id_without_email_is_skipped() {
        let store = FakeStore::new();
        let reconciler = EventReconciler::new();

        let summary = reconciler
            .reconcile(&store, &[event("open", None, Some("nobody"))])
            .await;

        assert_eq!(summary.skipped, 1);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn missing_column_disables_message_ids_once() {
        let store = FakeStore::without_message_id_column();
        let reconciler = EventReconciler::new();

        let first = reconciler
            .reconcile(&store, &[event("delivered", Some("a@x.com"), Some("m1"))])
            .await;
        assert_eq!(first.created, 1);
        assert!(!reconciler.message_id_enabled());
        assert_eq!(store.missing_column_errors.load(Ordering::SeqCst), 1);

        let second = reconciler
            .reconcile(
                &store,
                &[
                    event("open", Some("a@x.com"), Some("m1")),
                    event("delivered", Some("b@x.com"), Some("m2")),
                ],
            )
            .await;
        assert_eq!(second.updated, 1);
        assert_eq!(second.created, 1);
        assert_eq!(store.missing_column_errors.load(Ordering::SeqCst), 1);
        assert!(store.rows().iter().all(|r| r.message_id.is_none()));
    }
}
