//! Email campaign bookkeeping: mirroring vendor single sends into
//! `email_campaigns` and folding delivery webhooks into per-recipient
//! counters.
//!
//! Both flows are written against small store/source traits so they can be
//! exercised without a database or network; [`pg`] provides the PostgreSQL
//! implementations used by the server.

pub mod error;
pub mod pg;
pub mod reconciler;
pub mod sync;

pub use error::{StoreError, SyncError};
pub use reconciler::{EventHit, EventReconciler, ReconcileSummary, RecipientStore};
pub use sync::{sync_single_sends, CampaignStore, SingleSendSource, SyncSettings, SyncSummary};
