//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod company_repo;
pub mod conversation_repo;
pub mod direct_mail_repo;
pub mod email_campaign_repo;
pub mod email_recipient_repo;
pub mod ga_account_repo;
pub mod ga_metric_repo;
pub mod mailgun_send_repo;
pub mod notification_repo;
pub mod role_repo;
pub mod session_repo;
pub mod social_metric_repo;
pub mod social_profile_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use company_repo::CompanyRepo;
pub use conversation_repo::ConversationRepo;
pub use direct_mail_repo::DirectMailRepo;
pub use email_campaign_repo::EmailCampaignRepo;
pub use email_recipient_repo::EmailRecipientRepo;
pub use ga_account_repo::GaAccountRepo;
pub use ga_metric_repo::GaMetricRepo;
pub use mailgun_send_repo::MailgunSendRepo;
pub use notification_repo::NotificationRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use social_metric_repo::SocialMetricRepo;
pub use social_profile_repo::SocialProfileRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
