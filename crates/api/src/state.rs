use std::sync::Arc;

use beacon_campaigns::EventReconciler;
use beacon_core::error::CoreError;
use beacon_vendors::google_analytics::GaClient;
use beacon_vendors::llm::LlmClient;
use beacon_vendors::mailgun::MailgunClient;
use beacon_vendors::sendgrid::SendGridClient;
use beacon_vendors::sprout_social::SproutClient;

use crate::config::ServerConfig;
use crate::error::AppError;

/// Shared application state handed to every handler via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: beacon_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub vendors: Arc<VendorClients>,
    /// Lives as long as the process so a disabled message-id lookup stays
    /// disabled across requests.
    pub reconciler: Arc<EventReconciler>,
}

/// One client per configured integration, sharing a single connection pool.
#[derive(Default)]
pub struct VendorClients {
    pub sendgrid: Option<SendGridClient>,
    pub mailgun: Option<MailgunClient>,
    pub google_analytics: Option<GaClient>,
    pub sprout: Option<SproutClient>,
    pub llm: Option<LlmClient>,
}

impl VendorClients {
    pub fn from_config(config: &ServerConfig) -> Self {
        let http = reqwest::Client::new();
        let integrations = &config.integrations;
        Self {
            sendgrid: integrations.sendgrid.clone().map(|c| {
                SendGridClient::with_client(http.clone(), c).with_page_size(config.sync.page_size)
            }),
            mailgun: integrations
                .mailgun
                .clone()
                .map(|c| MailgunClient::with_client(http.clone(), c)),
            google_analytics: integrations
                .google_analytics
                .clone()
                .map(|c| GaClient::with_client(http.clone(), c)),
            sprout: integrations
                .sprout
                .clone()
                .map(|c| SproutClient::with_client(http.clone(), c)),
            llm: integrations
                .llm
                .clone()
                .map(|c| LlmClient::with_client(http.clone(), c)),
        }
    }
}

impl AppState {
    pub fn new(pool: beacon_db::DbPool, config: ServerConfig) -> Self {
        let vendors = VendorClients::from_config(&config);
        Self {
            pool,
            config: Arc::new(config),
            vendors: Arc::new(vendors),
            reconciler: Arc::new(EventReconciler::new()),
        }
    }

    pub fn sendgrid(&self) -> Result<&SendGridClient, AppError> {
        self.vendors
            .sendgrid
            .as_ref()
            .ok_or(AppError::Core(CoreError::NotConfigured("SendGrid")))
    }

    pub fn mailgun(&self) -> Result<&MailgunClient, AppError> {
        self.vendors
            .mailgun
            .as_ref()
            .ok_or(AppError::Core(CoreError::NotConfigured("Mailgun")))
    }

    pub fn google_analytics(&self) -> Result<&GaClient, AppError> {
        self.vendors
            .google_analytics
            .as_ref()
            .ok_or(AppError::Core(CoreError::NotConfigured("Google Analytics")))
    }

    pub fn sprout(&self) -> Result<&SproutClient, AppError> {
        self.vendors
            .sprout
            .as_ref()
            .ok_or(AppError::Core(CoreError::NotConfigured("Sprout Social")))
    }

    pub fn llm(&self) -> Result<&LlmClient, AppError> {
        self.vendors
            .llm
            .as_ref()
            .ok_or(AppError::Core(CoreError::NotConfigured("LLM")))
    }
}
