use beacon_campaigns::SyncSettings;
use beacon_vendors::google_analytics::GaConfig;
use beacon_vendors::llm::LlmConfig;
use beacon_vendors::mailgun::MailgunConfig;
use beacon_vendors::sendgrid::{SendGridConfig, DEFAULT_PAGE_SIZE};
use beacon_vendors::sprout_social::SproutConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Every vendor integration is optional; endpoints that need a missing one
/// answer 503.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks (default: `10`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub sync: SyncConfig,
    /// Shared secret expected in the `token` query parameter of the
    /// SendGrid event webhook. `None` accepts every post.
    pub sendgrid_webhook_token: Option<String>,
    pub integrations: Integrations,
}

/// Single-send synchronizer tuning.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// `page_size` sent to the vendor listing.
    pub page_size: u32,
    pub settings: SyncSettings,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            settings: SyncSettings::default(),
        }
    }
}

/// Vendor credentials, each present only when fully configured.
#[derive(Debug, Clone, Default)]
pub struct Integrations {
    pub sendgrid: Option<SendGridConfig>,
    pub mailgun: Option<MailgunConfig>,
    pub google_analytics: Option<GaConfig>,
    pub sprout: Option<SproutConfig>,
    pub llm: Option<LlmConfig>,
}

impl Integrations {
    pub fn from_env() -> Self {
        Self {
            sendgrid: SendGridConfig::from_env(),
            mailgun: MailgunConfig::from_env(),
            google_analytics: GaConfig::from_env(),
            sprout: SproutConfig::from_env(),
            llm: LlmConfig::from_env(),
        }
    }

    /// Names of the configured integrations, for the startup log.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("sendgrid", self.sendgrid.is_some()),
            ("mailgun", self.mailgun.is_some()),
            ("google_analytics", self.google_analytics.is_some()),
            ("sprout_social", self.sprout.is_some()),
            ("llm", self.llm.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `10`                    |
    /// | `SYNC_PAGE_SIZE`          | `100`                   |
    /// | `SYNC_UPSERT_CONCURRENCY` | `10`                    |
    /// | `SYNC_MAX_PAGES`          | `500`                   |
    /// | `SENDGRID_WEBHOOK_TOKEN`  | unset                   |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`]; vendor settings by
    /// each vendor config's `from_env`.
    ///
    /// # Panics
    ///
    /// Panics when a numeric variable does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = SyncConfig::default();
        let sync = SyncConfig {
            page_size: env_parse("SYNC_PAGE_SIZE", defaults.page_size),
            settings: SyncSettings {
                max_pages: env_parse("SYNC_MAX_PAGES", defaults.settings.max_pages),
                upsert_concurrency: env_parse(
                    "SYNC_UPSERT_CONCURRENCY",
                    defaults.settings.upsert_concurrency,
                ),
            },
        };

        let sendgrid_webhook_token = std::env::var("SENDGRID_WEBHOOK_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT_SECS", 10),
            jwt: JwtConfig::from_env(),
            sync,
            sendgrid_webhook_token,
            integrations: Integrations::from_env(),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid number: {e}")),
        Err(_) => default,
    }
}
