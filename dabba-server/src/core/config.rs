use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};

/// Used only when `ENVIRONMENT=development` and `JWT_SECRET` is unset
const DEV_JWT_SECRET: &str = "dabba-development-jwt-secret-change-me";

/// Signs mock checkouts when no provider credentials are configured
pub const DEV_PAYMENT_SECRET: &str = "dabba-development-payment-secret";

/// Payment provider settings
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub api_base: String,
    pub currency: String,
    pub timeout_ms: u64,
}

impl PaymentConfig {
    /// Both credentials present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.key_id, &self.key_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// HMAC key for checkout signatures
    pub fn signing_secret(&self) -> &str {
        self.key_secret.as_deref().unwrap_or(DEV_PAYMENT_SECRET)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Relay endpoint; log-only when unset
    pub webhook_url: Option<String>,
    pub timeout_ms: u64,
}

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_PORT | 5000 | HTTP listen port |
/// | DATA_DIR | ./data | directory holding `dabba.redb` |
/// | JWT_SECRET | dev placeholder | principal token secret |
/// | PAYMENT_KEY_ID / PAYMENT_KEY_SECRET | unset (mock gateway) | provider credentials |
/// | PAYMENT_API_BASE | https://api.razorpay.com/v1 | provider REST base |
/// | PAYMENT_CURRENCY | INR | currency code |
/// | PAYMENT_TIMEOUT_MS | 10000 | provider call timeout |
/// | NOTIFY_WEBHOOK_URL | unset (log only) | notification relay |
/// | NOTIFY_TIMEOUT_MS | 5000 | notification timeout |
/// | BUSINESS_TIMEZONE | Asia/Kolkata | calendar for "today" |
/// | LOG_LEVEL / LOG_DIR | info / unset | logging |
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_port: u16,
    pub data_dir: PathBuf,
    pub jwt: JwtConfig,
    /// Whether `JWT_SECRET` was actually set
    jwt_secret_configured: bool,
    pub payment: PaymentConfig,
    pub notify: NotifyConfig,
    pub business_timezone: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let jwt_secret = env_opt("JWT_SECRET");
        let timezone = std::env::var("BUSINESS_TIMEZONE").unwrap_or_default();

        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            http_port: env_parse("HTTP_PORT", 5000),
            data_dir: PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into())),
            jwt_secret_configured: jwt_secret.is_some(),
            jwt: JwtConfig {
                secret: jwt_secret.unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
                expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", 1440),
            },
            payment: PaymentConfig {
                key_id: env_opt("PAYMENT_KEY_ID"),
                key_secret: env_opt("PAYMENT_KEY_SECRET"),
                api_base: std::env::var("PAYMENT_API_BASE")
                    .unwrap_or_else(|_| "https://api.razorpay.com/v1".into()),
                currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".into()),
                timeout_ms: env_parse("PAYMENT_TIMEOUT_MS", 10_000),
            },
            notify: NotifyConfig {
                webhook_url: env_opt("NOTIFY_WEBHOOK_URL"),
                timeout_ms: env_parse("NOTIFY_TIMEOUT_MS", 5_000),
            },
            business_timezone: timezone.parse().unwrap_or(chrono_tz::Asia::Kolkata),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// Development defaults with fixed secrets and no provider credentials
    pub fn for_development(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            data_dir: data_dir.into(),
            jwt: JwtConfig {
                secret: DEV_JWT_SECRET.to_string(),
                expiration_minutes: 60,
            },
            jwt_secret_configured: false,
            payment: PaymentConfig {
                key_id: None,
                key_secret: None,
                api_base: "https://api.razorpay.com/v1".into(),
                currency: "INR".into(),
                timeout_ms: 1_000,
            },
            notify: NotifyConfig {
                webhook_url: None,
                timeout_ms: 1_000,
            },
            business_timezone: chrono_tz::Asia::Kolkata,
            log_level: "debug".into(),
            log_dir: None,
        }
    }

    /// Refuse to start outside development without real secrets
    pub fn require_secrets(&self) -> Result<()> {
        if self.is_development() {
            return Ok(());
        }
        if !self.jwt_secret_configured {
            return Err(ServerError::Config("JWT_SECRET must be set".into()));
        }
        if self.payment.credentials().is_none() {
            return Err(ServerError::Config(
                "PAYMENT_KEY_ID and PAYMENT_KEY_SECRET must be set".into(),
            ));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("dabba.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
