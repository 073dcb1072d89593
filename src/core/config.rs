use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub report_api: ReportApiConfig,
    pub identity: IdentityConfig,
}

/// Remote report service settings
#[derive(Debug, Clone)]
pub struct ReportApiConfig {
    /// Service root, also used to resolve relative image paths
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

/// Identity provider settings
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    /// Web API key sent as the `key` query parameter
    pub api_key: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            report_api: ReportApiConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
        })
    }
}

fn default_user_agent() -> String {
    format!("FloodwatchClient/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_timeout(var: &str, default_secs: u64) -> Result<Duration, String> {
    let secs = env::var(var)
        .unwrap_or_else(|_| default_secs.to_string())
        .parse::<u64>()
        .map_err(|_| format!("{} must be a valid number", var))?;
    if secs == 0 {
        return Err(format!("{} must be greater than zero", var));
    }
    Ok(Duration::from_secs(secs))
}

impl ReportApiConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:3000";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("REPORT_API_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        let request_timeout = parse_timeout("REPORT_API_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let user_agent = env::var("CLIENT_USER_AGENT").unwrap_or_else(|_| default_user_agent());

        Ok(Self::new(base_url, request_timeout, user_agent))
    }

    pub fn new(base_url: impl Into<String>, request_timeout: Duration, user_agent: String) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            request_timeout,
            user_agent,
        }
    }

    /// Config pointing at `base_url` with default timeout and user agent
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(
            base_url,
            Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            default_user_agent(),
        )
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl IdentityConfig {
    const DEFAULT_BASE_URL: &'static str = "https://identitytoolkit.googleapis.com";
    const DEFAULT_TIMEOUT_SECS: u64 = 15;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("IDENTITY_API_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        let api_key =
            env::var("IDENTITY_API_KEY").map_err(|_| "IDENTITY_API_KEY must be set".to_string())?;
        let request_timeout = parse_timeout("IDENTITY_API_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let user_agent = env::var("CLIENT_USER_AGENT").unwrap_or_else(|_| default_user_agent());

        Ok(Self {
            base_url: normalize_base_url(base_url),
            api_key,
            request_timeout,
            user_agent,
        })
    }

    /// Config pointing at `base_url` with default timeout and user agent
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
