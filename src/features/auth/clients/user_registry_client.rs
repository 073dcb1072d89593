use async_trait::async_trait;

use crate::core::config::ReportApiConfig;
use crate::core::error::Result;
use crate::core::http::{build_http_client, send_request};
use crate::features::auth::dtos::{UserLoginDto, UserRegistrationDto};
use crate::shared::constants::{USERS_LOGIN_PATH, USERS_REGISTER_PATH};

/// Backend bookkeeping of users signed in through the identity provider
#[async_trait]
pub trait UserRegistry: Send + Sync {
    async fn record_login(&self, dto: &UserLoginDto) -> Result<()>;

    async fn record_registration(&self, dto: &UserRegistrationDto) -> Result<()>;
}

/// Client for the report service's user endpoints
pub struct BackendUserClient {
    config: ReportApiConfig,
    http_client: reqwest::Client,
}

impl BackendUserClient {
    pub fn new(config: ReportApiConfig) -> Result<Self> {
        let http_client = build_http_client(&config.user_agent, config.request_timeout)?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl UserRegistry for BackendUserClient {
    async fn record_login(&self, dto: &UserLoginDto) -> Result<()> {
        let url = self.config.endpoint(USERS_LOGIN_PATH);
        send_request(self.http_client.post(&url).json(dto), "record login").await?;
        tracing::debug!("Login recorded for user: {}", dto.uid);
        Ok(())
    }

    async fn record_registration(&self, dto: &UserRegistrationDto) -> Result<()> {
        let url = self.config.endpoint(USERS_REGISTER_PATH);
        send_request(self.http_client.post(&url).json(dto), "record registration").await?;
        tracing::info!("Registration recorded for user: {}", dto.uid);
        Ok(())
    }
}
