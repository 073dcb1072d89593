use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::features::auth::{
    BackendUserClient, FirebaseIdentityClient, SessionService, SessionStore,
};
use crate::features::reports::{Report, ReportApiClient, ReportStore, ReportWorkflowService};

/// Fully wired client: both stores and the services that drive them
pub struct FloodwatchClient {
    pub config: Config,
    pub session: SessionService,
    pub reports: ReportWorkflowService,
}

impl FloodwatchClient {
    /// Build from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env().map_err(AppError::Config)?;
        Self::new(config)
    }

    pub fn new(config: Config) -> Result<Self> {
        let identity = Arc::new(FirebaseIdentityClient::new(config.identity.clone())?);
        let registry = Arc::new(BackendUserClient::new(config.report_api.clone())?);
        let session = SessionService::new(identity, registry, SessionStore::new());
        tracing::info!("Session service initialized");

        let report_api = Arc::new(ReportApiClient::new(config.report_api.clone())?);
        let reports = ReportWorkflowService::new(report_api, ReportStore::new());
        tracing::info!(
            "Report workflow initialized (report service: {})",
            config.report_api.base_url
        );

        Ok(Self {
            config,
            session,
            reports,
        })
    }

    pub fn session_store(&self) -> &SessionStore {
        self.session.store()
    }

    pub fn report_store(&self) -> &ReportStore {
        self.reports.store()
    }

    /// Absolute URL of a report's image, resolved against the report service
    pub fn image_url(&self, report: &Report) -> Option<String> {
        report.image_url(&self.config.report_api.base_url)
    }
}
