use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::UserSession;
use crate::features::reports::clients::ReportApi;
use crate::features::reports::dtos::{ImageUpload, ReportDraft};
use crate::features::reports::models::Report;
use crate::features::reports::store::{ReportStore, RequestTicket};

/// Drives the report service and mirrors each outcome into the store.
///
/// Every operation marks the store in flight, then either applies the
/// matching store mutation or records the failure message. Failures are also
/// returned so the caller can acknowledge them.
pub struct ReportWorkflowService {
    api: Arc<dyn ReportApi>,
    store: ReportStore,
}

impl ReportWorkflowService {
    pub fn new(api: Arc<dyn ReportApi>, store: ReportStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Load every report for the dashboard.
    ///
    /// Returns the collection the store holds afterwards, which is the
    /// previous one when a newer local change made this response stale.
    pub async fn load_dashboard(&self) -> Result<Vec<Report>> {
        let ticket = self.store.issue_ticket();
        self.store.set_loading(true);

        match self.api.list_all().await {
            Ok(reports) => Ok(self.apply_list(ticket, reports)),
            Err(e) => Err(self.fail("load reports", e)),
        }
    }

    /// Load the reports owned by the signed-in user
    pub async fn load_user_reports(&self, session: &UserSession) -> Result<Vec<Report>> {
        let ticket = self.store.issue_ticket();
        self.store.set_loading(true);

        match self.api.list_for_user(&session.uid).await {
            Ok(reports) => Ok(self.apply_list(ticket, reports)),
            Err(e) => Err(self.fail("load user reports", e)),
        }
    }

    /// Submit a new report with its photo and append the created record
    pub async fn create_report(
        &self,
        session: &UserSession,
        draft: &ReportDraft,
        image: ImageUpload,
    ) -> Result<Report> {
        self.store.set_loading(true);

        if let Err(e) = draft.check() {
            return Err(self.fail("create report", e));
        }

        let payload = draft.to_payload(session);
        let created = match self.api.create(&payload, Some(&image)).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail("create report", e)),
        };

        let report = Report::new(
            created.id,
            payload.into_record(created.image, created.created_at),
        );
        tracing::info!("Report {} submitted by {}", report.id, session.uid);
        self.store.append(report.clone());
        Ok(report)
    }

    /// Save edits to `current`.
    ///
    /// The record applied to the store is composed from the draft; the service
    /// is not asked for the stored result. Without a new photo the request
    /// carries metadata only. The image reference stays the known one until
    /// the next full load.
    pub async fn update_report(
        &self,
        current: &Report,
        draft: &ReportDraft,
        image: Option<ImageUpload>,
    ) -> Result<Report> {
        self.store.set_loading(true);

        if let Err(e) = draft.check() {
            return Err(self.fail("update report", e));
        }

        let payload = draft.to_update_payload(current);
        if let Err(e) = self
            .api
            .update(&current.id, &payload, image.as_ref())
            .await
        {
            return Err(self.fail("update report", e));
        }

        let report = Report::new(
            current.id.clone(),
            payload.into_record(current.fields.image.clone(), current.fields.created_at),
        );
        tracing::info!("Report {} updated", report.id);
        self.store.replace_one(report.clone());
        Ok(report)
    }

    pub async fn delete_report(&self, id: &str) -> Result<()> {
        self.store.set_loading(true);

        if let Err(e) = self.api.delete(id).await {
            return Err(self.fail("delete report", e));
        }

        tracing::info!("Report {} deleted", id);
        self.store.remove_one(id);
        Ok(())
    }

    fn apply_list(&self, ticket: RequestTicket, reports: Vec<Report>) -> Vec<Report> {
        if self.store.replace_all_if_current(ticket, reports.clone()) {
            reports
        } else {
            self.store.read(|s| s.reports.clone())
        }
    }

    fn fail(&self, action: &str, error: AppError) -> AppError {
        tracing::warn!("Failed to {}: {}", action, error);
        self.store.set_error(Some(error.user_message()));
        error
    }
}
