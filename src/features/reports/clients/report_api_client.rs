use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::core::config::ReportApiConfig;
use crate::core::error::{AppError, Result};
use crate::core::http::{build_http_client, send_request};
use crate::features::reports::dtos::{CreateReportResponseDto, ImageUpload, ReportPayload};
use crate::features::reports::models::{Report, ReportRecord};
use crate::shared::constants::{IMAGE_FIELD, REPORTS_PATH, REPORT_DATA_FIELD};
use crate::shared::validation::ensure_record_id;

/// Remote CRUD operations on reports
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Every report, in the service's key order
    async fn list_all(&self) -> Result<Vec<Report>>;

    /// Reports owned by `uid`
    async fn list_for_user(&self, uid: &str) -> Result<Vec<Report>>;

    async fn create(
        &self,
        payload: &ReportPayload,
        image: Option<&ImageUpload>,
    ) -> Result<CreateReportResponseDto>;

    /// Only success matters; the response body is not read
    async fn update(
        &self,
        id: &str,
        payload: &ReportPayload,
        image: Option<&ImageUpload>,
    ) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// HTTP client for the report service
pub struct ReportApiClient {
    config: ReportApiConfig,
    http_client: reqwest::Client,
}

impl ReportApiClient {
    pub fn new(config: ReportApiConfig) -> Result<Self> {
        let http_client = build_http_client(&config.user_agent, config.request_timeout)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn collection_url(&self) -> String {
        self.config.endpoint(REPORTS_PATH)
    }

    fn member_url(&self, kind: &str, id: &str) -> Result<String> {
        ensure_record_id(kind, id)?;
        Ok(format!("{}/{}", self.collection_url(), urlencoding::encode(id)))
    }

    async fn fetch_list(&self, url: String) -> Result<Vec<Report>> {
        let response = send_request(self.http_client.get(&url), "list reports").await?;

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read report list from {}: {}", url, e);
            AppError::Network(format!("Failed to read report list: {}", e))
        })?;

        parse_report_list(&body)
    }
}

#[async_trait]
impl ReportApi for ReportApiClient {
    async fn list_all(&self) -> Result<Vec<Report>> {
        self.fetch_list(self.collection_url()).await
    }

    async fn list_for_user(&self, uid: &str) -> Result<Vec<Report>> {
        let url = self.member_url("user", uid)?;
        self.fetch_list(url).await
    }

    async fn create(
        &self,
        payload: &ReportPayload,
        image: Option<&ImageUpload>,
    ) -> Result<CreateReportResponseDto> {
        let form = build_form(payload, image)?;
        let response = send_request(
            self.http_client.post(self.collection_url()).multipart(form),
            "create report",
        )
        .await?;

        let created = response
            .json::<CreateReportResponseDto>()
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse create report response: {}", e);
                AppError::ExternalServiceError(format!(
                    "Failed to parse create report response: {}",
                    e
                ))
            })?;

        tracing::info!("Report created: {}", created.id);
        Ok(created)
    }

    async fn update(
        &self,
        id: &str,
        payload: &ReportPayload,
        image: Option<&ImageUpload>,
    ) -> Result<()> {
        let url = self.member_url("report", id)?;
        let form = build_form(payload, image)?;
        send_request(self.http_client.put(&url).multipart(form), "update report").await?;

        tracing::info!("Report updated: {}", id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.member_url("report", id)?;
        send_request(self.http_client.delete(&url), "delete report").await?;

        tracing::info!("Report deleted: {}", id);
        Ok(())
    }
}

/// Multipart body: photo first, then the JSON metadata
fn build_form(payload: &ReportPayload, image: Option<&ImageUpload>) -> Result<Form> {
    let mut form = Form::new();

    if let Some(image) = image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid image content type: {}", e)))?;
        form = form.part(IMAGE_FIELD, part);
    }

    let report_data = serde_json::to_string(payload)?;
    Ok(form.text(REPORT_DATA_FIELD, report_data))
}

/// Flatten the id-keyed object into reports, keeping key order.
///
/// An empty body or `null` means no reports. Entries that are not objects or
/// cannot be read as a report are skipped.
fn parse_report_list(body: &str) -> Result<Vec<Report>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries = serde_json::from_str::<Option<Map<String, Value>>>(body).map_err(|e| {
        tracing::error!("Report list is not an id-keyed object: {}", e);
        AppError::ExternalServiceError(format!("Failed to parse report list: {}", e))
    })?;

    let mut reports = Vec::new();
    for (id, value) in entries.unwrap_or_default() {
        if !value.is_object() {
            tracing::warn!("Skipping malformed report entry {}", id);
            continue;
        }
        match serde_json::from_value::<ReportRecord>(value) {
            Ok(record) => reports.push(Report::new(id, record)),
            Err(e) => tracing::warn!("Skipping unreadable report {}: {}", id, e),
        }
    }
    Ok(reports)
}
