use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::UserSession;
use crate::features::reports::models::{deserialize_timestamp, Report, ReportRecord};
use crate::shared::constants::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};

/// Report form input, before it is attributed to a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReportDraft {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,

    /// Water height in meters
    #[validate(range(min = 0.0, message = "Height must be zero or more"))]
    pub height: f64,

    #[validate(length(min = 1, max = 100, message = "Weather is required"))]
    pub weather: String,
}

impl ReportDraft {
    /// Run field validation, including the non-finite height check that
    /// `range` lets through
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if !self.height.is_finite() {
            return Err(AppError::Validation(
                "height: Height must be a number".to_string(),
            ));
        }
        Ok(())
    }

    /// Draft pre-filled from an existing report, as the edit form does
    pub fn from_report(report: &Report) -> Self {
        Self {
            title: report.fields.title.clone(),
            description: report.fields.description.clone(),
            location: report.fields.location.clone(),
            height: report.fields.height,
            weather: report.fields.weather.clone(),
        }
    }

    /// Metadata sent as `reportData` for a new report by `session`
    pub fn to_payload(&self, session: &UserSession) -> ReportPayload {
        ReportPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            height: self.height,
            weather: self.weather.clone(),
            uid: session.uid.clone(),
            author: session.display_name.clone(),
        }
    }

    /// Metadata sent as `reportData` when editing `current`; ownership fields
    /// are carried over from the known record
    pub fn to_update_payload(&self, current: &Report) -> ReportPayload {
        ReportPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            height: self.height,
            weather: self.weather.clone(),
            uid: current.fields.uid.clone(),
            author: current.fields.author.clone(),
        }
    }
}

/// JSON metadata part of the multipart write requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub title: String,
    pub description: String,
    pub location: String,
    pub height: f64,
    pub weather: String,
    pub uid: String,
    pub author: String,
}

impl ReportPayload {
    /// Record as the client knows it right after the service accepted this
    /// payload. Nothing is re-fetched, so server-side rewrites are not seen.
    pub fn into_record(self, image: Option<String>, created_at: Option<DateTime<Utc>>) -> ReportRecord {
        ReportRecord {
            title: self.title,
            description: self.description,
            location: self.location,
            height: self.height,
            weather: self.weather,
            author: self.author,
            uid: self.uid,
            image,
            created_at,
        }
    }
}

/// Response body of a successful create
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportResponseDto {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ids are opaque; numeric ids are accepted and kept as text
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.is_empty() => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid report id: {}",
            other
        ))),
    }
}

/// Photo attached to a create or update request
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        if !is_image_type_allowed(&content_type) {
            return Err(AppError::Validation(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("Image file is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_SIZE {
            return Err(AppError::Validation(format!(
                "Image exceeds maximum size of {} MB",
                MAX_IMAGE_SIZE / (1024 * 1024)
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Read a photo from disk, inferring its type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(content_type_from_extension)
            .ok_or_else(|| {
                AppError::Validation(format!("Unsupported image file: {}", path.display()))
            })?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::error!("Failed to read image {}: {}", path.display(), e);
            AppError::BadRequest(format!("Failed to read image file: {}", e))
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        Self::new(file_name, content_type, bytes)
    }
}

/// Check if a MIME type is allowed for report photos
pub fn is_image_type_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Get content type from a file extension
pub fn content_type_from_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
