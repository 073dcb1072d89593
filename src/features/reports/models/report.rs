use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::validation::parse_height;

/// One flood observation as known to the client.
///
/// `id` is always the identifier assigned by the report service. `created_at`
/// is absent on records composed locally after a create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(flatten)]
    pub fields: ReportRecord,
}

/// Report fields as stored by the service, keyed externally by the report id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub location: String,
    /// Water height in meters
    #[serde(default, deserialize_with = "deserialize_height")]
    pub height: f64,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub weather: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub author: String,
    /// Owning user id
    #[serde(default, deserialize_with = "deserialize_text")]
    pub uid: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn new(id: impl Into<String>, fields: ReportRecord) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.fields.uid == uid
    }

    /// Resolve the image reference for display.
    ///
    /// Relative paths such as `/uploads/a.jpg` are served by the report
    /// service itself; absolute URLs pass through unchanged.
    pub fn image_url(&self, base_url: &str) -> Option<String> {
        let image = self.fields.image.as_deref()?.trim();
        if image.is_empty() {
            return None;
        }
        if image.starts_with("http://") || image.starts_with("https://") {
            return Some(image.to_string());
        }
        let base = base_url.trim_end_matches('/');
        if image.starts_with('/') {
            Some(format!("{}{}", base, image))
        } else {
            Some(format!("{}/{}", base, image))
        }
    }

    /// Creation time rendered in the local timezone for listings
    pub fn created_at_label(&self) -> Option<String> {
        self.fields
            .created_at
            .map(|t| t.with_timezone(&Local).format("%d/%m/%Y %H:%M:%S").to_string())
    }
}

/// Heights arrive either as JSON numbers or as the raw form string
fn deserialize_height<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let height = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_height(s),
        serde_json::Value::Null => Some(0.0),
        _ => None,
    };
    Ok(height.unwrap_or_else(|| {
        tracing::warn!("Ignoring unreadable report height: {}", value);
        0.0
    }))
}

/// Text fields may be stored as `null` or as numbers by older clients
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_text(deserializer)?.unwrap_or_default())
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let text = match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => None,
        other => {
            tracing::warn!("Ignoring unreadable report text field: {}", other);
            None
        }
    };
    Ok(text)
}

/// Timestamps arrive as RFC 3339 strings or epoch milliseconds
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    Ok(parsed)
}
