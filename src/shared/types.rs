use serde::Deserialize;

/// Error body shape returned by the report service on failures.
///
/// Either `message` or `error` may be used; anything else falls back to the
/// status-only message.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// Extract a readable message from a raw response body
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
