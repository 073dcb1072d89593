use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::types::ApiErrorBody;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the shared HTTP client used by one service client
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Fresh request id header, logged alongside the outgoing request
pub fn request_id_headers() -> (String, HeaderMap) {
    let request_id = Uuid::new_v4().to_string();
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    (request_id, headers)
}

/// Send with a request id and turn non-2xx responses into errors
pub async fn send_request(request: RequestBuilder, action: &str) -> Result<Response> {
    let (request_id, headers) = request_id_headers();
    tracing::debug!("Sending {} request (request_id={})", action, request_id);

    let response = request.headers(headers).send().await.map_err(|e| {
        tracing::error!("Failed to {} (request_id={}): {}", action, request_id, e);
        AppError::from(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        "Service rejected {} (request_id={}): HTTP {} - {}",
        action,
        request_id,
        status,
        body
    );
    Err(error_from_status(status, &body))
}

/// Error for a non-2xx response, using the body's message when it has one
pub fn error_from_status(status: StatusCode, body: &str) -> AppError {
    let message = ApiErrorBody::message_from(body)
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Http { status, message },
    }
}
