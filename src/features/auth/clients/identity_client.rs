use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::IdentityConfig;
use crate::core::error::{AppError, Result};
use crate::core::http::{build_http_client, request_id_headers};
use crate::features::auth::model::IdentityUser;

/// External identity issuer
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser>;

    /// Set the display name and return the updated identity
    async fn update_display_name(
        &self,
        user: &IdentityUser,
        display_name: &str,
    ) -> Result<IdentityUser>;

    async fn sign_out(&self, user_id: &str) -> Result<()>;
}

/// Request body shared by sign-in and sign-up
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

/// Account response from the identity toolkit
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdentityErrorResponse {
    error: IdentityErrorDetail,
}

#[derive(Debug, Deserialize)]
struct IdentityErrorDetail {
    #[serde(default)]
    message: String,
}

/// Client for the identity toolkit REST API
pub struct FirebaseIdentityClient {
    config: IdentityConfig,
    http_client: reqwest::Client,
}

impl FirebaseIdentityClient {
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let http_client = build_http_client(&config.user_agent, config.request_timeout)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn account_url(&self, action: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.base_url,
            action,
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn call<B: Serialize + ?Sized>(&self, action: &str, body: &B) -> Result<AccountResponse> {
        let url = self.account_url(action);
        let (request_id, headers) = request_id_headers();
        tracing::debug!(
            "Calling identity provider: accounts:{} (request_id={})",
            action,
            request_id
        );

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    "Identity provider request failed (request_id={}): {}",
                    request_id,
                    e
                );
                AppError::ExternalServiceError(format!("Identity provider unreachable: {}", e))
            })?;

        let status = response.status();

        if status.is_success() {
            return response.json::<AccountResponse>().await.map_err(|e| {
                tracing::error!("Failed to parse identity provider response: {}", e);
                AppError::ExternalServiceError(format!(
                    "Failed to parse identity response: {}",
                    e
                ))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let code = serde_json::from_str::<IdentityErrorResponse>(&body)
            .map(|r| r.error.message)
            .unwrap_or_default();

        tracing::warn!(
            "Identity provider error (request_id={}): HTTP {} - {}",
            request_id,
            status,
            body
        );
        Err(map_identity_error(&code, status))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser> {
        let account = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!("Signed in user: {}", account.local_id);
        into_identity(account, email, None)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser> {
        let account = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!("Successfully created user: {}", account.local_id);
        into_identity(account, email, None)
    }

    async fn update_display_name(
        &self,
        user: &IdentityUser,
        display_name: &str,
    ) -> Result<IdentityUser> {
        let account = self
            .call(
                "update",
                &UpdateProfileRequest {
                    id_token: &user.id_token,
                    display_name,
                    return_secure_token: true,
                },
            )
            .await?;

        into_identity(account, &user.email, Some(&user.id_token))
    }

    /// Tokens are stateless; signing out only drops the local session
    async fn sign_out(&self, user_id: &str) -> Result<()> {
        tracing::info!("Signed out user: {}", user_id);
        Ok(())
    }
}

fn into_identity(
    account: AccountResponse,
    fallback_email: &str,
    fallback_token: Option<&str>,
) -> Result<IdentityUser> {
    let id_token = account
        .id_token
        .or_else(|| fallback_token.map(String::from))
        .ok_or_else(|| {
            AppError::ExternalServiceError("Identity response has no token".to_string())
        })?;

    Ok(IdentityUser {
        uid: account.local_id,
        email: account.email.unwrap_or_else(|| fallback_email.to_string()),
        display_name: account.display_name.filter(|n| !n.is_empty()),
        id_token,
    })
}

/// Map provider error codes such as `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`
fn map_identity_error(message: &str, status: reqwest::StatusCode) -> AppError {
    let code = message.split(" : ").next().unwrap_or("").trim();

    match code {
        "EMAIL_EXISTS" => AppError::Conflict("Email already registered".to_string()),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AppError::Unauthorized("Invalid credentials".to_string())
        }
        "USER_DISABLED" => AppError::Auth("Account is disabled".to_string()),
        "INVALID_EMAIL" => AppError::Validation("Invalid email format".to_string()),
        "WEAK_PASSWORD" => AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            AppError::Auth("Too many attempts, try again later".to_string())
        }
        "" => AppError::ExternalServiceError(format!("Identity provider error: HTTP {}", status)),
        other => AppError::Auth(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::REQUEST_ID_HEADER;
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn accounts(
        Path(action): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        if !headers.contains_key(REQUEST_ID_HEADER) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": 400, "message": "MISSING_REQUEST_ID"}})),
            )
                .into_response();
        }
        if query.get("key").map(String::as_str) != Some("test-key") {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": 400, "message": "API key not valid"}})),
            )
                .into_response();
        }

        match action.as_str() {
            "accounts:signInWithPassword" if body["password"] == "secret1" => Json(json!({
                "localId": "uid-1",
                "email": body["email"],
                "displayName": "Ani",
                "idToken": "token-1"
            }))
            .into_response(),
            "accounts:signInWithPassword" => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}})),
            )
                .into_response(),
            "accounts:signUp" if body["email"] == "taken@example.com" => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}})),
            )
                .into_response(),
            "accounts:signUp" => Json(json!({
                "localId": "uid-2",
                "email": body["email"],
                "idToken": "token-2"
            }))
            .into_response(),
            "accounts:update" => Json(json!({
                "localId": "uid-2",
                "email": "budi@example.com",
                "displayName": body["displayName"]
            }))
            .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn setup() -> FirebaseIdentityClient {
        let app = Router::new().route("/v1/{action}", post(accounts));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FirebaseIdentityClient::new(IdentityConfig::with_base_url(
            format!("http://{}", addr),
            "test-key",
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_in() {
        let client = setup().await;
        let user = client.sign_in("ani@example.com", "secret1").await.unwrap();
        assert_eq!(user.uid, "uid-1");
        assert_eq!(user.display_name.as_deref(), Some("Ani"));
        assert_eq!(user.id_token, "token-1");
    }

    #[tokio::test]
    async fn test_sign_in_bad_password() {
        let client = setup().await;
        let err = client.sign_in("ani@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_sign_up_then_set_name() {
        let client = setup().await;
        let user = client.sign_up("budi@example.com", "secret1").await.unwrap();
        assert_eq!(user.uid, "uid-2");
        assert!(user.display_name.is_none());

        let named = client.update_display_name(&user, "Budi").await.unwrap();
        assert_eq!(named.display_name.as_deref(), Some("Budi"));
        // update responses may omit the token; the previous one is kept
        assert_eq!(named.id_token, "token-2");
    }

    #[tokio::test]
    async fn test_sign_up_existing_email() {
        let client = setup().await;
        let err = client
            .sign_up("taken@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_map_identity_error_codes() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert!(matches!(
            map_identity_error("WEAK_PASSWORD : Password should be at least 6 characters", status),
            AppError::Validation(_)
        ));
        assert!(matches!(
            map_identity_error("USER_DISABLED", status),
            AppError::Auth(_)
        ));
        assert!(matches!(
            map_identity_error("", status),
            AppError::ExternalServiceError(_)
        ));
        assert_eq!(
            map_identity_error("OPERATION_NOT_ALLOWED", status).user_message(),
            "OPERATION_NOT_ALLOWED"
        );
    }
}
