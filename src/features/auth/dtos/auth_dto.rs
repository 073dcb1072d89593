use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request DTO for user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Request DTO for user login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of `POST /api/users/login`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserLoginDto {
    pub uid: String,
    pub email: String,
}

/// Body of `POST /api/users/register`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistrationDto {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
