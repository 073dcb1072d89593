/// Report collection endpoint on the remote report service
pub const REPORTS_PATH: &str = "/api/reports";

/// Backend endpoint notified after a successful sign-in
pub const USERS_LOGIN_PATH: &str = "/api/users/login";

/// Backend endpoint notified after a successful sign-up
pub const USERS_REGISTER_PATH: &str = "/api/users/register";

// =============================================================================
// MULTIPART FIELDS
// =============================================================================

/// Multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the JSON-encoded report metadata
pub const REPORT_DATA_FIELD: &str = "reportData";

// =============================================================================
// IMAGE UPLOADS
// =============================================================================

/// Allowed MIME types for report photos
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum photo size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;
