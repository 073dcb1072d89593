use serde::{Deserialize, Serialize};

/// Signed-in user as mirrored by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub uid: String,
    pub email: String,
    /// Shown as the author of reports created by this user
    pub display_name: String,
}

/// Identity returned by the provider after sign-in or sign-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    /// Opaque credential for follow-up calls to the provider
    pub id_token: String,
}

impl IdentityUser {
    pub fn into_session(self) -> UserSession {
        UserSession {
            uid: self.uid,
            email: self.email,
            display_name: self.display_name.unwrap_or_default(),
        }
    }
}
