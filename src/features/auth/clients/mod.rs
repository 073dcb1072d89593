mod identity_client;
mod user_registry_client;

pub use identity_client::{FirebaseIdentityClient, IdentityProvider};
pub use user_registry_client::{BackendUserClient, UserRegistry};
