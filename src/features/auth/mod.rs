pub mod clients;
pub mod dtos;
pub mod model;
pub mod services;
pub mod store;

pub use clients::{BackendUserClient, FirebaseIdentityClient, IdentityProvider, UserRegistry};
pub use model::UserSession;
pub use services::SessionService;
pub use store::{SessionState, SessionStore};
