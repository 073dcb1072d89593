use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::core::error::Result;
use crate::features::auth::clients::{IdentityProvider, UserRegistry};
use crate::features::auth::dtos::{
    LoginRequestDto, RegisterRequestDto, UserLoginDto, UserRegistrationDto,
};
use crate::features::auth::model::UserSession;
use crate::features::auth::store::SessionStore;

/// Sign-in, sign-up and sign-out, mirrored into the session store
pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    registry: Arc<dyn UserRegistry>,
    store: SessionStore,
}

impl SessionService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        registry: Arc<dyn UserRegistry>,
        store: SessionStore,
    ) -> Self {
        Self {
            identity,
            registry,
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<UserSession> {
        self.store.set_loading(true);
        let result = self.sign_in(dto).await;
        self.settle(result)
    }

    /// Register a new user; the user stays signed in afterwards
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<UserSession> {
        self.store.set_loading(true);
        let result = self.sign_up(dto).await;
        self.settle(result)
    }

    pub async fn logout(&self) -> Result<()> {
        let Some(user) = self.store.current_user() else {
            self.store.clear();
            return Ok(());
        };

        if let Err(e) = self.identity.sign_out(&user.uid).await {
            tracing::warn!("Sign-out failed for user {}: {}", user.uid, e);
            self.store.set_error(Some(e.user_message()));
            return Err(e);
        }

        self.store.clear();
        Ok(())
    }

    async fn sign_in(&self, dto: LoginRequestDto) -> Result<UserSession> {
        dto.validate()?;

        let user = self.identity.sign_in(&dto.email, &dto.password).await?;

        self.registry
            .record_login(&UserLoginDto {
                uid: user.uid.clone(),
                email: user.email.clone(),
            })
            .await?;

        Ok(user.into_session())
    }

    async fn sign_up(&self, dto: RegisterRequestDto) -> Result<UserSession> {
        dto.validate()?;

        let user = self.identity.sign_up(&dto.email, &dto.password).await?;
        let user = self.identity.update_display_name(&user, &dto.name).await?;

        self.registry
            .record_registration(&UserRegistrationDto {
                uid: user.uid.clone(),
                name: dto.name.clone(),
                email: dto.email.clone(),
                created_at: Utc::now(),
            })
            .await?;

        Ok(UserSession {
            uid: user.uid,
            email: dto.email,
            display_name: dto.name,
        })
    }

    fn settle(&self, result: Result<UserSession>) -> Result<UserSession> {
        match result {
            Ok(session) => {
                tracing::info!("User signed in: {}", session.uid);
                self.store.set_user(Some(session.clone()));
                Ok(session)
            }
            Err(e) => {
                tracing::warn!("Authentication failed: {}", e);
                self.store.set_error(Some(e.user_message()));
                Err(e)
            }
        }
    }
}
