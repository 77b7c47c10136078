/// Auth Session
///
/// Login, registration, logout and start-up session restore on top of the
/// gateway. The credential store is the only state: the current user is
/// whatever identity it holds.

use serde::Serialize;

use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::models::{AuthPayload, Role, User};
use crate::validators::{validate_login, validate_new_password, validate_registration};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Profile fields a user may edit; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    client: ApiClient,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn current_user(&self) -> Option<User> {
        self.client.store().identity()
    }

    pub fn is_authenticated(&self) -> bool {
        let creds = self.client.store().read();
        creds.access_token.is_some() && creds.user.is_some()
    }

    /// POST login; on success the tokens and identity are stored
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        let credentials = validate_login(credentials)?;
        let path = &self.client.settings().login_path;

        let payload: AuthPayload = self
            .client
            .send_public(RequestSpec::post(path).with_json(&credentials)?)
            .await?
            .into_json()?;

        self.start_session(&payload)?;
        tracing::info!(user_id = payload.user.id, "User logged in");
        Ok(payload.user)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        let data = validate_registration(data)?;
        let path = &self.client.settings().register_path;

        let payload: AuthPayload = self
            .client
            .send_public(RequestSpec::post(path).with_json(&data)?)
            .await?
            .into_json()?;

        self.start_session(&payload)?;
        tracing::info!(user_id = payload.user.id, "User registered");
        Ok(payload.user)
    }

    /// Forget the session locally. Idempotent; the backend is not called.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client
            .session_guard()
            .advance(|| self.client.store().clear_all())?;
        tracing::info!("User logged out");
        Ok(())
    }

    /// Reconfirm a stored session at start-up.
    ///
    /// With a stored token and identity, the profile is fetched again:
    /// - success refreshes the cached identity
    /// - 401/403 ends the session
    /// - network errors and 5xx keep the cached identity
    pub async fn restore(&self) -> Result<Option<User>, ApiError> {
        let creds = self.client.store().read();
        let cached = match (creds.access_token, creds.user) {
            (Some(_), Some(user)) => user,
            _ => return Ok(None),
        };

        match self.fetch_profile().await {
            Ok(user) => {
                self.client.store().write_identity(&user)?;
                tracing::info!(user_id = user.id, "Session restored");
                Ok(Some(user))
            }
            Err(ApiError::AuthExpired { logged_out: true, .. }) => Ok(None),
            Err(e) if is_auth_rejection(&e) => {
                tracing::info!(error = %e, "Stored session is no longer valid");
                self.logout()?;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id = cached.id,
                    "Could not reconfirm session, using cached identity"
                );
                Ok(Some(cached))
            }
        }
    }

    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        let path = &self.client.settings().profile_path;
        self.client
            .send(RequestSpec::get(path))
            .await?
            .into_json()
    }

    /// PUT the profile and cache what the backend returns
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let path = &self.client.settings().profile_path;
        let user: User = self
            .client
            .send(RequestSpec::put(path).with_json(update)?)
            .await?
            .into_json()?;

        self.client.store().write_identity(&user)?;
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        validate_new_password(
            "new_password",
            &change.new_password,
            &change.new_password_confirm,
        )?;

        let path = &self.client.settings().change_password_path;
        self.client
            .send(RequestSpec::post(path).with_json(change)?)
            .await?
            .into_result()?;
        Ok(())
    }

    fn start_session(&self, payload: &AuthPayload) -> Result<(), ApiError> {
        let store = self.client.store();
        self.client.session_guard().advance(|| {
            store.write_tokens(&payload.tokens.access, &payload.tokens.refresh)?;
            store.write_identity(&payload.user)
        })?;
        Ok(())
    }
}

fn is_auth_rejection(error: &ApiError) -> bool {
    match error {
        ApiError::AuthExpired { .. } => true,
        ApiError::Application { status, .. } => {
            *status == reqwest::StatusCode::UNAUTHORIZED || *status == reqwest::StatusCode::FORBIDDEN
        }
        _ => false,
    }
}
