/// Refresh Coordinator
///
/// Recovers from an expired access token: on the first 401 of a call it
/// exchanges the refresh token for a new access token and replays the call
/// once. A 401 on the replay is final. When no new token can be obtained the
/// session is torn down and the login redirect fires.
///
/// Per call:
///   SENT -> 401 & !retried -> REFRESHING -> ok   -> RETRYING -> SENT (retried)
///                                         -> fail -> LOGGED_OUT
///   SENT -> 401 & retried  -> FAILED

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::pipeline::RequestPipeline;
use crate::client::request::PendingRequest;
use crate::client::response::ApiResponse;
use crate::client::session_guard::SessionGuard;
use crate::credentials::CredentialStore;
use crate::error::{ApiError, RefreshError};

/// Where the application goes when the session is irrecoverably lost
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

impl<F> LoginRedirect for F
where
    F: Fn() + Send + Sync,
{
    fn redirect_to_login(&self) {
        self()
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    access: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default, alias = "refreshToken", alias = "refresh_token")]
    refresh: Option<String>,
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    pipeline: RequestPipeline,
    store: Arc<dyn CredentialStore>,
    redirect: Arc<dyn LoginRedirect>,
    guard: Arc<SessionGuard>,
}

impl RefreshCoordinator {
    pub fn new(
        http: reqwest::Client,
        refresh_url: String,
        pipeline: RequestPipeline,
        store: Arc<dyn CredentialStore>,
        redirect: Arc<dyn LoginRedirect>,
        guard: Arc<SessionGuard>,
    ) -> Self {
        Self {
            http,
            refresh_url,
            pipeline,
            store,
            redirect,
            guard,
        }
    }

    /// Handle a 401 observed for `pending`.
    ///
    /// Returns the replay's response when the refresh succeeds, otherwise
    /// `ApiError::AuthExpired` carrying the 401 the caller would have seen.
    pub async fn recover(
        &self,
        pending: PendingRequest,
        unauthorized: ApiResponse,
    ) -> Result<ApiResponse, ApiError> {
        if pending.retried() {
            tracing::warn!(
                request_id = %pending.request_id(),
                path = %pending.spec().path,
                "Replayed request was rejected again, giving up"
            );
            return Err(ApiError::AuthExpired {
                response: unauthorized,
                logged_out: false,
            });
        }

        let retry = pending.for_retry();

        match self.refresh_access_token(pending.generation()).await {
            Ok(()) => {
                tracing::info!(
                    request_id = %pending.request_id(),
                    path = %pending.spec().path,
                    "Access token refreshed, replaying request"
                );
            }
            Err(RefreshError::SessionReplaced) => {
                // Logged out meanwhile, or a new login replaced the session.
                let logged_out = self.store.access_token().is_none();
                tracing::info!(
                    request_id = %pending.request_id(),
                    logged_out,
                    "Session changed while refreshing, dropping the new token"
                );
                return Err(ApiError::AuthExpired {
                    response: unauthorized,
                    logged_out,
                });
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %pending.request_id(),
                    path = %pending.spec().path,
                    error = %e,
                    "Token refresh failed"
                );
                self.end_session(pending.generation());
                return Err(ApiError::AuthExpired {
                    response: unauthorized,
                    logged_out: true,
                });
            }
        }

        let response = self.pipeline.execute(&retry).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(
                request_id = %retry.request_id(),
                path = %retry.spec().path,
                "Replayed request was rejected again, giving up"
            );
            return Err(ApiError::AuthExpired {
                response,
                logged_out: false,
            });
        }
        Ok(response)
    }

    async fn refresh_access_token(&self, generation: u64) -> Result<(), RefreshError> {
        let refresh_token = self
            .store
            .refresh_token()
            .ok_or(RefreshError::MissingRefreshToken)?;

        let response = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: &refresh_token,
            })
            .send()
            .await
            .map_err(RefreshError::Transport)?;

        if !response.status().is_success() {
            return Err(RefreshError::Rejected(response.status()));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::MalformedResponse(e.to_string()))?;

        self.guard
            .if_current(generation, || match &body.refresh {
                Some(rotated) => self.store.write_tokens(&body.access, rotated),
                None => self.store.write_access_token(&body.access),
            })
            .ok_or(RefreshError::SessionReplaced)?
            .map_err(RefreshError::Storage)
    }

    /// Clear credentials and send the user to login, once per session
    fn end_session(&self, generation: u64) {
        let ended = self.guard.end_if_current(generation, || {
            if let Err(e) = self.store.clear_all() {
                tracing::error!(error = %e, "Failed to clear credentials");
            }
        });

        match ended {
            Some(()) => {
                tracing::info!("Session ended, redirecting to login");
                self.redirect.redirect_to_login();
            }
            None => {
                tracing::debug!("Session already ended by a concurrent request");
            }
        }
    }
}
