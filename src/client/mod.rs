/// Authenticated request gateway
///
/// `ApiClient` is the single entry point for backend calls. It composes:
/// - `RequestPipeline`: attaches the access token and dispatches
/// - `RefreshCoordinator`: turns a first 401 into refresh + one replay
/// - a `CredentialStore` and a `LoginRedirect` injected by the application

mod pipeline;
mod refresh;
mod request;
mod response;
mod session_guard;

pub use pipeline::RequestPipeline;
pub use refresh::{LoginRedirect, RefreshCoordinator};
pub use request::{PendingRequest, RequestSpec};
pub use response::ApiResponse;
pub use session_guard::SessionGuard;

use std::sync::Arc;

use reqwest::StatusCode;

use crate::configuration::ApiSettings;
use crate::credentials::CredentialStore;
use crate::error::ApiError;

#[derive(Clone)]
pub struct ApiClient {
    api: Arc<ApiSettings>,
    pipeline: RequestPipeline,
    coordinator: RefreshCoordinator,
    store: Arc<dyn CredentialStore>,
    guard: Arc<SessionGuard>,
}

impl ApiClient {
    pub fn new(
        api: ApiSettings,
        store: Arc<dyn CredentialStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        reqwest::Url::parse(&api.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base_url {}: {}", api.base_url, e)))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = api.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))?;

        let api = Arc::new(api);
        let guard = Arc::new(SessionGuard::new());
        let pipeline = RequestPipeline::new(http.clone(), Arc::clone(&api), Arc::clone(&store));
        let coordinator = RefreshCoordinator::new(
            http,
            api.endpoint(&api.refresh_path),
            pipeline.clone(),
            Arc::clone(&store),
            redirect,
            Arc::clone(&guard),
        );

        Ok(Self {
            api,
            pipeline,
            coordinator,
            store,
            guard,
        })
    }

    /// Send an authenticated request.
    ///
    /// Every response except 401 comes back as `Ok`, whatever its status.
    /// A 401 triggers one refresh-and-replay; if that cannot succeed the
    /// result is `ApiError::AuthExpired` and callers must not retry.
    pub async fn send(&self, spec: RequestSpec) -> Result<ApiResponse, ApiError> {
        let pending = PendingRequest::new(spec, self.guard.current());
        let response = self.pipeline.execute(&pending).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(
                request_id = %pending.request_id(),
                path = %pending.spec().path,
                "Access token rejected, attempting refresh"
            );
            return self.coordinator.recover(pending, response).await;
        }

        Ok(response)
    }

    /// Send without credentials and without refresh handling.
    /// For endpoints where a 401 means bad credentials, not an expired token.
    pub async fn send_public(&self, spec: RequestSpec) -> Result<ApiResponse, ApiError> {
        self.pipeline.execute_public(&spec).await
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn session_guard(&self) -> &Arc<SessionGuard> {
        &self.guard
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.api
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.api.base_url)
            .field("generation", &self.guard.current())
            .finish()
    }
}
