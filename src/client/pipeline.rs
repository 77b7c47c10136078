/// Request Pipeline
///
/// Dispatches a request with the current access token attached and buffers
/// whatever comes back. Status codes are not interpreted here; the caller
/// decides what a 401 means.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::client::request::{PendingRequest, RequestSpec};
use crate::client::response::ApiResponse;
use crate::configuration::ApiSettings;
use crate::credentials::CredentialStore;
use crate::error::ApiError;

#[derive(Clone)]
pub struct RequestPipeline {
    http: reqwest::Client,
    api: Arc<ApiSettings>,
    store: Arc<dyn CredentialStore>,
}

impl RequestPipeline {
    pub fn new(
        http: reqwest::Client,
        api: Arc<ApiSettings>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self { http, api, store }
    }

    /// Send with the stored access token, if there is one.
    /// Without a token the call goes out unauthenticated and the backend
    /// answers 401 where auth is required.
    pub async fn execute(&self, pending: &PendingRequest) -> Result<ApiResponse, ApiError> {
        let token = self.store.access_token();
        let spec = pending.spec();

        tracing::debug!(
            request_id = %pending.request_id(),
            method = %spec.method,
            path = %spec.path,
            retried = pending.retried(),
            authenticated = token.is_some(),
            "Dispatching request"
        );

        let response = self.dispatch(spec, token.as_deref()).await.map_err(|e| {
            tracing::warn!(
                request_id = %pending.request_id(),
                path = %spec.path,
                error = %e,
                "Request failed without a response"
            );
            ApiError::Network(e)
        })?;

        tracing::debug!(
            request_id = %pending.request_id(),
            path = %spec.path,
            status = response.status().as_u16(),
            "Response received"
        );

        Ok(response)
    }

    /// Send without credentials (login, register)
    pub async fn execute_public(&self, spec: &RequestSpec) -> Result<ApiResponse, ApiError> {
        self.dispatch(spec, None).await.map_err(|e| {
            tracing::warn!(path = %spec.path, error = %e, "Request failed without a response");
            ApiError::Network(e)
        })
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
        token: Option<&str>,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(spec.method.clone(), self.api.endpoint(&spec.path));

        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }

        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }

        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    builder = builder.header(AUTHORIZATION, value);
                }
                // A token with control characters can't be sent; the backend
                // will answer 401 and the refresh path takes over.
                Err(_) => tracing::warn!("Stored access token is not a valid header value"),
            }
        }

        let response = builder.send().await?;
        ApiResponse::read(response).await
    }
}
