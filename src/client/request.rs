use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// What a caller wants sent: method, backend path, optional JSON body and
/// query parameters. Headers beyond auth and content type are not part of the
/// backend contract.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(self.with_body(value))
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// One attempt at an in-flight call.
///
/// Immutable: a replay after a token refresh is a new descriptor from
/// [`PendingRequest::for_retry`] sharing the same spec and request id.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    request_id: Uuid,
    spec: Arc<RequestSpec>,
    retried: bool,
    generation: u64,
}

impl PendingRequest {
    /// `generation` is the session generation current at dispatch
    pub fn new(spec: RequestSpec, generation: u64) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            spec: Arc::new(spec),
            retried: false,
            generation,
        }
    }

    pub fn for_retry(&self) -> Self {
        Self {
            request_id: self.request_id,
            spec: Arc::clone(&self.spec),
            retried: true,
            generation: self.generation,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
