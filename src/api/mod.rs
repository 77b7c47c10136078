//! Typed endpoint wrappers
//!
//! One method per backend call. All of them go through `ApiClient::send`, so
//! token refresh applies uniformly; non-2xx answers become
//! `ApiError::Application`.

mod analisis;
mod cultivos;
mod dashboard;
mod parcelas;
mod predicciones;
mod produccion;

pub use analisis::AnalisisApi;
pub use cultivos::CultivosApi;
pub use dashboard::DashboardApi;
pub use parcelas::ParcelasApi;
pub use predicciones::PrediccionesApi;
pub use produccion::ProduccionApi;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AgroApi {
    client: ApiClient,
}

impl AgroApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cultivos(&self) -> CultivosApi<'_> {
        CultivosApi::new(&self.client)
    }

    pub fn parcelas(&self) -> ParcelasApi<'_> {
        ParcelasApi::new(&self.client)
    }

    pub fn produccion(&self) -> ProduccionApi<'_> {
        ProduccionApi::new(&self.client)
    }

    pub fn predicciones(&self) -> PrediccionesApi<'_> {
        PrediccionesApi::new(&self.client)
    }

    pub fn analisis(&self) -> AnalisisApi<'_> {
        AnalisisApi::new(&self.client)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(&self.client)
    }

    /// Escape hatch for endpoints without a typed wrapper
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let mut spec = RequestSpec::new(method, path).with_query(query);
        if let Some(body) = body {
            spec = spec.with_body(body);
        }
        fetch(&self.client, spec).await
    }
}

pub(crate) async fn fetch<T: DeserializeOwned>(
    client: &ApiClient,
    spec: RequestSpec,
) -> Result<T, ApiError> {
    client.send(spec).await?.into_json()
}

pub(crate) async fn send_json<B, T>(
    client: &ApiClient,
    spec: RequestSpec,
    body: &B,
) -> Result<T, ApiError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    fetch(client, spec.with_json(body)?).await
}
