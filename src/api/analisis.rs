use serde_json::Value;

use super::{fetch, send_json};
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;

/// Statistical analyses run by the backend. Payloads and results are passed
/// through as JSON.
pub struct AnalisisApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AnalisisApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn estadisticas_generales(&self) -> Result<Value, ApiError> {
        fetch(
            self.client,
            RequestSpec::get("/analisis/estadisticas-generales/"),
        )
        .await
    }

    pub async fn comparar_variedades(&self, comparacion: &Value) -> Result<Value, ApiError> {
        send_json(
            self.client,
            RequestSpec::post("/analisis/comparar-variedades/"),
            comparacion,
        )
        .await
    }

    pub async fn clasificar_rendimiento(&self, clasificacion: &Value) -> Result<Value, ApiError> {
        send_json(
            self.client,
            RequestSpec::post("/analisis/clasificar-rendimiento/"),
            clasificacion,
        )
        .await
    }

    pub async fn analizar_serie_temporal(&self, analisis: &Value) -> Result<Value, ApiError> {
        send_json(
            self.client,
            RequestSpec::post("/analisis/analizar-serie-temporal/"),
            analisis,
        )
        .await
    }
}
