use serde::Serialize;

use super::{fetch, send_json};
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::models::{ListParams, Listing, NuevaPrediccion, PrediccionCosecha};

/// Actual yield reported against a prediction
#[derive(Debug, Clone, Serialize)]
pub struct ValidacionPrediccion {
    pub rendimiento_real: f64,
}

pub struct PrediccionesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PrediccionesApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Listing<PrediccionCosecha>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get("/produccion/predicciones/").with_query(params.to_query()),
        )
        .await
    }

    pub async fn crear(&self, prediccion: &NuevaPrediccion) -> Result<PrediccionCosecha, ApiError> {
        send_json(
            self.client,
            RequestSpec::post("/produccion/predicciones/crear/"),
            prediccion,
        )
        .await
    }

    pub async fn validar(
        &self,
        prediccion_id: i64,
        validacion: &ValidacionPrediccion,
    ) -> Result<PrediccionCosecha, ApiError> {
        send_json(
            self.client,
            RequestSpec::post(format!(
                "/produccion/predicciones/{}/validar/",
                prediccion_id
            )),
            validacion,
        )
        .await
    }
}
