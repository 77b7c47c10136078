use serde_json::Value;

use super::{fetch, send_json};
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::models::{ListParams, Listing, RegistroProduccion};

pub struct ProduccionApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProduccionApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_registros(
        &self,
        params: &ListParams,
    ) -> Result<Listing<RegistroProduccion>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get("/produccion/registros/").with_query(params.to_query()),
        )
        .await
    }

    pub async fn get_registro(&self, id: i64) -> Result<RegistroProduccion, ApiError> {
        fetch(
            self.client,
            RequestSpec::get(format!("/produccion/registros/{}/", id)),
        )
        .await
    }

    pub async fn create_registro(
        &self,
        registro: &RegistroProduccion,
    ) -> Result<RegistroProduccion, ApiError> {
        send_json(self.client, RequestSpec::post("/produccion/registros/"), registro).await
    }

    pub async fn update_registro(
        &self,
        id: i64,
        registro: &RegistroProduccion,
    ) -> Result<RegistroProduccion, ApiError> {
        send_json(
            self.client,
            RequestSpec::put(format!("/produccion/registros/{}/", id)),
            registro,
        )
        .await
    }

    pub async fn delete_registro(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(RequestSpec::delete(format!("/produccion/registros/{}/", id)))
            .await?
            .into_result()?;
        Ok(())
    }

    /// Records the backend flagged as anomalous
    pub async fn anomalias(&self) -> Result<Listing<RegistroProduccion>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get("/produccion/registros/anomalias/"),
        )
        .await
    }

    pub async fn estadisticas_temporada(&self, temporada: &str) -> Result<Value, ApiError> {
        fetch(
            self.client,
            RequestSpec::get(format!("/produccion/estadisticas/temporada/{}/", temporada)),
        )
        .await
    }

    pub async fn serie_temporal_parcela(
        &self,
        parcela_id: i64,
        params: &ListParams,
    ) -> Result<Value, ApiError> {
        fetch(
            self.client,
            RequestSpec::get(format!(
                "/produccion/series-temporales/parcela/{}/",
                parcela_id
            ))
            .with_query(params.to_query()),
        )
        .await
    }
}
