use serde::Serialize;
use serde_json::Value;

use super::{fetch, send_json};
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::models::{ListParams, Listing, Parcela};

/// Body for assigning a crop to a plot
#[derive(Debug, Clone, Serialize)]
pub struct AsignacionCultivo {
    pub cultivo_id: i64,
    pub fecha_siembra: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_cosecha_estimada: Option<String>,
}

/// Body for registering a harvest on a plot
#[derive(Debug, Clone, Serialize)]
pub struct Cosecha {
    pub cantidad_kg: f64,
    pub fecha_cosecha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calidad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

pub struct ParcelasApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ParcelasApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Listing<Parcela>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get("/parcelas/").with_query(params.to_query()),
        )
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Parcela, ApiError> {
        fetch(self.client, RequestSpec::get(format!("/parcelas/{}/", id))).await
    }

    pub async fn get_by_codigo(&self, codigo: &str) -> Result<Parcela, ApiError> {
        fetch(self.client, RequestSpec::get(codigo_path(codigo))).await
    }

    pub async fn create(&self, parcela: &Parcela) -> Result<Parcela, ApiError> {
        send_json(self.client, RequestSpec::post("/parcelas/"), parcela).await
    }

    pub async fn update(&self, id: i64, parcela: &Parcela) -> Result<Parcela, ApiError> {
        send_json(self.client, RequestSpec::put(format!("/parcelas/{}/", id)), parcela).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(RequestSpec::delete(format!("/parcelas/{}/", id)))
            .await?
            .into_result()?;
        Ok(())
    }

    pub async fn asignar_cultivo(
        &self,
        parcela_id: i64,
        asignacion: &AsignacionCultivo,
    ) -> Result<Parcela, ApiError> {
        send_json(
            self.client,
            RequestSpec::post(format!("/parcelas/{}/asignar-cultivo/", parcela_id)),
            asignacion,
        )
        .await
    }

    pub async fn cosechar(&self, parcela_id: i64, cosecha: &Cosecha) -> Result<Value, ApiError> {
        send_json(
            self.client,
            RequestSpec::post(format!("/parcelas/{}/cosechar/", parcela_id)),
            cosecha,
        )
        .await
    }

    pub async fn stats(&self) -> Result<Value, ApiError> {
        fetch(self.client, RequestSpec::get("/parcelas/stats/")).await
    }
}

/// Plot codes are user-entered, so the segment is percent-encoded
fn codigo_path(codigo: &str) -> String {
    format!("/parcelas/codigo/{}/", urlencoding::encode(codigo))
}
