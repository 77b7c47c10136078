use serde_json::Value;

use super::{fetch, send_json};
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::models::{Cultivo, ListParams, Listing};

pub struct CultivosApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CultivosApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Listing<Cultivo>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get("/cultivos/").with_query(params.to_query()),
        )
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Cultivo, ApiError> {
        fetch(self.client, RequestSpec::get(format!("/cultivos/{}/", id))).await
    }

    pub async fn create(&self, cultivo: &Cultivo) -> Result<Cultivo, ApiError> {
        send_json(self.client, RequestSpec::post("/cultivos/"), cultivo).await
    }

    pub async fn update(&self, id: i64, cultivo: &Cultivo) -> Result<Cultivo, ApiError> {
        send_json(self.client, RequestSpec::put(format!("/cultivos/{}/", id)), cultivo).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(RequestSpec::delete(format!("/cultivos/{}/", id)))
            .await?
            .into_result()?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<Value, ApiError> {
        fetch(self.client, RequestSpec::get("/cultivos/stats/")).await
    }

    pub async fn tipos(&self) -> Result<Value, ApiError> {
        fetch(self.client, RequestSpec::get("/cultivos/tipos/")).await
    }
}
