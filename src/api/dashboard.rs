use serde_json::Value;

use super::fetch;
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::models::{DashboardStats, Kpi};

pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn completo(&self) -> Result<Value, ApiError> {
        fetch(self.client, RequestSpec::get("/dashboard/")).await
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        fetch(self.client, RequestSpec::get("/dashboard/stats/")).await
    }

    pub async fn kpis(&self) -> Result<Vec<Kpi>, ApiError> {
        fetch(self.client, RequestSpec::get("/dashboard/kpis/")).await
    }

    pub async fn graficos(&self) -> Result<Value, ApiError> {
        fetch(self.client, RequestSpec::get("/dashboard/graficos/")).await
    }

    pub async fn alertas(&self) -> Result<Value, ApiError> {
        fetch(self.client, RequestSpec::get("/dashboard/alertas/")).await
    }
}
