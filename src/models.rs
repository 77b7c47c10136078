//! Wire models for the agricultural control backend.
//!
//! Field names follow the backend's JSON exactly. Computed fields the backend
//! adds to responses are optional so request payloads can reuse the types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Operator,
    Analyst,
}

/// Authenticated user profile; also the cached identity kept with the tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

fn default_true() -> bool {
    true
}

/// Token pair issued by login, register and (access only) refresh
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub access: String,
    #[serde(alias = "refreshToken", alias = "refresh_token")]
    pub refresh: String,
}

/// Body of a successful login/register
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cultivo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub nombre: String,
    pub variedad: String,
    pub tipo: String,
    pub ciclo_dias: u32,
    pub rendimiento_esperado: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatura_optima_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatura_optima_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_suelo_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_suelo_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitacion_anual: Option<f64>,
    #[serde(default = "default_true")]
    pub activo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcela {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub codigo: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub area_hectareas: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubicacion_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubicacion_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitud: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_suelo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_suelo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivo_actual: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivo_actual_info: Option<Cultivo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_siembra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_cosecha_estimada: Option<String>,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub tiene_riego: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_riego: Option<String>,
    #[serde(default = "default_true")]
    pub activa: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dias_desde_siembra: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistroProduccion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub parcela: i64,
    pub cultivo: i64,
    pub fecha_registro: String,
    pub temporada: String,
    pub cantidad_kg: f64,
    #[serde(default)]
    pub rendimiento_hectarea: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatura_promedio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitacion_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humedad_relativa: Option<f64>,
    #[serde(default)]
    pub anomalia_detectada: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas_anomalia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porcentaje_desviacion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrediccionCosecha {
    pub id: i64,
    pub parcela: i64,
    pub cultivo: i64,
    pub fecha_prediccion: String,
    pub temporada_objetivo: String,
    pub rendimiento_predicho: f64,
    pub confianza_prediccion: f64,
    #[serde(default)]
    pub rango_minimo: Option<f64>,
    #[serde(default)]
    pub rango_maximo: Option<f64>,
    pub modelo_utilizado: String,
    #[serde(default)]
    pub rendimiento_real: Option<f64>,
    #[serde(default)]
    pub precision_prediccion: Option<f64>,
}

/// Request body for `predicciones/crear/`
#[derive(Debug, Clone, Serialize)]
pub struct NuevaPrediccion {
    pub parcela: i64,
    pub temporada_objetivo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStats {
    pub total_parcelas: u64,
    pub parcelas_activas: u64,
    pub total_cultivos: u64,
    pub total_registros_produccion: u64,
    pub produccion_total_kg: f64,
    pub rendimiento_promedio: f64,
    pub area_total_hectareas: f64,
    pub area_cultivada_hectareas: f64,
    pub anomalias_detectadas: u64,
    pub porcentaje_anomalias: f64,
    #[serde(default)]
    pub distribucion_calidades: HashMap<String, u64>,
    #[serde(default)]
    pub crecimiento_mensual: f64,
    #[serde(default)]
    pub eficiencia_promedio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tendencia {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Kpi {
    pub nombre: String,
    pub valor: f64,
    pub unidad: String,
    pub tendencia: Tendencia,
    pub cambio_porcentual: f64,
    #[serde(default)]
    pub descripcion: String,
}

/// Django REST framework page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Collection endpoints answer with a page or, when pagination is off for
/// the view, a bare array
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Paginated<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn total(&self) -> u64 {
        match self {
            Listing::Page(page) => page.count,
            Listing::Plain(items) => items.len() as u64,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.results,
            Listing::Plain(items) => items,
        }
    }
}

/// List filters shared by every collection endpoint
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub extra: Vec<(String, String)>,
}

impl ListParams {
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(ordering) = &self.ordering {
            query.push(("ordering".to_string(), ordering.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("page_size".to_string(), page_size.to_string()));
        }
        query.extend(self.extra.iter().cloned());
        query
    }
}
