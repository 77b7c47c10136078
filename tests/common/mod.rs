#![allow(dead_code)]

use std::collections::HashSet;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use std::sync::{Arc, Mutex};

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

use agrocontrol::configuration::ApiSettings;
use agrocontrol::credentials::{CredentialStore, MemoryCredentialStore, StoredCredentials};
use agrocontrol::error::CredentialError;
use agrocontrol::models::User;
use agrocontrol::ApiClient;

pub const PASSWORD: &str = "Cosecha2024";
pub const LOGIN_ACCESS: &str = "tok1";
pub const REFRESH: &str = "ref1";

/// Fake backend state. Tokens in `access_tokens` are accepted; refresh
/// number n issues access token `tok{n+1}`.
pub struct BackendState {
    access_tokens: Mutex<HashSet<String>>,
    refresh_token: Mutex<String>,
    pub refresh_calls: AtomicUsize,
    pub refresh_fails: AtomicBool,
    pub rotate_refresh: AtomicBool,
    /// Answer refresh with 200 and a body without an access token
    pub refresh_malformed: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    /// Non-zero forces this status on the profile endpoint
    pub profile_status: AtomicU16,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            access_tokens: Mutex::new(HashSet::new()),
            refresh_token: Mutex::new(REFRESH.to_string()),
            refresh_calls: AtomicUsize::new(0),
            refresh_fails: AtomicBool::new(false),
            rotate_refresh: AtomicBool::new(false),
            refresh_malformed: AtomicBool::new(false),
            refresh_delay_ms: AtomicU64::new(0),
            profile_status: AtomicU16::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl BackendState {
    pub fn grant(&self, token: &str) {
        self.access_tokens.lock().unwrap().insert(token.to_string());
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Authorization headers seen for `path`, in arrival order
    pub fn auth_headers_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, auth)| auth.clone())
            .collect()
    }

    fn record(&self, req: &HttpRequest) {
        let auth = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen
            .lock()
            .unwrap()
            .push((req.path().to_string(), auth));
    }

    fn authorized(&self, req: &HttpRequest) -> bool {
        bearer(req)
            .map(|token| self.access_tokens.lock().unwrap().contains(&token))
            .unwrap_or(false)
    }
}

fn bearer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn token_not_valid() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid"
    }))
}

pub fn user_json() -> Value {
    json!({
        "id": 7,
        "username": "mgarcia",
        "email": "maria@agro.test",
        "first_name": "María",
        "last_name": "García",
        "full_name": "María García",
        "role": "manager",
        "is_active": true,
        "created_at": "2024-03-01T10:00:00Z"
    })
}

pub fn sample_user() -> User {
    serde_json::from_value(user_json()).unwrap()
}

async fn login(state: web::Data<BackendState>, body: web::Json<Value>) -> HttpResponse {
    if body["password"] != PASSWORD {
        return HttpResponse::Unauthorized().json(json!({"error": "Credenciales inválidas"}));
    }
    state.grant(LOGIN_ACCESS);
    HttpResponse::Ok().json(json!({
        "access": LOGIN_ACCESS,
        "refresh": state.refresh_token.lock().unwrap().clone(),
        "user": user_json()
    }))
}

async fn register(state: web::Data<BackendState>, body: web::Json<Value>) -> HttpResponse {
    if body["email"] == "taken@agro.test" {
        return HttpResponse::BadRequest().json(json!({"email": ["already registered"]}));
    }
    state.grant(LOGIN_ACCESS);
    let mut user = user_json();
    user["username"] = body["username"].clone();
    user["email"] = body["email"].clone();
    HttpResponse::Created().json(json!({
        "accessToken": LOGIN_ACCESS,
        "refreshToken": state.refresh_token.lock().unwrap().clone(),
        "user": user
    }))
}

async fn refresh(state: web::Data<BackendState>, body: web::Json<Value>) -> HttpResponse {
    let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if state.refresh_fails.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({"detail": "refresh unavailable"}));
    }

    if state.refresh_malformed.load(Ordering::SeqCst) {
        return HttpResponse::Ok().json(json!({"token": "missing-access-field"}));
    }

    let mut current = state.refresh_token.lock().unwrap();
    if body["refresh"].as_str() != Some(current.as_str()) {
        return HttpResponse::Unauthorized()
            .json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}));
    }

    let access = format!("tok{}", n + 1);
    state.grant(&access);
    let mut answer = json!({ "access": access });
    if state.rotate_refresh.load(Ordering::SeqCst) {
        let rotated = format!("ref{}", n + 1);
        *current = rotated.clone();
        answer["refresh"] = json!(rotated);
    }
    HttpResponse::Ok().json(answer)
}

async fn profile(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    state.record(&req);
    let forced = state.profile_status.load(Ordering::SeqCst);
    if forced != 0 {
        let status = StatusCode::from_u16(forced).unwrap();
        return HttpResponse::build(status).json(json!({"detail": "forced by test"}));
    }
    if !state.authorized(&req) {
        return token_not_valid();
    }
    HttpResponse::Ok().json(user_json())
}

/// Everything else: bearer-protected echo endpoint, plus a few fixed paths
async fn protected(
    req: HttpRequest,
    state: web::Data<BackendState>,
    body: web::Bytes,
) -> HttpResponse {
    state.record(&req);
    let path = req.path().to_string();

    if path == "/api/always-401/" || !state.authorized(&req) {
        return token_not_valid();
    }

    match path.as_str() {
        "/api/missing/" => HttpResponse::NotFound().json(json!({"error": "No encontrado"})),
        "/api/broken/" => HttpResponse::InternalServerError().body("upstream exploded"),
        p if req.method() == actix_web::http::Method::DELETE && p.starts_with("/api/cultivos/") => {
            HttpResponse::NoContent().finish()
        }
        "/api/cultivos/" if req.method() == actix_web::http::Method::GET => {
            HttpResponse::Ok().json(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{
                    "id": 1, "nombre": "Maíz", "variedad": "Amarillo", "tipo": "cereal",
                    "ciclo_dias": 120, "rendimiento_esperado": 8.5
                }]
            }))
        }
        "/api/dashboard/kpis/" => HttpResponse::Ok().json(json!([{
            "nombre": "Rendimiento", "valor": 8.2, "unidad": "t/ha",
            "tendencia": "up", "cambio_porcentual": 4.5
        }])),
        _ => HttpResponse::Ok().json(json!({
            "path": path,
            "method": req.method().as_str(),
            "query": req.query_string(),
            "body": serde_json::from_slice::<Value>(&body).ok(),
        })),
    }
}

pub struct TestBackend {
    pub address: String,
    pub state: web::Data<BackendState>,
}

pub async fn spawn_backend() -> TestBackend {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}/api", port);

    let state = web::Data::new(BackendState::default());
    let server_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .route("/api/auth/login/", web::post().to(login))
            .route("/api/auth/register/", web::post().to(register))
            .route("/api/auth/refresh/", web::post().to(refresh))
            .route("/api/auth/profile/", web::get().to(profile))
            .default_service(web::to(protected))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to bind address")
    .run();
    let _ = tokio::spawn(server);

    TestBackend { address, state }
}

/// Memory store that counts `clear_all` calls
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryCredentialStore,
    pub clears: AtomicUsize,
}

impl CountingStore {
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: MemoryCredentialStore::with_credentials(credentials),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    fn read(&self) -> StoredCredentials {
        self.inner.read()
    }

    fn write_tokens(&self, access: &str, refresh: &str) -> Result<(), CredentialError> {
        self.inner.write_tokens(access, refresh)
    }

    fn write_access_token(&self, access: &str) -> Result<(), CredentialError> {
        self.inner.write_access_token(access)
    }

    fn write_identity(&self, user: &User) -> Result<(), CredentialError> {
        self.inner.write_identity(user)
    }

    fn clear_all(&self) -> Result<(), CredentialError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear_all()
    }
}

pub struct TestClient {
    pub backend: TestBackend,
    pub client: ApiClient,
    pub store: Arc<CountingStore>,
    pub redirects: Arc<AtomicUsize>,
}

impl TestClient {
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

pub fn stored(access: Option<&str>, refresh: Option<&str>) -> StoredCredentials {
    StoredCredentials {
        access_token: access.map(str::to_string),
        refresh_token: refresh.map(str::to_string),
        user: Some(sample_user()),
    }
}

/// Backend plus a client whose store starts with `credentials`
pub async fn spawn_client(credentials: StoredCredentials) -> TestClient {
    spawn_client_with(credentials, |_| {}).await
}

pub async fn spawn_client_with(
    credentials: StoredCredentials,
    configure: impl FnOnce(&mut ApiSettings),
) -> TestClient {
    let backend = spawn_backend().await;
    let mut settings = ApiSettings::new(backend.address.clone());
    configure(&mut settings);
    let store = Arc::new(CountingStore::with_credentials(credentials));
    let redirects = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&redirects);
    let client = ApiClient::new(
        settings,
        store.clone(),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .expect("Failed to build client");

    TestClient {
        backend,
        client,
        store,
        redirects,
    }
}
