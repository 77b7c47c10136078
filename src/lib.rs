pub mod api;
pub mod client;
pub mod configuration;
pub mod credentials;
pub mod error;
pub mod models;
pub mod session;
pub mod telemetry;
pub mod validators;

pub use api::AgroApi;
pub use client::{ApiClient, ApiResponse, LoginRedirect, RequestSpec};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::ApiError;
pub use session::AuthSession;
