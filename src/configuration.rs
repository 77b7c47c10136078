use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    pub credentials: CredentialSettings,
}

/// Backend location and the auth endpoints the client talks to directly
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub login_path: String,
    pub register_path: String,
    pub refresh_path: String,
    pub profile_path: String,
    pub change_password_path: String,
    /// Transport timeout; unset means reqwest's default (none)
    pub timeout_secs: Option<u64>,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: "/auth/login/".to_string(),
            register_path: "/auth/register/".to_string(),
            refresh_path: "/auth/refresh/".to_string(),
            profile_path: "/auth/profile/".to_string(),
            change_password_path: "/auth/change-password/".to_string(),
            timeout_secs: None,
        }
    }

    /// Absolute URL for a backend path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct CredentialSettings {
    pub path: PathBuf,
}

/// Load settings from `configuration.{yaml,toml,json}` (optional) and
/// `AGROCONTROL__SECTION__KEY` environment variables.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("api.base_url", "http://localhost:8000/api")?
        .set_default("api.login_path", "/auth/login/")?
        .set_default("api.register_path", "/auth/register/")?
        .set_default("api.refresh_path", "/auth/refresh/")?
        .set_default("api.profile_path", "/auth/profile/")?
        .set_default("api.change_password_path", "/auth/change-password/")?
        .set_default("credentials.path", ".agrocontrol/credentials.json")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("AGROCONTROL")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
