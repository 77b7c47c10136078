use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

use agrocontrol::configuration::get_configuration;
use agrocontrol::credentials::FileCredentialStore;
use agrocontrol::session::LoginCredentials;
use agrocontrol::telemetry::init_telemetry;
use agrocontrol::{AgroApi, ApiClient, ApiError, AuthSession};

/// Command-line client for the agricultural control backend
#[derive(Debug, Parser)]
#[command(name = "agrocontrol", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AGROCONTROL_PASSWORD")]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user, reconfirming the session with the backend.
    Whoami,
    /// GET any backend path and print the JSON answer.
    Get {
        path: String,
        /// Query parameter as key=value; repeatable.
        #[arg(long = "query", value_parser = parse_query_pair)]
        query: Vec<(String, String)>,
    },
    /// Print the dashboard summary.
    Dashboard,
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_telemetry();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ApiError> {
    let configuration = get_configuration().map_err(|e| {
        tracing::error!("Failed to read configuration: {}", e);
        ApiError::Config(e.to_string())
    })?;

    let store = Arc::new(FileCredentialStore::open(&configuration.credentials.path));
    tracing::debug!(path = %store.path().display(), "Using credential file");

    let client = ApiClient::new(
        configuration.api,
        store,
        Arc::new(|| {
            tracing::warn!("Session expired");
            eprintln!("Session expired. Run `agrocontrol login` again.");
        }),
    )?;
    let session = AuthSession::new(client.clone());

    match cli.command {
        Command::Login { email, password } => {
            let user = session.login(&LoginCredentials { email, password }).await?;
            println!("Logged in as {} ({:?})", user.display_name(), user.role);
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match session.restore().await? {
            Some(user) => print_json(&user)?,
            None => println!("Not logged in"),
        },
        Command::Get { path, query } => {
            let api = AgroApi::new(client);
            let body: Value = api.request(Method::GET, &path, None, query).await?;
            print_json(&body)?;
        }
        Command::Dashboard => {
            let api = AgroApi::new(client);
            print_json(&api.dashboard().completo().await?)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ApiError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| ApiError::Encode(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
