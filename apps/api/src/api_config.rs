use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use atrium_core::AppError;
use tracing_subscriber::EnvFilter;

const MIN_SIGN_IN_HOOK_TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database: Option<DatabaseConfig>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub sign_in_hook_token: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database = database_config()?;
        if migrate_only && database.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let sign_in_hook_token = required_env("SIGN_IN_HOOK_TOKEN")?;
        if sign_in_hook_token.len() < MIN_SIGN_IN_HOOK_TOKEN_LENGTH {
            return Err(AppError::Validation(format!(
                "SIGN_IN_HOOK_TOKEN must be at least {MIN_SIGN_IN_HOOK_TOKEN_LENGTH} characters"
            )));
        }

        Ok(Self {
            migrate_only,
            database,
            frontend_url,
            api_host,
            api_port,
            sign_in_hook_token,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn database_config() -> Result<Option<DatabaseConfig>, AppError> {
    let Some(url) = optional_non_empty_env("DATABASE_URL") else {
        return Ok(None);
    };

    let max_connections = match optional_non_empty_env("DATABASE_MAX_CONNECTIONS") {
        Some(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
        })?,
        None => 10,
    };

    Ok(Some(DatabaseConfig {
        url,
        max_connections,
    }))
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
