use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const STORE_BACKEND_VAR: &str = "SPENDWISE_STORE_BACKEND";

const DB_USERNAME_VAR: &str = "SPENDWISE_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "SPENDWISE_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "SPENDWISE_DB_HOSTNAME";
const DB_PORT_VAR: &str = "SPENDWISE_DB_PORT";
const DB_NAME_VAR: &str = "SPENDWISE_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "SPENDWISE_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "SPENDWISE_DB_IDLE_TIMEOUT_SECS";
const DB_CONNECTION_TIMEOUT_SECS_VAR: &str = "SPENDWISE_DB_CONNECTION_TIMEOUT_SECS";

const TOKEN_SIGNING_KEY_VAR: &str = "SPENDWISE_TOKEN_SIGNING_KEY_B64";
const HEALTH_ENDPOINT_KEY_VAR: &str = "SPENDWISE_HEALTH_ENDPOINT_KEY";

const ACTIX_WORKER_COUNT_VAR: &str = "SPENDWISE_ACTIX_WORKER_COUNT";
const MAX_REPORT_WEEKS_VAR: &str = "SPENDWISE_MAX_REPORT_WEEKS";
const LOG_LEVEL_VAR: &str = "SPENDWISE_LOG_LEVEL";

const MIN_TOKEN_SIGNING_KEY_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Zeroize)]
pub struct DbConfig {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub name: String,
    #[zeroize(skip)]
    pub max_connections: u32,
    #[zeroize(skip)]
    pub idle_timeout: Duration,
    #[zeroize(skip)]
    pub connection_timeout: Duration,
}

impl DbConfig {
    pub fn database_uri(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.name,
        ))
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(DbConfig {
            username: env_var(DB_USERNAME_VAR)?,
            password: env_var(DB_PASSWORD_VAR)?,
            hostname: env_var(DB_HOSTNAME_VAR)?,
            port: env_var(DB_PORT_VAR)?,
            name: env_var(DB_NAME_VAR)?,
            max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),
            connection_timeout: Duration::from_secs(env_var_or(
                DB_CONNECTION_TIMEOUT_SECS_VAR,
                10,
            )),
        })
    }
}

/// Built once at startup and shared with handlers as `web::Data<Config>`. Secrets are wiped
/// when the last reference is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Config {
    #[zeroize(skip)]
    pub store_backend: StoreBackend,
    /// Only present for the Postgres backend
    pub db: Option<DbConfig>,

    pub token_signing_key: Vec<u8>,
    pub health_endpoint_key: String,

    #[zeroize(skip)]
    pub actix_worker_count: usize,
    #[zeroize(skip)]
    pub max_report_weeks: u32,
    #[zeroize(skip)]
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let store_backend = optional_env_var(STORE_BACKEND_VAR, StoreBackend::Postgres)?;

        let db = match store_backend {
            StoreBackend::Postgres => Some(DbConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        let token_signing_key = Zeroizing::new(env_var::<String>(TOKEN_SIGNING_KEY_VAR)?);
        let token_signing_key = b64
            .decode(token_signing_key.as_bytes())
            .map_err(|_| ConfigError::invalid(TOKEN_SIGNING_KEY_VAR))?;

        if token_signing_key.len() < MIN_TOKEN_SIGNING_KEY_SIZE {
            return Err(ConfigError::invalid(TOKEN_SIGNING_KEY_VAR));
        }

        let health_endpoint_key: String = env_var(HEALTH_ENDPOINT_KEY_VAR)?;
        if health_endpoint_key.is_empty() {
            return Err(ConfigError::invalid(HEALTH_ENDPOINT_KEY_VAR));
        }

        let max_report_weeks = optional_env_var(MAX_REPORT_WEEKS_VAR, 52)?;
        if max_report_weeks == 0 {
            return Err(ConfigError::invalid(MAX_REPORT_WEEKS_VAR));
        }

        Ok(Config {
            store_backend,
            db,
            token_signing_key,
            health_endpoint_key,
            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            max_report_weeks,
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        })
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

/// Like `env_var`, but an unset variable falls back to `default`. A set but malformed value is
/// still an error.
fn optional_env_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value.parse().map_err(|_| ConfigError::invalid(key)),
        None => Ok(default),
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
