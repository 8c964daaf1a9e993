use std::env;

use fg_common::Secret;
use log::*;
use rand::{distributions::Alphanumeric, Rng};

const DEFAULT_FG_HOST: &str = "127.0.0.1";
const DEFAULT_FG_PORT: u16 = 8470;
const DEFAULT_SUCCESS_RATE: f64 = 0.9;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Fraction of settlement attempts the stand-in gateway approves.
    pub settlement_success_rate: f64,
    pub auth: AuthConfig,
}

/// Configuration for verifying the identity headers forwarded by the upstream authentication gateway.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub hmac_secret: Secret<String>,
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { hmac_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, env::VarError> {
        let secret = env::var("FG_AUTH_SECRET")?;
        Ok(Self::new(secret))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FG_HOST.to_string(),
            port: DEFAULT_FG_PORT,
            database_url: String::default(),
            settlement_success_rate: DEFAULT_SUCCESS_RATE,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FG_HOST").ok().unwrap_or_else(|| DEFAULT_FG_HOST.into());
        let port = env::var("FG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for FG_PORT. {e} Using the default, {DEFAULT_FG_PORT}, instead.");
                    DEFAULT_FG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FG_PORT);
        let database_url = env::var("FG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ FG_DATABASE_URL is not set. Please set it to the URL for the FarmGate database.");
            String::default()
        });
        let settlement_success_rate = env::var("FG_SUCCESS_RATE")
            .ok()
            .and_then(|s| {
                s.parse::<f64>()
                    .map_err(|e| {
                        warn!("🪛️ {s} is not a valid value for FG_SUCCESS_RATE. {e} Using the default instead.");
                        e
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_SUCCESS_RATE);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|_| {
            let secret: String = rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();
            warn!(
                "🪛️ FG_AUTH_SECRET is not set. A random secret has been generated for this run; the upstream \
                 gateway will not be able to sign identity headers until a shared secret is configured."
            );
            AuthConfig::new(secret)
        });
        Self { host, port, database_url, settlement_success_rate, auth }
    }
}
