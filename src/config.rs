use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_MB: usize = 20;
const EXPORT_CACHE_TTL: u64 = 60 * 60; // 1 hour in seconds
const EXPORT_CACHE_CAPACITY: usize = 64;

pub const ENV_BIND: &str = "ASSEMBLY_BIND";
pub const ENV_MAX_UPLOAD_MB: &str = "ASSEMBLY_MAX_UPLOAD_MB";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid ASSEMBLY_BIND value '{0}', expected host:port")]
    InvalidBind(String),

    #[error("invalid ASSEMBLY_MAX_UPLOAD_MB value '{0}', expected a positive integer")]
    InvalidUploadLimit(String),
}

/// Runtime settings of the dashboard service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// TCP port to listen on
    pub port: u16,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,

    /// How long an upload stays available for re-export
    pub export_ttl: Duration,

    /// Upper bound on uploads kept for re-export
    pub export_cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            export_ttl: Duration::from_secs(EXPORT_CACHE_TTL),
            export_cache_capacity: EXPORT_CACHE_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from command line arguments and the environment
    ///
    /// Positional arguments are `<host> <port>` (both optional). Environment
    /// variables override them.
    ///
    /// # Arguments
    /// * `args` - Arguments after the program name
    /// * `env` - Lookup for environment variables (`std::env::var(..).ok()` in the binary)
    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(host) = args.first() {
            config.host = host.clone();
        }
        if let Some(port) = args.get(1) {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        if let Some(bind) = env(ENV_BIND) {
            let (host, port) = bind
                .rsplit_once(':')
                .ok_or_else(|| ConfigError::InvalidBind(bind.clone()))?;
            if host.is_empty() {
                return Err(ConfigError::InvalidBind(bind.clone()));
            }
            config.host = host.to_string();
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidBind(bind.clone()))?;
        }

        if let Some(limit) = env(ENV_MAX_UPLOAD_MB) {
            let mb: usize = limit
                .parse()
                .ok()
                .filter(|mb| *mb > 0)
                .ok_or_else(|| ConfigError::InvalidUploadLimit(limit.clone()))?;
            config.max_upload_bytes = mb * 1024 * 1024;
        }

        Ok(config)
    }

    /// `host:port` to hand to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
