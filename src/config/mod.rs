//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RANKER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CACHE_CAPACITY, DEFAULT_EMBED_TIMEOUT_MS, DEFAULT_MAX_SEQ_LEN,
    DEFAULT_MODEL_ID,
};
use crate::embedding::EncoderConfig;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RANKER_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// Unset runs the stub encoder.
    pub model_dir: Option<PathBuf>,

    /// Model identity recorded in fingerprints and result sets.
    pub model_id: String,

    /// Token truncation length. Default: `256`.
    pub max_seq_len: usize,

    /// Texts per forward pass. Default: `32`.
    pub batch_size: usize,

    /// Encoding bound per ranking call in milliseconds; `0` disables. Default: `30_000`.
    pub embed_timeout_ms: u64,

    /// Max entries in the embedding cache; `0` disables. Default: `10_000`.
    pub cache_capacity: u64,

    /// Directory for file-backed result sets. Unset keeps results in memory.
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_dir: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            batch_size: DEFAULT_BATCH_SIZE,
            embed_timeout_ms: DEFAULT_EMBED_TIMEOUT_MS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            storage_path: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RANKER_PORT";
    const ENV_BIND_ADDR: &'static str = "RANKER_BIND_ADDR";
    const ENV_MODEL_DIR: &'static str = EncoderConfig::ENV_MODEL_DIR;
    const ENV_MODEL_ID: &'static str = EncoderConfig::ENV_MODEL_ID;
    const ENV_MAX_SEQ_LEN: &'static str = "RANKER_MAX_SEQ_LEN";
    const ENV_BATCH_SIZE: &'static str = "RANKER_BATCH_SIZE";
    const ENV_EMBED_TIMEOUT_MS: &'static str = "RANKER_EMBED_TIMEOUT_MS";
    const ENV_CACHE_CAPACITY: &'static str = "RANKER_CACHE_CAPACITY";
    const ENV_STORAGE_PATH: &'static str = "RANKER_STORAGE_PATH";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Malformed numeric values other than the port fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_dir = Self::parse_optional_path_from_env(Self::ENV_MODEL_DIR);
        let model_id = Self::parse_string_from_env(Self::ENV_MODEL_ID, defaults.model_id);
        let max_seq_len =
            Self::parse_u64_from_env(Self::ENV_MAX_SEQ_LEN, defaults.max_seq_len as u64) as usize;
        let batch_size =
            Self::parse_u64_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size as u64) as usize;
        let embed_timeout_ms =
            Self::parse_u64_from_env(Self::ENV_EMBED_TIMEOUT_MS, defaults.embed_timeout_ms);
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);
        let storage_path = Self::parse_optional_path_from_env(Self::ENV_STORAGE_PATH);

        Ok(Self {
            port,
            bind_addr,
            model_dir,
            model_id,
            max_seq_len,
            batch_size,
            embed_timeout_ms,
            cache_capacity,
            storage_path,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.storage_path
            && path.exists()
            && !path.is_dir()
        {
            return Err(ConfigError::NotADirectory { path: path.clone() });
        }

        if let Some(ref path) = self.model_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if self.model_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MODEL_ID,
                reason: "must not be empty".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_SEQ_LEN,
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BATCH_SIZE,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
        }
    }

    /// Encoder settings: the model directory when set, the stub otherwise.
    pub fn encoder_config(&self) -> EncoderConfig {
        let base = match self.model_dir {
            Some(ref dir) => EncoderConfig::new(dir.clone()).with_model_id(self.model_id.clone()),
            None => EncoderConfig::stub(),
        };

        base.with_max_seq_len(self.max_seq_len)
            .with_batch_size(self.batch_size)
    }

    /// `None` when the timeout is disabled.
    pub fn embed_timeout(&self) -> Option<Duration> {
        (self.embed_timeout_ms > 0).then(|| Duration::from_millis(self.embed_timeout_ms))
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
