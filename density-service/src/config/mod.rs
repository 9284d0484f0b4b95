use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct DensityConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub history: HistoryConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    Memory,
    Mongo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub local_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub debug_auth: bool,
    /// `token:subject` pairs accepted when `debug_auth` is on.
    pub debug_tokens: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub max_image_bytes: usize,
}

impl DensityConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: HistoryBackend = get_env("HISTORY_BACKEND", Some("memory"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let mongodb_uri = match backend {
            HistoryBackend::Mongo => Some(get_env("MONGODB_URI", None, is_prod)?),
            HistoryBackend::Memory => env::var("MONGODB_URI").ok(),
        };

        let jwt_secret = if is_prod {
            Some(get_env("AUTH_JWT_SECRET", None, is_prod)?)
        } else {
            env::var("AUTH_JWT_SECRET").ok()
        };

        let max_image_bytes = match env::var("ANALYSIS_MAX_IMAGE_BYTES") {
            Ok(raw) => raw.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Invalid ANALYSIS_MAX_IMAGE_BYTES '{}': {}",
                    raw,
                    e
                ))
            })?,
            Err(_) => DEFAULT_MAX_IMAGE_BYTES,
        };

        Ok(DensityConfig {
            common: common_config,
            history: HistoryConfig {
                backend,
                mongodb_uri,
                mongodb_database: get_env("MONGODB_DATABASE", Some("density_db"), false)?,
            },
            storage: StorageConfig {
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), false)?,
            },
            auth: AuthConfig {
                jwt_secret,
                debug_auth: parse_flag(env::var("DEBUG_AUTH").ok().as_deref()),
                debug_tokens: env::var("DEBUG_AUTH_TOKENS").ok(),
            },
            analysis: AnalysisConfig { max_image_bytes },
        })
    }
}

impl std::str::FromStr for HistoryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(HistoryBackend::Memory),
            "mongo" | "mongodb" => Ok(HistoryBackend::Mongo),
            _ => Err(format!("Invalid history backend: {}", s)),
        }
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
