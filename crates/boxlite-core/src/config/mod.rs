//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section falls back to defaults so an empty
//! configuration is valid.

pub mod logging;
pub mod share;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::share::ShareConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `BOXLITE_` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// File content storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Share link settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `{dir}/default.toml`, an optional `{dir}/{env}.toml`
    /// overlay, and environment variables such as
    /// `BOXLITE_STORAGE__PROVIDER=local`.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BOXLITE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would weaken share tokens or break uploads.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.share.token_bytes < share::MIN_TOKEN_BYTES {
            return Err(AppError::configuration(format!(
                "share.token_bytes must be at least {} (got {})",
                share::MIN_TOKEN_BYTES,
                self.share.token_bytes
            )));
        }
        if self.share.max_ttl_days <= 0 || self.share.max_ttl_days > share::MAX_TTL_DAYS {
            return Err(AppError::configuration(format!(
                "share.max_ttl_days must be within 1..={} (got {})",
                share::MAX_TTL_DAYS,
                self.share.max_ttl_days
            )));
        }
        if self.share.default_ttl_days <= 0 || self.share.default_ttl_days > self.share.max_ttl_days
        {
            return Err(AppError::configuration(format!(
                "share.default_ttl_days must be within 1..={}",
                self.share.max_ttl_days
            )));
        }
        if self.storage.max_upload_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_upload_size_bytes must be positive",
            ));
        }
        Ok(())
    }
}
