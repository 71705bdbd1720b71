//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Smallest accepted token size; 16 bytes is 128 bits of entropy.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Upper bound accepted for `max_ttl_days` (100 years).
pub const MAX_TTL_DAYS: i64 = 36_500;

/// Share link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// TTL applied when a caller does not choose one.
    #[serde(default = "default_ttl_days")]
    pub default_ttl_days: i64,
    /// Longest TTL a caller may request.
    #[serde(default = "default_max_ttl_days")]
    pub max_ttl_days: i64,
    /// Random bytes per token before encoding.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_ttl_days: default_ttl_days(),
            max_ttl_days: default_max_ttl_days(),
            token_bytes: default_token_bytes(),
        }
    }
}

fn default_ttl_days() -> i64 {
    7
}

fn default_max_ttl_days() -> i64 {
    365
}

fn default_token_bytes() -> usize {
    32
}
