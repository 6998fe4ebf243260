//! Configuration types.

use std::time::Duration;

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Assistant name for identification.
    pub name: String,
    /// Model used for all generator calls.
    pub model: String,
    /// Client-side timeout for generator requests. Expiry is reported as
    /// a retryable generation error.
    pub request_timeout: Duration,
    /// Path to the local store database file.
    pub store_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "brand-assist".to_string(),
            model: "gemini-2.5-flash".to_string(),
            request_timeout: Duration::from_secs(60),
            store_path: "./data/brand-assist.db".to_string(),
        }
    }
}
