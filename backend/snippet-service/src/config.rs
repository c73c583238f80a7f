/// Configuration management for snippet-service
///
/// Loads configuration from environment variables with development defaults.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// REST fallback API configuration
    pub api: ApiConfig,
    /// Feed/query defaults
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
}

/// REST fallback API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

/// Feed/query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Default result cap for public feed queries
    pub default_limit: usize,
    /// Minimum query length before a search is issued
    pub search_min_chars: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            search_min_chars: 2,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig { env: app_env },
            api: ApiConfig {
                base_url: std::env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/api".to_string()),
                timeout_ms: std::env::var("API_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10_000),
            },
            feed: FeedConfig {
                default_limit: std::env::var("FEED_DEFAULT_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20),
                search_min_chars: std::env::var("SEARCH_MIN_CHARS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2),
            },
        })
    }
}
