use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::services::currency::parse_currency;
use crate::services::tender_filter::TenderFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub analysis: AnalysisConfig,
    pub tenders: TenderFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            token: None,
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 2000, max_polls: 60 }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let api_defaults = ApiConfig::default();
        let analysis_defaults = AnalysisConfig::default();

        let config = Self {
            api: ApiConfig {
                base_url: env_opt("CEIGALL_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(api_defaults.base_url),
                token: env_opt("CEIGALL_API_TOKEN"),
                timeout_secs: env_parse("CEIGALL_API_TIMEOUT_SECS", api_defaults.timeout_secs),
                accept_invalid_certs: env_opt("CEIGALL_ACCEPT_INVALID_CERTS")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(false),
            },
            analysis: AnalysisConfig {
                poll_interval_ms: env_parse("CEIGALL_ANALYSIS_POLL_INTERVAL_MS", analysis_defaults.poll_interval_ms),
                max_polls: env_parse("CEIGALL_ANALYSIS_MAX_POLLS", analysis_defaults.max_polls),
            },
            tenders: TenderFilter {
                search_term: None,
                category: env_opt("CEIGALL_TENDER_CATEGORY"),
                location: env_opt("CEIGALL_TENDER_LOCATION"),
                min_value: env_opt("CEIGALL_TENDER_MIN_VALUE").and_then(|v| parse_currency(&v).amount()),
                max_value: env_opt("CEIGALL_TENDER_MAX_VALUE").and_then(|v| parse_currency(&v).amount()),
            },
        };

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new().expect("Failed to create default config")
    }
}
