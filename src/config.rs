//! Configuration management for the price dashboard

use chrono::NaiveDate;
use worker::Env;

use crate::colorscale::DEFAULT_SCHEME;
use crate::error::{DashboardError, Result};
use crate::zones;

/// Workers KV rejects shorter expiration TTLs
const MIN_CACHE_TTL_SECONDS: u64 = 60;

const DEFAULT_BASE_URL: &str = "https://web-api.tp.entsoe.eu";

/// SDAC switched to 15-minute products on this delivery day
const DEFAULT_CUTOVER: &str = "2025-10-01";

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (production, staging, development)
    pub environment: String,

    /// Log level
    pub log_level: String,

    /// ENTSO-E security token
    pub api_token: String,

    /// ENTSO-E REST base URL
    pub base_url: String,

    /// Freshness window for cached outcomes
    pub cache_ttl_seconds: u64,

    /// Regions pre-selected in the picker
    pub default_regions: Vec<String>,

    /// First delivery day offered at 15-minute resolution
    pub resolution_cutover: NaiveDate,

    /// Colour scheme pre-selected in the picker
    pub default_colorscale: String,
}

impl Config {
    /// Load configuration from Cloudflare environment variables and secrets
    pub fn from_env(env: &Env) -> Result<Self> {
        Self::from_lookup(|key| {
            env.secret(key)
                .or_else(|_| env.var(key))
                .ok()
                .map(|v| v.to_string())
        })
    }

    /// Build configuration from any key lookup (env bindings, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup("ENTSOE_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                DashboardError::Config(
                    "ENTSO-E API token not found. Set the ENTSOE_TOKEN secret \
                     (wrangler secret put ENTSOE_TOKEN)."
                        .into(),
                )
            })?;

        let cutover_raw = lookup("RESOLUTION_CUTOVER_DATE").unwrap_or_else(|| DEFAULT_CUTOVER.to_string());
        let resolution_cutover = NaiveDate::parse_from_str(cutover_raw.trim(), "%Y-%m-%d").map_err(|_| {
            DashboardError::Config(format!("RESOLUTION_CUTOVER_DATE is not a date: {cutover_raw}"))
        })?;

        // Published prices for a day do not change
        let cache_ttl_seconds = match lookup("CACHE_TTL_SECONDS") {
            None => 3600,
            Some(raw) => raw.trim().parse().map_err(|_| {
                DashboardError::Config(format!("CACHE_TTL_SECONDS is not a number of seconds: {raw}"))
            })?,
        };

        let default_regions = lookup("DEFAULT_REGIONS")
            .map(|v| zones::parse_region_list(&v))
            .transpose()
            .map_err(|e| DashboardError::Config(format!("DEFAULT_REGIONS: {e}")))?
            .unwrap_or_else(|| {
                ["CZ", "DE_LU", "FR", "SK", "PL", "AT"]
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            });

        let config = Self {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "production".to_string()),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            api_token,

            base_url: lookup("ENTSOE_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),

            cache_ttl_seconds,

            default_regions,

            resolution_cutover,

            default_colorscale: lookup("DEFAULT_COLORSCALE").unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_seconds < MIN_CACHE_TTL_SECONDS {
            return Err(DashboardError::Config(format!(
                "cache_ttl_seconds must be at least {MIN_CACHE_TTL_SECONDS}"
            )));
        }
        if self.default_regions.is_empty() {
            return Err(DashboardError::Config("At least one default region required".into()));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(DashboardError::Config(format!("Invalid ENTSOE_BASE_URL: {}", self.base_url)));
        }
        Ok(())
    }

    pub fn is_debug(&self) -> bool {
        self.log_level.eq_ignore_ascii_case("debug")
    }
}
