//! Common types for the price dashboard
//!
//! All shared data structures used across modules.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::table::PriceTable;

/// Delivery slot granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "60min")]
    Hourly,
    #[serde(rename = "15min")]
    QuarterHourly,
}

impl Resolution {
    /// Slot length in minutes
    pub fn minutes(self) -> i64 {
        match self {
            Resolution::Hourly => 60,
            Resolution::QuarterHourly => 15,
        }
    }

    /// Rows in a normalized day
    pub fn slots_per_day(self) -> i32 {
        match self {
            Resolution::Hourly => 24,
            Resolution::QuarterHourly => 96,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Hourly => "60min",
            Resolution::QuarterHourly => "15min",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "60min" | "60" | "hourly" | "pt60m" => Ok(Resolution::Hourly),
            "15min" | "15" | "quarter-hourly" | "pt15m" => Ok(Resolution::QuarterHourly),
            other => Err(DashboardError::InvalidRequest(format!(
                "Unknown resolution: {other} (expected 60min or 15min)"
            ))),
        }
    }
}

/// One upstream price at the start of its delivery slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    /// EUR/MWh, may be negative
    pub price: f64,
}

/// Upstream answer for one region, ordered by time
pub type PriceSeries = Vec<PricePoint>;

/// Severity of a status trail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Warning,
    Error,
}

/// Human-readable outcome of one region's fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub region: String,
    pub message: String,
}

impl StatusMessage {
    pub fn success(region: &str, message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Success, region: region.to_string(), message: message.into() }
    }

    pub fn warning(region: &str, message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Warning, region: region.to_string(), message: message.into() }
    }

    pub fn error(region: &str, message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Error, region: region.to_string(), message: message.into() }
    }
}

/// Inputs of one fetch-and-normalize run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    pub date: NaiveDate,
    /// Ordered, unique zone codes
    pub regions: Vec<String>,
    pub resolution: Resolution,
}

/// Result of fetching every requested region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub table: PriceTable,
    /// Regions without data, in request order
    pub failed_regions: Vec<String>,
    /// Status trail in request order
    pub statuses: Vec<StatusMessage>,
}

impl FetchOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failed_regions.is_empty()
    }

    /// Record a region as failed, once
    pub fn record_failure(&mut self, region: &str, status: StatusMessage) {
        if !self.failed_regions.iter().any(|r| r == region) {
            self.failed_regions.push(region.to_string());
        }
        self.statuses.push(status);
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parsing() {
        assert_eq!("60min".parse::<Resolution>().expect("hourly"), Resolution::Hourly);
        assert_eq!("PT15M".parse::<Resolution>().expect("quarter"), Resolution::QuarterHourly);
        assert_eq!(" 15 ".parse::<Resolution>().expect("quarter"), Resolution::QuarterHourly);
        assert!("5min".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_resolution_serde_names() {
        let json = serde_json::to_string(&Resolution::QuarterHourly).expect("serialize");
        assert_eq!(json, "\"15min\"");
        let back: Resolution = serde_json::from_str("\"60min\"").expect("deserialize");
        assert_eq!(back, Resolution::Hourly);
    }

    #[test]
    fn test_record_failure_once() {
        let mut outcome = FetchOutcome::default();
        outcome.record_failure("DE_LU", StatusMessage::error("DE_LU", "boom"));
        outcome.record_failure("DE_LU", StatusMessage::warning("DE_LU", "empty"));

        assert_eq!(outcome.failed_regions, vec!["DE_LU"]);
        assert_eq!(outcome.statuses.len(), 2);
        assert!(outcome.has_failures());
    }

    #[test]
    fn test_status_level_serialization() {
        let status = StatusMessage::success("CZ", "Loaded 24 prices");
        let json = serde_json::to_string(&status).expect("serialize");
        assert!(json.contains("\"level\":\"success\""));
    }
}
