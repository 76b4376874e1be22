//! `/api/prices` query parameters
//!
//! Validates the dashboard controls into a `FetchRequest`, display options
//! and the client-held cache epoch (session id plus refresh counter). Anything invalid is an
//! `InvalidRequest` (HTTP 400) before a single upstream call is made.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::cache::CacheEpoch;
use crate::colorscale::ColorScheme;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::presentation::DisplayOptions;
use crate::table::REFERENCE_TZ;
use crate::types::{FetchRequest, Resolution};
use crate::zones;

const MAX_SESSION_LEN: usize = 64;

/// Validated price query
#[derive(Debug, Clone)]
pub struct PriceQuery {
    pub request: FetchRequest,
    pub options: DisplayOptions,
    /// Cache-busting session counter bumped by Refresh
    pub epoch: CacheEpoch,
    /// Resolution was downgraded to hourly for a date before the cutover
    pub resolution_forced: bool,
}

/// Calendar day in the reference zone at `now`
pub fn reference_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&REFERENCE_TZ).date_naive()
}

/// Latest selectable delivery day: tomorrow's auction is published today
pub fn max_selectable_date(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

/// Parse `/api/prices` query pairs.
///
/// A missing `regions` parameter selects the configured defaults; a present
/// but empty one is rejected. Repeated `regions` parameters are concatenated.
pub fn parse_price_query(pairs: &[(String, String)], today: NaiveDate, config: &Config) -> Result<PriceQuery> {
    let mut params: HashMap<&str, &str> = HashMap::new();
    let mut region_parts: Vec<&str> = Vec::new();
    for (key, value) in pairs {
        if key == "regions" {
            region_parts.push(value);
        } else {
            params.insert(key, value);
        }
    }

    let max_date = max_selectable_date(today);
    let date = match params.get("date").map(|d| d.trim()).filter(|d| !d.is_empty()) {
        None => max_date,
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            DashboardError::InvalidRequest(format!("Invalid date: {raw} (expected YYYY-MM-DD)"))
        })?,
    };
    if date > max_date {
        return Err(DashboardError::InvalidRequest(format!(
            "Date {date} is after the latest published day {max_date}"
        )));
    }

    let regions = if region_parts.is_empty() {
        config.default_regions.clone()
    } else {
        zones::parse_region_list(&region_parts.join(","))?
    };
    if regions.is_empty() {
        return Err(DashboardError::InvalidRequest("Please select at least one region".into()));
    }

    let requested = match params.get("resolution").filter(|r| !r.trim().is_empty()) {
        Some(raw) => raw.parse::<Resolution>()?,
        None => Resolution::Hourly,
    };
    let resolution_forced = requested == Resolution::QuarterHourly && date < config.resolution_cutover;
    let resolution = if resolution_forced { Resolution::Hourly } else { requested };

    let scheme_name = params
        .get("colorscale")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(config.default_colorscale.as_str());

    let options = DisplayOptions {
        scheme: ColorScheme::from_name(scheme_name),
        reverse: flag(&params, "reverse", false)?,
        show_heatmap: flag(&params, "heatmap", true)?,
        show_table: flag(&params, "table", true)?,
    };

    let counter = match params.get("epoch").map(|e| e.trim()).filter(|e| !e.is_empty()) {
        None => 0,
        Some(raw) => raw
            .parse()
            .map_err(|_| DashboardError::InvalidRequest(format!("Invalid epoch: {raw}")))?,
    };
    let session = match params.get("session").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) if is_session_id(raw) => Some(raw.to_string()),
        Some(raw) => return Err(DashboardError::InvalidRequest(format!("Invalid session: {raw}"))),
    };
    let epoch = CacheEpoch::new(session, counter);

    Ok(PriceQuery {
        request: FetchRequest { date, regions, resolution },
        options,
        epoch,
        resolution_forced,
    })
}

/// Session ids end up in cache keys: short, URL-safe characters only
fn is_session_id(raw: &str) -> bool {
    raw.len() <= MAX_SESSION_LEN && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn flag(params: &HashMap<&str, &str>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = params.get(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(DashboardError::InvalidRequest(format!("Invalid value for {key}: {other}"))),
    }
}
