//! ENTSO-E Transparency Platform client
//!
//! Implements the day-ahead price query (document type A44) for:
//! - Building the REST query for one bidding zone and UTC window
//! - Publication documents (time series → periods → points)
//! - Acknowledgement documents ("No matching data found" and real errors)
//!
//! The service answers in XML only. Parsing is kept pure so it can be tested
//! against captured documents.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::{DashboardError, Result};
use crate::fetch::PriceSource;
use crate::types::{PricePoint, PriceSeries, Resolution};
use crate::zones;

/// Day-ahead prices
const DOCUMENT_TYPE: &str = "A44";

/// Acknowledgement reason for an empty result
const NO_DATA_REASON: &str = "999";

/// Curve type whose omitted positions repeat the previous point
const CURVE_VARIABLE_BLOCKS: &str = "A03";

/// Query window format, always UTC
const PERIOD_FORMAT: &str = "%Y%m%d%H%M";

/// ENTSO-E API client
pub struct EntsoeClient {
    token: String,
    base_url: String,
}

/// Publication or acknowledgement document.
///
/// Both share one shape here: a publication carries `TimeSeries`, an
/// acknowledgement carries `Reason`. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct MarketDocument {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeries>,
    #[serde(rename = "Reason", default)]
    reasons: Vec<Reason>,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(rename = "curveType", default)]
    curve_type: Option<String>,
    #[serde(rename = "Period", default)]
    periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    #[serde(rename = "timeInterval")]
    time_interval: TimeInterval,
    resolution: String,
    #[serde(rename = "Point", default)]
    points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct TimeInterval {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct Point {
    /// 1-based slot within the period
    position: i64,
    #[serde(rename = "price.amount")]
    price: f64,
}

#[derive(Debug, Deserialize)]
struct Reason {
    code: String,
    #[serde(default)]
    text: String,
}

impl MarketDocument {
    fn is_no_data(&self) -> bool {
        self.time_series.is_empty() && self.reasons.iter().any(|r| r.code == NO_DATA_REASON)
    }
}

impl EntsoeClient {
    /// Create new client for `base_url` with the security token
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self { token: token.into(), base_url: base_url.into() }
    }

    /// Day-ahead query for one zone over `[start, end)`
    pub fn query_url(&self, eic: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{}/api?securityToken={}&documentType={DOCUMENT_TYPE}&in_Domain={eic}&out_Domain={eic}&periodStart={}&periodEnd={}",
            self.base_url,
            self.token,
            start.format(PERIOD_FORMAT),
            end.format(PERIOD_FORMAT),
        )
    }

    /// Perform GET request, returning the XML body
    async fn get(&self, url: &str) -> Result<String> {
        let response = reqwest::Client::new()
            .get(url)
            .header("Accept", "application/xml")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response, checking for errors
    async fn handle_response(response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(DashboardError::RateLimit(retry_after));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());

            // Empty results are sometimes acknowledged with HTTP 400
            if quick_xml::de::from_str::<MarketDocument>(&error_text).is_ok_and(|doc| doc.is_no_data()) {
                return Ok(error_text);
            }
            return Err(DashboardError::Upstream(format!("HTTP {status}: {}", error_text.trim())));
        }

        response.text().await.map_err(DashboardError::from)
    }
}

impl PriceSource for EntsoeClient {
    async fn day_ahead_prices(
        &self,
        region: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<PriceSeries> {
        let zone = zones::lookup(region)
            .ok_or_else(|| DashboardError::InvalidRequest(format!("Unknown bidding zone: {region}")))?;

        let body = self.get(&self.query_url(zone.eic, start, end)).await?;
        parse_day_ahead_xml(&body, start, end, resolution)
    }
}

/// Parse an A44 answer into prices at `resolution` within `[start, end)`.
///
/// An acknowledgement with reason 999 yields an empty series; any other
/// acknowledgement is an upstream error.
pub fn parse_day_ahead_xml(
    xml: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    resolution: Resolution,
) -> Result<PriceSeries> {
    let doc: MarketDocument = quick_xml::de::from_str(xml)?;

    if doc.time_series.is_empty() {
        return match doc.reasons.first() {
            Some(reason) if reason.code != NO_DATA_REASON => Err(DashboardError::Upstream(format!(
                "{} {}",
                reason.code,
                reason.text.trim()
            ))),
            _ => Ok(Vec::new()),
        };
    }

    // Slot length in minutes → prices by slot start, last duplicate wins
    let mut by_slot: HashMap<i64, BTreeMap<DateTime<Utc>, f64>> = HashMap::new();

    for series in &doc.time_series {
        let forward_fill = series.curve_type.as_deref() == Some(CURVE_VARIABLE_BLOCKS);

        for period in &series.periods {
            let Some(minutes) = resolution_minutes(&period.resolution) else {
                continue;
            };
            let period_start = parse_instant(&period.time_interval.start)?;
            let period_end = parse_instant(&period.time_interval.end)?;
            let slots = (period_end - period_start).num_minutes() / minutes;

            let positions: BTreeMap<i64, f64> = period
                .points
                .iter()
                .filter(|p| (1..=slots).contains(&p.position))
                .map(|p| (p.position, p.price))
                .collect();

            let target = by_slot.entry(minutes).or_default();
            let mut previous: Option<f64> = None;
            for position in 1..=slots {
                let price = match positions.get(&position) {
                    Some(&price) => Some(price),
                    None if forward_fill => previous,
                    None => None,
                };
                if let Some(price) = price {
                    target.insert(period_start + Duration::minutes(minutes * (position - 1)), price);
                    previous = Some(price);
                }
            }
        }
    }

    let wanted = resolution.minutes();
    let prices = match by_slot.remove(&wanted) {
        Some(prices) => prices,
        None => {
            // Prefer the finest published resolution to resample from
            let Some(&source) = by_slot.keys().min() else {
                return Ok(Vec::new());
            };
            let prices = by_slot.remove(&source).unwrap_or_default();
            resample(prices, source, wanted)
        }
    };

    Ok(prices
        .into_iter()
        .filter(|(timestamp, _)| *timestamp >= start && *timestamp < end)
        .map(|(timestamp, price)| PricePoint { timestamp, price })
        .collect())
}

/// Move prices from `from` to `to` minute slots.
///
/// Finer slots are averaged into each coarser slot; a coarser price covers
/// every finer slot it spans.
fn resample(prices: BTreeMap<DateTime<Utc>, f64>, from: i64, to: i64) -> BTreeMap<DateTime<Utc>, f64> {
    if from < to {
        let mut buckets: BTreeMap<DateTime<Utc>, (f64, u32)> = BTreeMap::new();
        for (timestamp, price) in prices {
            let floor = timestamp - Duration::seconds(timestamp.timestamp().rem_euclid(to * 60));
            let bucket = buckets.entry(floor).or_insert((0.0, 0));
            bucket.0 += price;
            bucket.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(timestamp, (sum, count))| (timestamp, sum / f64::from(count)))
            .collect()
    } else {
        let parts = from / to;
        prices
            .into_iter()
            .flat_map(|(timestamp, price)| {
                (0..parts).map(move |i| (timestamp + Duration::minutes(to * i), price))
            })
            .collect()
    }
}

/// `PT15M`, `PT60M`, `PT1H` → minutes; daily and longer are not slots
fn resolution_minutes(raw: &str) -> Option<i64> {
    let body = raw.trim().strip_prefix("PT")?;
    let minutes = if let Some(m) = body.strip_suffix('M') {
        m.parse().ok()?
    } else if let Some(h) = body.strip_suffix('H') {
        h.parse::<i64>().ok()? * 60
    } else {
        return None;
    };
    (minutes > 0).then_some(minutes)
}

/// `YYYY-MM-DDTHH:MMZ` as used in time intervals, with RFC 3339 fallback
fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|_| DashboardError::Xml(format!("Invalid time interval bound: {raw}")))
}
