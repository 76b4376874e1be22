//! Time-indexed price table
//!
//! Rows are the expected delivery slots of one day in the reference time
//! zone, columns are bidding zones. Upstream series are collected into a
//! [`TableBuilder`] and reindexed onto the full expected grid, so a provider
//! returning partial data can never shift one column against another.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::{PriceSeries, Resolution};

/// Market time zone every day boundary is computed in
pub const REFERENCE_TZ: Tz = chrono_tz::Europe::Brussels;

/// Local midnight of `date` in the reference zone, as UTC
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    REFERENCE_TZ
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Half-open query window `[start-of-day, start-of-next-day)` for `date`
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (start_of_day(date), start_of_day(next))
}

/// Expected row index for a day: fixed length, fixed step, from local midnight
pub fn expected_grid(date: NaiveDate, resolution: Resolution) -> Vec<DateTime<Utc>> {
    let start = start_of_day(date);
    let step = Duration::minutes(resolution.minutes());
    (0..resolution.slots_per_day())
        .map(|slot| start + step * slot)
        .collect()
}

/// One bidding zone's prices, aligned with the table index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceColumn {
    pub region: String,
    pub values: Vec<Option<f64>>,
}

impl PriceColumn {
    /// Present (non-missing) prices
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    /// Lowest and highest present price
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(self.present())
    }

    /// Daily spread (max - min), `None` when the column holds no prices
    pub fn spread(&self) -> Option<f64> {
        self.min_max().map(|(min, max)| max - min)
    }
}

/// Normalized day of prices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Row timestamps with the reference zone's UTC offset
    pub index: Vec<DateTime<FixedOffset>>,
    pub columns: Vec<PriceColumn>,
}

impl PriceTable {
    /// True when no region produced data
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// Column codes in request order
    pub fn regions(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.region.as_str()).collect()
    }

    pub fn column(&self, region: &str) -> Option<&PriceColumn> {
        self.columns.iter().find(|c| c.region == region)
    }

    /// Lowest and highest present price over the whole table
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(self.columns.iter().flat_map(PriceColumn::present))
    }

    /// Row-major view: one vector per timestamp, one cell per region
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        (0..self.row_count())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.values.get(row).copied().flatten())
                    .collect()
            })
            .collect()
    }
}

/// Accumulates per-region series before reindexing onto the day grid
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<(String, BTreeMap<DateTime<Utc>, f64>)>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region's series as a new column.
    ///
    /// Duplicate timestamps keep the last value; NaN prices count as missing.
    pub fn insert_column(&mut self, region: &str, series: &PriceSeries) {
        let by_time: BTreeMap<_, _> = series
            .iter()
            .filter(|p| !p.price.is_nan())
            .map(|p| (p.timestamp, p.price))
            .collect();

        if let Some(existing) = self.columns.iter_mut().find(|(r, _)| r == region) {
            existing.1 = by_time;
        } else {
            self.columns.push((region.to_string(), by_time));
        }
    }

    /// Reindex every column onto `grid`.
    ///
    /// Grid slots without data become `None`; data outside the grid is dropped.
    /// With no columns the result is the empty table, without rows.
    pub fn reindex(self, grid: &[DateTime<Utc>]) -> PriceTable {
        if self.columns.is_empty() {
            return PriceTable::default();
        }

        let index = grid
            .iter()
            .map(|ts| ts.with_timezone(&REFERENCE_TZ).fixed_offset())
            .collect();

        let columns = self
            .columns
            .into_iter()
            .map(|(region, by_time)| PriceColumn {
                region,
                values: grid.iter().map(|ts| by_time.get(ts).copied()).collect(),
            })
            .collect();

        PriceTable { index, columns }
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn hourly_series(date: NaiveDate, prices: &[f64]) -> PriceSeries {
        let start = start_of_day(date);
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + Duration::hours(i as i64),
                price,
            })
            .collect()
    }

    #[test]
    fn test_start_of_day_is_brussels_midnight() {
        // Summer time: UTC+2
        let summer = start_of_day(date(2025, 6, 1));
        assert_eq!(summer.to_rfc3339(), "2025-05-31T22:00:00+00:00");

        // Winter time: UTC+1
        let winter = start_of_day(date(2025, 1, 15));
        assert_eq!(winter.to_rfc3339(), "2025-01-14T23:00:00+00:00");
    }

    #[test]
    fn test_day_window_follows_calendar_day() {
        let (start, end) = day_window(date(2025, 6, 1));
        assert_eq!(end - start, Duration::hours(24));

        // Spring-forward day is 23 hours long
        let (start, end) = day_window(date(2025, 3, 30));
        assert_eq!(end - start, Duration::hours(23));
    }

    #[test]
    fn test_expected_grid_lengths() {
        let hourly = expected_grid(date(2025, 6, 1), Resolution::Hourly);
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly[1] - hourly[0], Duration::minutes(60));

        let quarter = expected_grid(date(2025, 10, 15), Resolution::QuarterHourly);
        assert_eq!(quarter.len(), 96);
        assert_eq!(quarter[1] - quarter[0], Duration::minutes(15));
        assert_eq!(quarter[0], start_of_day(date(2025, 10, 15)));
    }

    fn series_from(date: NaiveDate, resolution: Resolution, count: i64) -> PriceSeries {
        let start = start_of_day(date);
        (0..count)
            .map(|i| PricePoint {
                timestamp: start + Duration::minutes(resolution.minutes() * i),
                price: i as f64,
            })
            .collect()
    }

    fn dst_table(date: NaiveDate, resolution: Resolution) -> PriceTable {
        // Upstream covers the true calendar day, 23 or 25 hours long
        let (start, end) = day_window(date);
        let count = (end - start).num_minutes() / resolution.minutes();

        let mut builder = TableBuilder::new();
        builder.insert_column("BE", &series_from(date, resolution, count));
        builder.reindex(&expected_grid(date, resolution))
    }

    fn assert_unique_index(table: &PriceTable) {
        let stamps: std::collections::HashSet<String> =
            table.index.iter().map(DateTime::to_rfc3339).collect();
        assert_eq!(stamps.len(), table.row_count());
    }

    #[test]
    fn test_spring_forward_leaves_last_slots_empty() {
        let day = date(2025, 3, 30);

        let hourly = dst_table(day, Resolution::Hourly);
        assert_eq!(hourly.row_count(), 24);
        assert_unique_index(&hourly);
        assert_eq!(hourly.index[1].to_rfc3339(), "2025-03-30T01:00:00+01:00");
        // 02:00 does not exist locally
        assert_eq!(hourly.index[2].to_rfc3339(), "2025-03-30T03:00:00+02:00");
        assert_eq!(hourly.index[23].to_rfc3339(), "2025-03-31T00:00:00+02:00");
        let be = hourly.column("BE").expect("BE");
        assert!(be.values[..23].iter().all(Option::is_some));
        assert_eq!(be.values[22], Some(22.0));
        assert!(be.values[23].is_none());

        let quarter = dst_table(day, Resolution::QuarterHourly);
        assert_eq!(quarter.row_count(), 96);
        assert_unique_index(&quarter);
        let be = quarter.column("BE").expect("BE");
        assert_eq!(be.values[91], Some(91.0));
        assert!(be.values[92..].iter().all(Option::is_none));
    }

    #[test]
    fn test_fall_back_drops_final_hour() {
        let day = date(2025, 10, 26);

        let hourly = dst_table(day, Resolution::Hourly);
        assert_eq!(hourly.row_count(), 24);
        assert_unique_index(&hourly);
        // 02:00 occurs twice, once per offset
        assert_eq!(hourly.index[2].to_rfc3339(), "2025-10-26T02:00:00+02:00");
        assert_eq!(hourly.index[3].to_rfc3339(), "2025-10-26T02:00:00+01:00");
        assert_eq!(hourly.index[23].to_rfc3339(), "2025-10-26T22:00:00+01:00");
        let be = hourly.column("BE").expect("BE");
        assert!(be.values.iter().all(Option::is_some));
        assert_eq!(be.values[23], Some(23.0));
        assert!(!be.values.contains(&Some(24.0)));

        let quarter = dst_table(day, Resolution::QuarterHourly);
        assert_eq!(quarter.row_count(), 96);
        assert_unique_index(&quarter);
        assert_eq!(quarter.index[95].to_rfc3339(), "2025-10-26T22:45:00+01:00");
        let be = quarter.column("BE").expect("BE");
        assert!(be.values.iter().all(Option::is_some));
        assert_eq!(be.values[95], Some(95.0));
        assert!(!be.values.contains(&Some(96.0)));
    }

    #[test]
    fn test_reindex_fills_gaps_with_missing() {
        let day = date(2025, 6, 1);
        let mut series = hourly_series(day, &[50.0; 24]);
        series.remove(5);
        series.remove(10);

        let mut builder = TableBuilder::new();
        builder.insert_column("CZ", &series);
        let table = builder.reindex(&expected_grid(day, Resolution::Hourly));

        assert_eq!(table.row_count(), 24);
        let cz = table.column("CZ").expect("CZ column");
        assert_eq!(cz.values.len(), 24);
        assert_eq!(cz.values.iter().filter(|v| v.is_none()).count(), 2);
        assert!(cz.values[5].is_none());
    }

    #[test]
    fn test_reindex_drops_points_outside_grid() {
        let day = date(2025, 6, 1);
        // 26 points: two of them spill into the next day
        let series = hourly_series(day, &[10.0; 26]);

        let mut builder = TableBuilder::new();
        builder.insert_column("AT", &series);
        let table = builder.reindex(&expected_grid(day, Resolution::Hourly));

        assert_eq!(table.row_count(), 24);
        assert!(table.column("AT").expect("AT").values.iter().all(Option::is_some));
    }

    #[test]
    fn test_columns_stay_aligned_with_partial_data() {
        let day = date(2025, 6, 1);
        let full = hourly_series(day, &(0..24).map(f64::from).collect::<Vec<_>>());
        // Second region only publishes the afternoon
        let partial: PriceSeries = full.iter().skip(12).cloned().collect();

        let mut builder = TableBuilder::new();
        builder.insert_column("CZ", &full);
        builder.insert_column("SK", &partial);
        let table = builder.reindex(&expected_grid(day, Resolution::Hourly));

        let rows = table.rows();
        assert_eq!(rows[0], vec![Some(0.0), None]);
        assert_eq!(rows[13], vec![Some(13.0), Some(13.0)]);
        assert_eq!(table.regions(), vec!["CZ", "SK"]);
    }

    #[test]
    fn test_empty_builder_gives_empty_table() {
        let table = TableBuilder::new().reindex(&expected_grid(date(2025, 6, 1), Resolution::Hourly));
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(table.min_max().is_none());
    }

    #[test]
    fn test_index_carries_reference_offset() {
        let day = date(2025, 6, 1);
        let mut builder = TableBuilder::new();
        builder.insert_column("CZ", &hourly_series(day, &[1.0]));
        let table = builder.reindex(&expected_grid(day, Resolution::Hourly));
        assert_eq!(table.index[0].to_rfc3339(), "2025-06-01T00:00:00+02:00");
    }

    #[test]
    fn test_spread_and_min_max() {
        let column = PriceColumn {
            region: "CZ".to_string(),
            values: vec![Some(10.0), None, Some(25.0), Some(18.0)],
        };
        assert_eq!(column.min_max(), Some((10.0, 25.0)));
        assert_eq!(column.spread(), Some(15.0));

        let empty = PriceColumn { region: "PL".to_string(), values: vec![None, None] };
        assert!(empty.spread().is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(95.456, 2), 95.46);
        assert_eq!(round_to(-12.25, 1), -12.3);
        assert_eq!(round_to(3.0, 1), 3.0);
    }
}
