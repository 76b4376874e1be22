//! Fetch-and-normalize pipeline
//!
//! Queries the upstream once per requested region, strictly in request order.
//! A failing region never aborts the run: it is recorded in the outcome's
//! failed list and status trail, and the loop moves on.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::table::{TableBuilder, day_window, expected_grid};
use crate::types::{FetchOutcome, FetchRequest, PriceSeries, Resolution, StatusMessage};

/// Upstream day-ahead price provider
#[allow(async_fn_in_trait)] // Workers run single-threaded; no Send bound wanted
pub trait PriceSource {
    /// Prices for `region` over `[start, end)` at `resolution`.
    ///
    /// An empty series means the provider had nothing for the window.
    async fn day_ahead_prices(
        &self,
        region: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<PriceSeries>;
}

/// Fetch every region of `request` and normalize onto the day grid
pub async fn fetch_and_normalize<S: PriceSource>(source: &S, request: &FetchRequest) -> FetchOutcome {
    let (start, end) = day_window(request.date);
    let day = request.date.format("%Y-%m-%d").to_string();

    let mut outcome = FetchOutcome::default();
    let mut builder = TableBuilder::new();

    for region in &request.regions {
        match source
            .day_ahead_prices(region, start, end, request.resolution)
            .await
        {
            Ok(series) if series.is_empty() => {
                outcome.record_failure(
                    region,
                    StatusMessage::warning(region, format!("No data for {region} on {day}")),
                );
            }
            Ok(series) => {
                builder.insert_column(region, &series);
                outcome.statuses.push(StatusMessage::success(
                    region,
                    format!("Loaded {} prices for {region}", series.len()),
                ));
            }
            Err(e) => {
                outcome.record_failure(
                    region,
                    StatusMessage::error(region, format!("Error fetching data for {region}: {e}")),
                );
            }
        }
    }

    outcome.table = builder.reindex(&expected_grid(request.date, request.resolution));
    outcome
}
