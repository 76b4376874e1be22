//! Presentation mapping
//!
//! Turns a normalized `FetchOutcome` into the JSON the dashboard page hands
//! to Plotly: heatmap, line chart and table payloads plus the status trail
//! and summary banner. The charts themselves are drawn in the browser.

use serde::Serialize;

use crate::colorscale::{ColorDomain, ColorScheme, HeatmapColors};
use crate::table::{PriceColumn, PriceTable, round_to};
use crate::types::{FetchOutcome, FetchRequest, Resolution, StatusLevel, StatusMessage};

/// Shared chart font (family, size, colour)
pub const FONT_FAMILY: &str = "Arial";
pub const FONT_SIZE: u32 = 18;
pub const FONT_COLOR: &str = "black";

/// Quarter-hour rows per labelled hour
const ROWS_PER_HOUR_LABEL: usize = 4;

/// User display choices
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub scheme: ColorScheme,
    pub reverse: bool,
    pub show_heatmap: bool,
    pub show_table: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartFont {
    pub family: &'static str,
    pub size: u32,
    pub color: &'static str,
}

impl Default for ChartFont {
    fn default() -> Self {
        Self { family: FONT_FAMILY, size: FONT_SIZE, color: FONT_COLOR }
    }
}

/// Banner shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub level: StatusLevel,
    pub message: String,
    /// Offer the Refresh button next to the banner
    pub refresh_suggested: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapView {
    pub title: String,
    /// Rows x regions, `null` where a slot has no price
    pub z: Vec<Vec<Option<f64>>>,
    /// Region codes
    pub x: Vec<String>,
    /// Row timestamps (unique even on DST days)
    pub y: Vec<String>,
    /// Region code plus daily spread
    pub x_tick_text: Vec<String>,
    pub y_tick_vals: Vec<String>,
    pub y_tick_text: Vec<String>,
    /// Cell captions, hourly resolution only
    pub text: Option<Vec<Vec<String>>>,
    pub colors: HeatmapColors,
    pub colorbar_title: String,
    pub x_axis_title: String,
    pub font: ChartFont,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineChartView {
    pub title: String,
    /// ISO-8601 timestamps shared by every series
    pub x: Vec<String>,
    pub series: Vec<LineSeries>,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub font: ChartFont,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    /// Rounded to two decimals
    pub rows: Vec<Vec<Option<f64>>>,
}

/// Everything `/api/prices` returns
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub date: String,
    pub resolution: Resolution,
    pub regions: Vec<String>,
    pub statuses: Vec<StatusMessage>,
    pub failed_regions: Vec<String>,
    pub summary: Option<Summary>,
    pub heatmap: Option<HeatmapView>,
    pub line_chart: Option<LineChartView>,
    pub table: Option<TableView>,
}

/// Map an outcome to the dashboard payload
pub fn build_view(request: &FetchRequest, outcome: &FetchOutcome, options: &DisplayOptions) -> DashboardView {
    let date = request.date.format("%Y-%m-%d").to_string();
    let table = &outcome.table;
    let has_data = !table.is_empty();

    DashboardView {
        summary: summarize(outcome),
        heatmap: (has_data && options.show_heatmap)
            .then(|| heatmap_view(table, request.resolution, &date, options))
            .flatten(),
        line_chart: has_data.then(|| line_chart_view(table, &date)),
        table: (has_data && options.show_table).then(|| table_view(table)),
        date,
        resolution: request.resolution,
        regions: request.regions.clone(),
        statuses: outcome.statuses.clone(),
        failed_regions: outcome.failed_regions.clone(),
    }
}

/// Summary banner: failed regions first, otherwise an empty-result notice
pub fn summarize(outcome: &FetchOutcome) -> Option<Summary> {
    if outcome.has_failures() {
        return Some(Summary {
            level: StatusLevel::Warning,
            message: format!(
                "Failed to load data for: {}. Try refreshing the data.",
                outcome.failed_regions.join(", ")
            ),
            refresh_suggested: true,
        });
    }

    outcome.table.is_empty().then(|| Summary {
        level: StatusLevel::Warning,
        message: "No data found for the selected criteria. Try another date or other regions."
            .to_string(),
        refresh_suggested: false,
    })
}

/// `"{region}<br>{spread}"`, spread rounded to one decimal
pub fn spread_label(column: &PriceColumn) -> String {
    match column.spread() {
        Some(spread) => format!("{}<br>{:.1}", column.region, round_to(spread, 1)),
        None => format!("{}<br>n/a", column.region),
    }
}

/// One-decimal captions for every cell, hourly resolution only
pub fn cell_texts(table: &PriceTable, resolution: Resolution) -> Option<Vec<Vec<String>>> {
    if resolution != Resolution::Hourly {
        return None;
    }

    let texts = table
        .rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map(|v| format!("{:.1}", round_to(v, 1))).unwrap_or_default())
                .collect()
        })
        .collect();

    Some(texts)
}

/// `HH:MM` local time for every row
pub fn time_labels(table: &PriceTable) -> Vec<String> {
    table.index.iter().map(|ts| ts.format("%H:%M").to_string()).collect()
}

/// Rows that carry a tick label: all of them hourly, one per hour otherwise
pub fn tick_rows(row_count: usize, resolution: Resolution) -> Vec<usize> {
    let step = match resolution {
        Resolution::Hourly => 1,
        Resolution::QuarterHourly => ROWS_PER_HOUR_LABEL,
    };
    (0..row_count).step_by(step).collect()
}

fn heatmap_view(
    table: &PriceTable,
    resolution: Resolution,
    date: &str,
    options: &DisplayOptions,
) -> Option<HeatmapView> {
    let domain = ColorDomain::derive(table.min_max(), options.scheme.kind())?;
    let y: Vec<String> = table.index.iter().map(chrono::DateTime::to_rfc3339).collect();
    let labels = time_labels(table);
    let ticks = tick_rows(table.row_count(), resolution);

    Some(HeatmapView {
        title: format!("Day-Ahead Electricity Prices for {date}"),
        z: table.rows(),
        x: table.regions().into_iter().map(String::from).collect(),
        y_tick_vals: ticks.iter().map(|&i| y[i].clone()).collect(),
        y_tick_text: ticks.iter().map(|&i| labels[i].clone()).collect(),
        y,
        x_tick_text: table.columns.iter().map(spread_label).collect(),
        text: cell_texts(table, resolution),
        colors: options.scheme.render(&domain, options.reverse),
        colorbar_title: "price<br>[€/MWh]".to_string(),
        x_axis_title: "Country (bidding zone) / Spread [€/MWh]".to_string(),
        font: ChartFont::default(),
    })
}

fn line_chart_view(table: &PriceTable, date: &str) -> LineChartView {
    LineChartView {
        title: format!("Day-Ahead Price Curves for {date}"),
        x: table.index.iter().map(chrono::DateTime::to_rfc3339).collect(),
        series: table
            .columns
            .iter()
            .map(|c| LineSeries { name: c.region.clone(), y: c.values.clone() })
            .collect(),
        x_axis_title: "Time".to_string(),
        y_axis_title: "Price [€/MWh]".to_string(),
        font: ChartFont::default(),
    }
}

fn table_view(table: &PriceTable) -> TableView {
    TableView {
        index: table.index.iter().map(|ts| ts.format("%Y-%m-%d %H:%M").to_string()).collect(),
        columns: table.regions().into_iter().map(String::from).collect(),
        rows: table
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(|v| round_to(v, 2))).collect())
            .collect(),
    }
}
