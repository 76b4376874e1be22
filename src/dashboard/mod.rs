//! Dashboard module - Day-ahead price web interface
//!
//! Provides a single-page dashboard for comparing bidding zone prices.
//! Separated into HTML, CSS, and JS submodules for maintainability.
//!
//! # Architecture
//! - `html.rs`: Page structure and controls
//! - `css.rs`: Styling with CSS custom properties
//! - `js.rs`: API calls, Plotly rendering, user interactions
//!
//! # Features
//! - Region, date, resolution and colour scale pickers
//! - Heatmap, line chart and price table
//! - Status trail per region and a Refresh button that busts the cache

mod css;
mod html;
mod js;

/// Plotly bundle served from the CDN
const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Generate the complete dashboard HTML page
pub fn dashboard_html() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Day-Ahead Electricity Prices</title>
    <script src="{plotly}" charset="utf-8"></script>
    <style>
{css}
    </style>
</head>
<body>
{html}
    <script>
{js}
    </script>
</body>
</html>"#,
        plotly = PLOTLY_SRC,
        css = css::STYLES,
        html = html::TEMPLATE,
        js = js::SCRIPT
    )
}

/// Page shown instead of the dashboard when configuration is unusable
pub fn config_error_html(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Configuration error</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="container">
        <header><h1>⚡ Day-Ahead Electricity Prices</h1></header>
        <div class="banner banner-error">{message}</div>
    </div>
</body>
</html>"#,
        css = css::STYLES,
        message = escape_html(message)
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
