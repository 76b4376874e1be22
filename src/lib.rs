//! Day-Ahead Heatmap Worker - European electricity price dashboard for Cloudflare Workers
//!
//! Fetches day-ahead auction prices for a set of bidding zones from the
//! ENTSO-E Transparency Platform, normalizes them onto the delivery day's
//! hourly or 15-minute grid and serves a heatmap, line chart and table.
//!
//! # Architecture
//! - Main entry point routes HTTP requests
//! - ENTSO-E client queries one bidding zone at a time
//! - KV storage memoizes fetch outcomes for an hour
//! - Web dashboard renders the payloads with Plotly
//!
//! # Features
//! - Per-region failures are reported, never fatal
//! - Diverging and sequential colour scales with reverse switch
//! - Refresh button busts the cache through an explicit epoch

// Clippy configuration for dashboard code patterns
#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)] // Route table reads top to bottom
#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::needless_pass_by_value)] // Worker framework patterns
#![allow(clippy::map_unwrap_or)] // Explicit error handling preference

mod cache;
mod client;
mod colorscale;
mod config;
mod dashboard;
mod error;
mod fetch;
mod presentation;
mod query;
mod table;
mod types;
mod zones;

use chrono::Utc;
use worker::{Context, Env, Request, Response, Router, console_error, console_log, console_warn, event};

pub use cache::{CacheKey, CacheStatus, CachedFetch, KvCache, MemoryCache, PriceCache, fetch_cached};
pub use client::{EntsoeClient, parse_day_ahead_xml};
pub use colorscale::{ColorDomain, ColorScheme, HeatmapColors, ScaleKind};
pub use config::Config;
pub use error::DashboardError;
pub use fetch::{PriceSource, fetch_and_normalize};
pub use presentation::{DashboardView, DisplayOptions, build_view};
pub use query::{PriceQuery, parse_price_query};
pub use table::{PriceColumn, PriceTable};
pub use types::*;

/// Result type alias for worker operations
type WResult<T> = std::result::Result<T, worker::Error>;

/// Main Worker entry point
#[event(fetch)]
async fn fetch(req: Request, env: Env, _ctx: Context) -> WResult<Response> {
    console_error_panic_hook::set_once();

    let request_id = uuid::Uuid::new_v4().to_string();
    let router = Router::with_data(request_id.clone());

    let mut response = router
        // Health check
        .get("/health", |_req, ctx| {
            let environment = ctx
                .env
                .var("ENVIRONMENT")
                .map(|v| v.to_string())
                .unwrap_or_else(|_| "production".to_string());

            Response::from_json(&HealthResponse {
                status: "healthy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                environment,
                timestamp: Utc::now().to_rfc3339(),
            })
        })
        // Dashboard UI
        .get("/", |_req, ctx| dashboard_page(&ctx.env, &ctx.data))
        .get("/dashboard", |_req, ctx| dashboard_page(&ctx.env, &ctx.data))
        // Picker contents and defaults
        .get("/api/options", |_req, ctx| match Config::from_env(&ctx.env) {
            Ok(config) => Response::from_json(&dashboard_options(&config)),
            Err(e) => error_response(&e, &ctx.data),
        })
        // Fetch, normalize and map prices for the dashboard
        .get_async("/api/prices", |req, ctx| async move {
            match price_view(&req, &ctx.env, &ctx.data).await {
                Ok(view) => Response::from_json(&view),
                Err(e) => error_response(&e, &ctx.data),
            }
        })
        // Fallback
        .run(req, env)
        .await?;

    response.headers_mut().set("x-request-id", &request_id)?;
    Ok(response)
}

/// Dashboard HTML, or the configuration error page without a token
fn dashboard_page(env: &Env, request_id: &str) -> WResult<Response> {
    match Config::from_env(env) {
        Ok(_) => Response::from_html(dashboard::dashboard_html()),
        Err(e) => {
            console_error!("[{}] {}", request_id, e);
            Ok(Response::from_html(dashboard::config_error_html(&e.to_string()))?.with_status(500))
        }
    }
}

/// JSON error body with the error's HTTP status
fn error_response(err: &DashboardError, request_id: &str) -> WResult<Response> {
    let status = err.status_code();
    if status >= 500 {
        console_error!("[{}] {}", request_id, err);
    } else {
        console_warn!("[{}] {}", request_id, err);
    }

    Ok(Response::from_json(&serde_json::json!({
        "error": true,
        "message": err.to_string(),
        "request_id": request_id,
    }))?
    .with_status(status))
}

/// Zones, defaults and colour scales for the controls
fn dashboard_options(config: &Config) -> serde_json::Value {
    let today = query::reference_today(Utc::now());
    let max_date = query::max_selectable_date(today);

    let (diverging, sequential): (Vec<_>, Vec<_>) = colorscale::available_schemes()
        .into_iter()
        .partition(|(_, kind)| *kind == ScaleKind::Diverging);

    serde_json::json!({
        "zones": zones::ZONES.iter().map(|z| serde_json::json!({
            "code": z.code,
            "name": z.name,
        })).collect::<Vec<_>>(),
        "default_regions": config.default_regions,
        "default_date": max_date.format("%Y-%m-%d").to_string(),
        "max_date": max_date.format("%Y-%m-%d").to_string(),
        "resolution_cutover": config.resolution_cutover.format("%Y-%m-%d").to_string(),
        "resolutions": [Resolution::Hourly, Resolution::QuarterHourly],
        "colorscales": {
            "default": config.default_colorscale,
            "diverging": diverging.into_iter().map(|(name, _)| name).collect::<Vec<_>>(),
            "sequential": sequential.into_iter().map(|(name, _)| name).collect::<Vec<_>>(),
        },
    })
}

/// Validate the query, fetch through the cache and build the view
async fn price_view(req: &Request, env: &Env, request_id: &str) -> error::Result<DashboardView> {
    let config = Config::from_env(env)?;

    let url = req.url()?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let query = parse_price_query(&pairs, query::reference_today(Utc::now()), &config)?;

    if query.resolution_forced {
        console_log!(
            "[{}] 15-minute prices start on {}; using 60min for {}",
            request_id,
            config.resolution_cutover,
            query.request.date
        );
    }

    let key = CacheKey::new(&query.request, &config.api_token, &query.epoch);
    if config.is_debug() {
        console_log!("[{}] cache key {}", request_id, key);
    }

    let source = EntsoeClient::new(config.api_token.as_str(), config.base_url.as_str());

    let fetched = match KvCache::from_env(env, config.cache_ttl_seconds) {
        Ok(cache) => fetch_cached(&cache, &source, &key, &query.request).await,
        Err(e) => {
            console_warn!("[{}] {} unavailable, fetching uncached: {}", request_id, cache::CACHE_BINDING, e);
            CachedFetch {
                outcome: fetch_and_normalize(&source, &query.request).await,
                status: CacheStatus::Miss,
                storage_errors: Vec::new(),
            }
        }
    };

    for storage_error in &fetched.storage_errors {
        console_warn!("[{}] {}", request_id, storage_error);
    }

    match fetched.status {
        CacheStatus::Hit => console_log!(
            "[{}] cache hit for {} {} ({} regions)",
            request_id,
            query.request.date,
            query.request.resolution,
            query.request.regions.len()
        ),
        CacheStatus::Miss => {
            console_log!(
                "[{}] fetched {} {} for {}",
                request_id,
                query.request.date,
                query.request.resolution,
                query.request.regions.join(",")
            );
            for status in &fetched.outcome.statuses {
                match status.level {
                    StatusLevel::Success => console_log!("[{}] {}", request_id, status.message),
                    StatusLevel::Warning => console_warn!("[{}] {}", request_id, status.message),
                    StatusLevel::Error => console_error!("[{}] {}", request_id, status.message),
                }
            }
        }
    }

    Ok(build_view(&query.request, &fetched.outcome, &query.options))
}
