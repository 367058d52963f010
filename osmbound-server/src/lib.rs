//! HTTP service serving OpenStreetMap boundaries as `GeoJSON`.
//!
//! Requests are answered from a TTL cache when possible; otherwise the
//! Overpass query for the requested kind and viewport is sent through a
//! bounded, retrying fetch pool and the response is assembled into polygons.

pub mod cache;
pub mod config;
pub mod overpass;
pub mod pool;
pub mod routes;
pub mod service;

use std::sync::Arc;

use axum::Router;

use cache::TtlCache;
use config::ServerConfig;
use overpass::{FetchError, OverpassClient};
use pool::{FetchPool, RetryPolicy};
use service::BoundaryService;

/// Builds the boundary service described by `config`
///
/// # Errors
///
/// Returns an error if the Overpass HTTP client cannot be created.
pub fn build_service(config: &ServerConfig) -> Result<BoundaryService<OverpassClient>, FetchError> {
    let client = OverpassClient::new(&config.overpass.endpoint, config.overpass.timeout())?;
    let pool = FetchPool::new(
        client,
        config.overpass.max_concurrent,
        RetryPolicy {
            max_retries: config.overpass.max_retries,
            delay: config.overpass.retry_delay(),
        },
    );

    Ok(BoundaryService::new(pool, TtlCache::new(config.cache.ttl())))
}

/// Builds the full application router described by `config` and starts the
/// cache purge task. Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the Overpass HTTP client cannot be created.
pub fn build_app(config: &ServerConfig) -> Result<Router, FetchError> {
    let service = Arc::new(build_service(config)?);
    service.spawn_cache_purge(config.cache.purge_interval());
    Ok(routes::router(service, &config.http))
}
