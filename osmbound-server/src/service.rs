use std::sync::Arc;
use std::time::Duration;

use geojson::FeatureCollection;
use osmbound_core::prelude::*;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::overpass::{ElementSource, FetchError};
use crate::pool::FetchPool;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Failed to assemble boundaries: {0}")]
    Assembly(#[from] osmbound_core::Error),
}

/// Fetches, assembles and caches boundary collections.
///
/// Collections are cached under their Overpass query text, which encodes
/// both the boundary kind and the bounding box.
pub struct BoundaryService<S> {
    pool: FetchPool<S>,
    cache: TtlCache<String, FeatureCollection>,
}

impl<S: ElementSource> BoundaryService<S> {
    pub fn new(pool: FetchPool<S>, cache: TtlCache<String, FeatureCollection>) -> Self {
        Self { pool, cache }
    }

    /// Boundaries of `kind` within `bbox`
    ///
    /// # Errors
    ///
    /// Returns an error if Overpass cannot be reached after retries or its
    /// response is not a valid element list.
    pub async fn boundaries(
        &self,
        kind: BoundaryKind,
        bbox: &BoundingBox,
    ) -> Result<FeatureCollection, ServiceError> {
        let query = overpass_query(kind, bbox);

        if let Some(collection) = self.cache.get(&query) {
            debug!(%kind, %bbox, "Boundary cache hit");
            return Ok(collection);
        }

        debug!(%kind, %bbox, "Boundary cache miss");
        let response = self.pool.fetch(&query).await?;
        let collection = assemble_value(&response, kind)?;
        info!(
            %kind,
            %bbox,
            features = collection.features.len(),
            "Assembled boundaries"
        );

        if !collection.features.is_empty() {
            self.cache.insert(query, collection.clone());
        }

        Ok(collection)
    }

    /// Spawns a task dropping expired cache entries every `period`.
    ///
    /// The task stops once the service is dropped.
    pub fn spawn_cache_purge(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(service) = weak.upgrade() else {
                    break;
                };

                let purged = service.cache.purge_expired();
                if purged > 0 {
                    debug!(
                        purged,
                        remaining = service.cache.len(),
                        "Purged expired boundary collections"
                    );
                }
            }
        })
    }

    pub fn cache(&self) -> &TtlCache<String, FeatureCollection> {
        &self.cache
    }

    pub fn pool(&self) -> &FetchPool<S> {
        &self.pool
    }
}
