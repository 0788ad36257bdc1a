use crate::core::{
    classifier::classify_elements,
    distance::expand_bbox_by_radius,
    filters::matches_static_filters,
    proximity::ProximityMatcher,
    query::{build_query_plan, DEFAULT_QUERY_TIMEOUT_SECS},
    taxonomy::Taxonomy,
};
use crate::models::{AmenityBuckets, Listing, SearchCriteria};
use crate::services::{AmenityCache, AmenityCacheKey, OverpassClient, OverpassError};
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of listings returned by one search
pub const MAX_LISTINGS: usize = 500;

/// Errors that fail a whole search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Amenity lookup failed: {0}")]
    Amenities(#[from] OverpassError),
}

/// Result of the search pipeline
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    /// Buckets the proximity checks ran against; empty without proximity filters
    pub amenities: Arc<AmenityBuckets>,
    pub total_candidates: usize,
}

/// Search orchestrator - implements the listing filtering pipeline
///
/// # Pipeline Stages
/// 1. Viewport and static filters (sale type, price, beds, baths)
/// 2. Bounding box expansion by the largest requested radius
/// 3. One batched Overpass query, memoized by the amenity cache
/// 4. Classification into category buckets
/// 5. Per-listing proximity checks
#[derive(Clone)]
pub struct ListingSearch {
    taxonomy: Arc<Taxonomy>,
    cache: Arc<AmenityCache>,
    client: Arc<dyn OverpassClient>,
    max_listings: usize,
    query_timeout_secs: u64,
}

impl ListingSearch {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        cache: Arc<AmenityCache>,
        client: Arc<dyn OverpassClient>,
    ) -> Self {
        Self {
            taxonomy,
            cache,
            client,
            max_listings: MAX_LISTINGS,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        }
    }

    pub fn with_max_listings(mut self, max_listings: usize) -> Self {
        self.max_listings = max_listings;
        self
    }

    pub fn with_query_timeout_secs(mut self, secs: u64) -> Self {
        self.query_timeout_secs = secs;
        self
    }

    pub fn cache(&self) -> &AmenityCache {
        &self.cache
    }

    /// Run a search over the listing dataset
    ///
    /// At most one Overpass call is made, and only when proximity
    /// categories were requested. Any external failure fails the search.
    pub async fn search(
        &self,
        listings: &[Listing],
        criteria: &SearchCriteria,
    ) -> Result<SearchOutcome, SearchError> {
        // Stage 1: static filters
        let candidates: Vec<&Listing> = listings
            .iter()
            .filter(|listing| matches_static_filters(listing, &criteria.bbox, &criteria.filters))
            .collect();
        let total_candidates = candidates.len();

        let proximity = &criteria.proximity;
        if proximity.is_empty() {
            return Ok(SearchOutcome {
                listings: candidates
                    .into_iter()
                    .take(self.max_listings)
                    .cloned()
                    .collect(),
                amenities: Arc::new(AmenityBuckets::default()),
                total_candidates,
            });
        }

        // Stage 2 & 3: one expansion and one query cover every category
        let expanded = expand_bbox_by_radius(&criteria.bbox, proximity.max_radius_m());
        let plan = build_query_plan(&self.taxonomy, &expanded, proximity, self.query_timeout_secs);

        tracing::debug!("Amenity query plan: labels={:?} query={}", plan.labels, plan.query);

        let amenities = if plan.is_empty() {
            Arc::new(AmenityBuckets::default())
        } else {
            let key = AmenityCacheKey::new(&expanded, &plan, proximity);
            self.cache
                .get_or_fetch(key, || async {
                    let elements = self.client.execute(&plan.query).await.map_err(|e| {
                        tracing::error!("Overpass query failed: {}", e);
                        e
                    })?;
                    // Stage 4: classification
                    Ok::<_, SearchError>(classify_elements(&self.taxonomy, &elements))
                })
                .await?
        };

        // Stage 5: proximity
        let matcher = ProximityMatcher::new(&self.taxonomy, proximity);
        let matched: Vec<Listing> = candidates
            .into_iter()
            .filter(|listing| matcher.matches(listing, &amenities))
            .take(self.max_listings)
            .cloned()
            .collect();

        tracing::info!(
            "Search matched {} of {} candidates against {} amenities",
            matched.len(),
            total_candidates,
            amenities.total()
        );

        Ok(SearchOutcome {
            listings: matched,
            amenities,
            total_candidates,
        })
    }
}
