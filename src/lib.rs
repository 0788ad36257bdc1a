//! Nearby Listings - real-estate search filtered by proximity to amenities
//!
//! This library provides the amenity proximity search engine: it turns
//! category filters into one batched Overpass query, classifies the returned
//! elements, caches the buckets and keeps the listings that are close enough
//! to every requested category.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ListingSearch, Taxonomy, distance::{haversine_m, expand_bbox_by_radius}};
pub use models::{Listing, BoundingBox, AmenityBuckets, ProximityRequest, SearchCriteria};
