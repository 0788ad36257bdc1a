// Service exports
pub mod cache;
pub mod dataset;
pub mod overpass;

pub use cache::{AmenityCache, AmenityCacheKey, CacheStats, Clock, ManualClock, SystemClock};
pub use dataset::{load_listings, DatasetError};
pub use overpass::{HttpOverpassClient, OverpassClient, OverpassError};
