// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Amenity, AmenityBuckets, AmenityCategory, BoundingBox, Center, Listing, ListingFilters,
    OverpassElement, ProximityRequest, SaleType, SearchCriteria, SubtypeSelection,
};
pub use requests::SearchListingsQuery;
pub use responses::{ErrorResponse, HealthResponse, SearchResponse};
