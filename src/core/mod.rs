// Core algorithm exports
pub mod classifier;
pub mod distance;
pub mod filters;
pub mod pipeline;
pub mod proximity;
pub mod query;
pub mod taxonomy;

pub use classifier::classify_elements;
pub use distance::{expand_bbox_by_radius, haversine_m, is_within_bounding_box};
pub use filters::matches_static_filters;
pub use pipeline::{ListingSearch, SearchError, SearchOutcome, MAX_LISTINGS};
pub use proximity::ProximityMatcher;
pub use query::{build_query_plan, QueryPlan};
pub use taxonomy::Taxonomy;
