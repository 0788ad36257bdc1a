use crate::core::distance::is_within_bounding_box;
use crate::models::{BoundingBox, Listing, ListingFilters};

/// Check a listing against the viewport and the static filters
///
/// This is the first stage of the search pipeline and never touches the
/// network.
#[inline]
pub fn matches_static_filters(listing: &Listing, bbox: &BoundingBox, filters: &ListingFilters) -> bool {
    if !is_within_bounding_box(listing.lat, listing.lng, bbox) {
        return false;
    }

    if filters
        .sale_type
        .is_some_and(|sale_type| listing.sale_type != sale_type)
    {
        return false;
    }

    // Price range (inclusive)
    if filters.min_price.is_some_and(|min| listing.price < min)
        || filters.max_price.is_some_and(|max| listing.price > max)
    {
        return false;
    }

    if filters.min_beds.is_some_and(|min| listing.beds < min) {
        return false;
    }

    if filters.min_baths.is_some_and(|min| listing.baths < min) {
        return false;
    }

    true
}
