use crate::core::distance::haversine_m;
use crate::core::taxonomy::{Taxonomy, DRIVING_RANGE_KEY, GOLF_DRIVING_RANGE, LEISURE_FITNESS_CENTRE};
use crate::models::{Amenity, AmenityBuckets, AmenityCategory, Listing, ProximityRequest};
use std::collections::BTreeSet;

/// Tag test applied to candidate amenities of one category
#[derive(Debug, Clone, PartialEq)]
enum TagFilter {
    /// Any amenity in the bucket qualifies
    Any,
    Religion(BTreeSet<String>),
    Shop(BTreeSet<String>),
    Gym(BTreeSet<String>),
    /// `leisure=sports_centre` + `sport` elements are bucketed for display
    /// but never satisfy this filter
    Sport {
        leisure: BTreeSet<String>,
        driving_range: bool,
    },
}

impl TagFilter {
    fn accepts(&self, amenity: &Amenity) -> bool {
        let in_set =
            |set: &BTreeSet<String>, key: &str| amenity.tag(key).is_some_and(|v| set.contains(v));

        match self {
            TagFilter::Any => true,
            TagFilter::Religion(religions) => in_set(religions, "religion"),
            TagFilter::Shop(shops) => in_set(shops, "shop"),
            TagFilter::Gym(gym_tags) => {
                in_set(gym_tags, "amenity")
                    || in_set(gym_tags, "leisure")
                    || (amenity.tag("leisure") == Some(LEISURE_FITNESS_CENTRE)
                        && in_set(gym_tags, "sport"))
            }
            TagFilter::Sport {
                leisure,
                driving_range,
            } => {
                in_set(leisure, "leisure")
                    || (*driving_range && amenity.tag("golf") == Some(GOLF_DRIVING_RANGE))
            }
        }
    }
}

/// One requested category: its radius and the tags an amenity must carry
#[derive(Debug, Clone, PartialEq)]
struct CategoryCheck {
    category: AmenityCategory,
    radius_m: f64,
    filter: TagFilter,
}

/// Decides whether a listing is near every requested category
///
/// Built once per search; the tag sets are resolved from the taxonomy up
/// front so each listing only pays for distance checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityMatcher {
    checks: Vec<CategoryCheck>,
}

impl ProximityMatcher {
    pub fn new(taxonomy: &Taxonomy, request: &ProximityRequest) -> Self {
        let checks = AmenityCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let radius_m = request.radius_m(category)?;
                let subtypes = request.subtypes(category);
                let filter = match category {
                    AmenityCategory::Parks => TagFilter::Any,
                    AmenityCategory::Worship => TagFilter::Religion(taxonomy.religions_for(subtypes)),
                    AmenityCategory::Stores => TagFilter::Shop(taxonomy.shops_for(subtypes)),
                    AmenityCategory::Gyms => TagFilter::Gym(taxonomy.gym_tags_for(subtypes)),
                    AmenityCategory::Sports => TagFilter::Sport {
                        leisure: taxonomy.sport_tags_for(subtypes),
                        driving_range: subtypes.iter().any(|key| key == DRIVING_RANGE_KEY),
                    },
                };
                Some(CategoryCheck {
                    category,
                    radius_m,
                    filter,
                })
            })
            .collect();

        Self { checks }
    }

    /// True when no category was requested
    pub fn is_unconstrained(&self) -> bool {
        self.checks.is_empty()
    }

    /// Whether the listing passes every requested category
    ///
    /// A requested category with an empty bucket fails every listing.
    pub fn matches(&self, listing: &Listing, buckets: &AmenityBuckets) -> bool {
        self.checks.iter().all(|check| {
            buckets.bucket(check.category).iter().any(|amenity| {
                haversine_m(listing.lat, listing.lng, amenity.lat, amenity.lng) <= check.radius_m
                    && check.filter.accepts(amenity)
            })
        })
    }
}
