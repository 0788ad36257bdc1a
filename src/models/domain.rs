use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    Sale,
    Rent,
}

/// Real-estate listing as loaded from the local dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub price: u64,
    pub sale_type: SaleType,
    pub beds: u32,
    pub baths: u32,
    pub sqft: u32,
    #[serde(default)]
    pub google_maps_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Map viewport in degrees
///
/// Callers guarantee `west < east` and `south < north`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    pub fn center_lat(&self) -> f64 {
        (self.south + self.north) / 2.0
    }
}

/// The five amenity classes a search can filter by.
///
/// Declaration order is the fixed category order used for query blocks,
/// labels, cache keys and classification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmenityCategory {
    Parks,
    Worship,
    Stores,
    Gyms,
    Sports,
}

impl AmenityCategory {
    pub const ALL: [AmenityCategory; 5] = [
        AmenityCategory::Parks,
        AmenityCategory::Worship,
        AmenityCategory::Stores,
        AmenityCategory::Gyms,
        AmenityCategory::Sports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AmenityCategory::Parks => "parks",
            AmenityCategory::Worship => "worship",
            AmenityCategory::Stores => "stores",
            AmenityCategory::Gyms => "gyms",
            AmenityCategory::Sports => "sports",
        }
    }
}

impl std::fmt::Display for AmenityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Centroid reported by Overpass for ways and relations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// Raw element as returned by the Overpass API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OverpassElement {
    /// Resolve the element position, preferring the centroid of area-shaped elements
    pub fn position(&self) -> Option<(f64, f64)> {
        if let Some(center) = self.center {
            return Some((center.lat, center.lon));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Classified amenity with a resolved position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
    pub tags: BTreeMap<String, String>,
}

impl Amenity {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Classified amenity buckets, one per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmenityBuckets {
    pub parks: Vec<Amenity>,
    pub worship: Vec<Amenity>,
    pub stores: Vec<Amenity>,
    pub gyms: Vec<Amenity>,
    pub sports: Vec<Amenity>,
}

impl AmenityBuckets {
    pub fn bucket(&self, category: AmenityCategory) -> &[Amenity] {
        match category {
            AmenityCategory::Parks => &self.parks,
            AmenityCategory::Worship => &self.worship,
            AmenityCategory::Stores => &self.stores,
            AmenityCategory::Gyms => &self.gyms,
            AmenityCategory::Sports => &self.sports,
        }
    }

    pub fn bucket_mut(&mut self, category: AmenityCategory) -> &mut Vec<Amenity> {
        match category {
            AmenityCategory::Parks => &mut self.parks,
            AmenityCategory::Worship => &mut self.worship,
            AmenityCategory::Stores => &mut self.stores,
            AmenityCategory::Gyms => &mut self.gyms,
            AmenityCategory::Sports => &mut self.sports,
        }
    }

    pub fn total(&self) -> usize {
        AmenityCategory::ALL
            .iter()
            .map(|category| self.bucket(*category).len())
            .sum()
    }
}

/// Requested subtypes for one category together with its radius
#[derive(Debug, Clone, PartialEq)]
pub struct SubtypeSelection {
    pub subtypes: Vec<String>,
    pub radius_m: f64,
}

impl SubtypeSelection {
    /// Normalize a raw subtype list
    ///
    /// Entries are trimmed, blanks dropped, then sorted and deduplicated.
    /// Returns `None` when nothing is left, meaning the category was not requested.
    pub fn new<I, S>(subtypes: I, radius_m: f64) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut subtypes: Vec<String> = subtypes
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        subtypes.sort();
        subtypes.dedup();

        if subtypes.is_empty() {
            None
        } else {
            Some(Self { subtypes, radius_m })
        }
    }
}

/// Proximity constraints for one search; `None` means not requested
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityRequest {
    /// Radius around parks, when parks were requested
    pub parks: Option<f64>,
    pub worship: Option<SubtypeSelection>,
    pub stores: Option<SubtypeSelection>,
    pub gyms: Option<SubtypeSelection>,
    pub sports: Option<SubtypeSelection>,
}

impl ProximityRequest {
    pub fn is_empty(&self) -> bool {
        self.parks.is_none()
            && self.worship.is_none()
            && self.stores.is_none()
            && self.gyms.is_none()
            && self.sports.is_none()
    }

    pub fn selection(&self, category: AmenityCategory) -> Option<&SubtypeSelection> {
        match category {
            AmenityCategory::Parks => None,
            AmenityCategory::Worship => self.worship.as_ref(),
            AmenityCategory::Stores => self.stores.as_ref(),
            AmenityCategory::Gyms => self.gyms.as_ref(),
            AmenityCategory::Sports => self.sports.as_ref(),
        }
    }

    /// Radius for a category, if it was requested
    pub fn radius_m(&self, category: AmenityCategory) -> Option<f64> {
        match category {
            AmenityCategory::Parks => self.parks,
            other => self.selection(other).map(|s| s.radius_m),
        }
    }

    /// Requested subtypes for a category, empty for parks or unrequested categories
    pub fn subtypes(&self, category: AmenityCategory) -> &[String] {
        self.selection(category)
            .map(|s| s.subtypes.as_slice())
            .unwrap_or(&[])
    }

    /// Largest radius across every requested category
    pub fn max_radius_m(&self) -> f64 {
        AmenityCategory::ALL
            .iter()
            .filter_map(|category| self.radius_m(*category))
            .fold(0.0, f64::max)
    }
}

/// Static (non-proximity) listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub sale_type: Option<SaleType>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_beds: Option<u32>,
    pub min_baths: Option<u32>,
}

/// Fully validated search input
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub bbox: BoundingBox,
    pub filters: ListingFilters,
    pub proximity: ProximityRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_selection_normalizes() {
        let selection = SubtypeSelection::new(vec![" mosque", "church", "", "church "], 500.0)
            .expect("selection should be present");
        assert_eq!(selection.subtypes, vec!["church", "mosque"]);
    }

    #[test]
    fn test_blank_subtypes_mean_not_requested() {
        assert!(SubtypeSelection::new(vec![""], 500.0).is_none());
        assert!(SubtypeSelection::new(vec!["  ", "\t"], 500.0).is_none());
        assert!(SubtypeSelection::new(Vec::<String>::new(), 500.0).is_none());
    }

    #[test]
    fn test_element_prefers_center() {
        let element = OverpassElement {
            kind: "way".to_string(),
            id: 7,
            lat: Some(1.0),
            lon: Some(2.0),
            center: Some(Center { lat: 3.0, lon: 4.0 }),
            tags: BTreeMap::new(),
        };
        assert_eq!(element.position(), Some((3.0, 4.0)));
    }

    #[test]
    fn test_max_radius() {
        let request = ProximityRequest {
            parks: Some(300.0),
            gyms: SubtypeSelection::new(vec!["gym"], 1200.0),
            ..Default::default()
        };
        assert_eq!(request.max_radius_m(), 1200.0);
        assert_eq!(ProximityRequest::default().max_radius_m(), 0.0);
    }
}
