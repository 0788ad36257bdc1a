use crate::models::domain::{
    BoundingBox, ListingFilters, ProximityRequest, SaleType, SearchCriteria, SubtypeSelection,
};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Errors raised while reading raw query parameters
#[derive(Debug, Error)]
pub enum QueryParseError {
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Query parameters of `GET /api/listings`
///
/// Subtype lists accept repeated parameters (`worship=church&worship=mosque`)
/// as well as comma-separated values.
#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_bbox"))]
pub struct SearchListingsQuery {
    #[validate(range(min = -180.0, max = 180.0))]
    pub west: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub south: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub east: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub north: f64,
    pub sale_type: Option<SaleType>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_beds: Option<u32>,
    pub min_baths: Option<u32>,
    pub need_parks: bool,
    #[validate(range(min = 25, max = 10000))]
    pub parks_radius: Option<u32>,
    pub worship: Vec<String>,
    #[validate(range(min = 25, max = 10000))]
    pub worship_radius: Option<u32>,
    pub stores: Vec<String>,
    #[validate(range(min = 25, max = 10000))]
    pub stores_radius: Option<u32>,
    pub gyms: Vec<String>,
    #[validate(range(min = 25, max = 10000))]
    pub gyms_radius: Option<u32>,
    pub sports: Vec<String>,
    #[validate(range(min = 25, max = 10000))]
    pub sports_radius: Option<u32>,
    /// Legacy single radius, used only where a category has no radius of its own
    #[validate(range(min = 25, max = 10000))]
    pub radius_m: Option<u32>,
}

fn validate_bbox(query: &SearchListingsQuery) -> Result<(), ValidationError> {
    let coords = [query.west, query.south, query.east, query.north];
    if !coords.iter().all(|c| c.is_finite()) {
        let mut error = ValidationError::new("bbox");
        error.message = Some("bbox coordinates must be finite numbers".into());
        return Err(error);
    }
    if query.west >= query.east || query.south >= query.north {
        let mut error = ValidationError::new("bbox");
        error.message = Some("bbox requires west < east and south < north".into());
        return Err(error);
    }
    Ok(())
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, QueryParseError> {
    value.trim().parse().map_err(|_| QueryParseError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, QueryParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(QueryParseError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_sale_type(value: &str) -> Result<Option<SaleType>, QueryParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "sale" => Ok(Some(SaleType::Sale)),
        "rent" => Ok(Some(SaleType::Rent)),
        "any" | "" => Ok(None),
        _ => Err(QueryParseError::Invalid {
            key: "sale_type".to_string(),
            value: value.to_string(),
        }),
    }
}

fn push_list(list: &mut Vec<String>, value: &str) {
    list.extend(value.split(',').map(str::to_string));
}

impl SearchListingsQuery {
    /// Build the query from decoded `(key, value)` pairs
    ///
    /// Empty optional numbers are treated as absent; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, QueryParseError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (mut west, mut south, mut east, mut north) = (None, None, None, None);
        let mut query = Self {
            west: 0.0,
            south: 0.0,
            east: 0.0,
            north: 0.0,
            sale_type: None,
            min_price: None,
            max_price: None,
            min_beds: None,
            min_baths: None,
            need_parks: false,
            parks_radius: None,
            worship: Vec::new(),
            worship_radius: None,
            stores: Vec::new(),
            stores_radius: None,
            gyms: Vec::new(),
            gyms_radius: None,
            sports: Vec::new(),
            sports_radius: None,
            radius_m: None,
        };

        for (key, value) in pairs {
            let k = key.as_str();
            let blank = value.trim().is_empty();
            match k {
                "west" => west = Some(parse(k, &value)?),
                "south" => south = Some(parse(k, &value)?),
                "east" => east = Some(parse(k, &value)?),
                "north" => north = Some(parse(k, &value)?),
                "sale_type" => query.sale_type = parse_sale_type(&value)?,
                "need_parks" => query.need_parks = parse_bool(k, &value)?,
                "worship" => push_list(&mut query.worship, &value),
                "stores" => push_list(&mut query.stores, &value),
                "gyms" => push_list(&mut query.gyms, &value),
                "sports" => push_list(&mut query.sports, &value),
                _ if blank => {}
                "min_price" => query.min_price = Some(parse(k, &value)?),
                "max_price" => query.max_price = Some(parse(k, &value)?),
                "min_beds" => query.min_beds = Some(parse(k, &value)?),
                "min_baths" => query.min_baths = Some(parse(k, &value)?),
                "parks_radius" => query.parks_radius = Some(parse(k, &value)?),
                "worship_radius" => query.worship_radius = Some(parse(k, &value)?),
                "stores_radius" => query.stores_radius = Some(parse(k, &value)?),
                "gyms_radius" => query.gyms_radius = Some(parse(k, &value)?),
                "sports_radius" => query.sports_radius = Some(parse(k, &value)?),
                "radius_m" => query.radius_m = Some(parse(k, &value)?),
                _ => {}
            }
        }

        query.west = west.ok_or(QueryParseError::Missing("west"))?;
        query.south = south.ok_or(QueryParseError::Missing("south"))?;
        query.east = east.ok_or(QueryParseError::Missing("east"))?;
        query.north = north.ok_or(QueryParseError::Missing("north"))?;

        Ok(query)
    }

    /// Convert into search criteria
    ///
    /// Per-category radii win; `radius_m` and then `default_radius_m` fill
    /// in for categories without one. Blank subtype lists mean the category
    /// was not requested.
    pub fn to_criteria(&self, default_radius_m: u32) -> SearchCriteria {
        let radius = |own: Option<u32>| f64::from(own.or(self.radius_m).unwrap_or(default_radius_m));

        SearchCriteria {
            bbox: BoundingBox::new(self.west, self.south, self.east, self.north),
            filters: ListingFilters {
                sale_type: self.sale_type,
                min_price: self.min_price,
                max_price: self.max_price,
                min_beds: self.min_beds,
                min_baths: self.min_baths,
            },
            proximity: ProximityRequest {
                parks: self.need_parks.then(|| radius(self.parks_radius)),
                worship: SubtypeSelection::new(&self.worship, radius(self.worship_radius)),
                stores: SubtypeSelection::new(&self.stores, radius(self.stores_radius)),
                gyms: SubtypeSelection::new(&self.gyms, radius(self.gyms_radius)),
                sports: SubtypeSelection::new(&self.sports, radius(self.sports_radius)),
            },
        }
    }
}
