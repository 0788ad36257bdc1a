use crate::core::taxonomy::{
    Taxonomy, AMENITY_PLACE_OF_WORSHIP, DRIVING_RANGE_KEY, GOLF_DRIVING_RANGE,
    LEISURE_FITNESS_CENTRE, LEISURE_PARK, LEISURE_SPORTS_CENTRE,
};
use crate::models::{AmenityCategory, BoundingBox, ProximityRequest};
use std::collections::BTreeSet;

/// Overpass element types queried for every filter, so areas are included
const ELEMENT_TYPES: [&str; 3] = ["node", "way", "relation"];

/// Server-side timeout embedded in the query header
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 25;

/// A combined Overpass query and the categories it returns results for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub query: String,
    pub labels: Vec<AmenityCategory>,
}

impl QueryPlan {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build one batched Overpass query for every requested category
///
/// Categories are visited in the fixed order parks, worship, stores, gyms,
/// sports. Each contributing category adds one union block; all blocks are
/// wrapped in a single outer union so one round trip returns everything.
/// Returns an empty plan when nothing is requested.
pub fn build_query_plan(
    taxonomy: &Taxonomy,
    bbox: &BoundingBox,
    request: &ProximityRequest,
    query_timeout_secs: u64,
) -> QueryPlan {
    // Overpass wants (south, west, north, east)
    let area = format!("({},{},{},{})", bbox.south, bbox.west, bbox.north, bbox.east);

    let mut blocks = Vec::new();
    let mut labels = Vec::new();

    for category in AmenityCategory::ALL {
        let filters = category_filters(taxonomy, category, request);
        if filters.is_empty() {
            continue;
        }
        blocks.push(union_block(&filters, &area));
        labels.push(category);
    }

    if blocks.is_empty() {
        return QueryPlan::default();
    }

    let query = format!(
        "[out:json][timeout:{}];({});out center;",
        query_timeout_secs,
        blocks.concat()
    );

    QueryPlan { query, labels }
}

/// Tag filter chains for one category, empty when it contributes nothing
fn category_filters(
    taxonomy: &Taxonomy,
    category: AmenityCategory,
    request: &ProximityRequest,
) -> Vec<String> {
    match category {
        AmenityCategory::Parks => {
            if request.parks.is_some() {
                vec![tag_equals("leisure", LEISURE_PARK)]
            } else {
                Vec::new()
            }
        }
        AmenityCategory::Worship => {
            let religions = taxonomy.religions_for(request.subtypes(category));
            if religions.is_empty() {
                return Vec::new();
            }
            vec![format!(
                "{}{}",
                tag_equals("amenity", AMENITY_PLACE_OF_WORSHIP),
                tag_matches("religion", &religions)
            )]
        }
        AmenityCategory::Stores => {
            let shops = taxonomy.shops_for(request.subtypes(category));
            if shops.is_empty() {
                return Vec::new();
            }
            vec![tag_matches("shop", &shops)]
        }
        AmenityCategory::Gyms => {
            let keys = request.subtypes(category);
            let gym_tags = taxonomy.gym_tags_for(keys);
            if gym_tags.is_empty() {
                return Vec::new();
            }
            let mut filters = vec![
                tag_matches("amenity", &gym_tags),
                tag_matches("leisure", &gym_tags),
            ];
            // Generic fitness centres annotated with a specific activity
            let studio_sports = taxonomy.studio_sports_for(keys);
            if !studio_sports.is_empty() {
                filters.push(format!(
                    "{}{}",
                    tag_equals("leisure", LEISURE_FITNESS_CENTRE),
                    tag_matches("sport", &studio_sports)
                ));
            }
            filters
        }
        AmenityCategory::Sports => {
            let keys = request.subtypes(category);
            let sport_tags = taxonomy.sport_tags_for(keys);
            let mut filters = Vec::new();
            if !sport_tags.is_empty() {
                filters.push(tag_matches("leisure", &sport_tags));
                filters.push(format!(
                    "{}{}",
                    tag_equals("leisure", LEISURE_SPORTS_CENTRE),
                    tag_matches("sport", &sport_tags)
                ));
            }
            if keys.iter().any(|key| key == DRIVING_RANGE_KEY) {
                filters.push(tag_equals("golf", GOLF_DRIVING_RANGE));
            }
            filters
        }
    }
}

/// Union of every filter chain across node, way and relation
fn union_block(filters: &[String], area: &str) -> String {
    let statements: String = filters
        .iter()
        .flat_map(|filter| {
            ELEMENT_TYPES
                .iter()
                .map(move |element| format!("{}{}{};", element, filter, area))
        })
        .collect();
    format!("({});", statements)
}

fn tag_equals(key: &str, value: &str) -> String {
    format!("[\"{}\"=\"{}\"]", key, escape_value(value))
}

fn tag_matches(key: &str, values: &BTreeSet<String>) -> String {
    format!("[\"{}\"~\"^({})$\"]", key, alternation(values))
}

/// Anchorless alternation of sorted, deduplicated, escaped values
fn alternation(values: &BTreeSet<String>) -> String {
    values
        .iter()
        .map(|value| escape_regex(value))
        .collect::<Vec<_>>()
        .join("|")
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\\\\\"),
            '"' => escaped.push_str("\\\""),
            '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
                escaped.push_str("\\\\");
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubtypeSelection;

    fn bbox() -> BoundingBox {
        BoundingBox::new(-74.1, 40.6, -73.9, 40.8)
    }

    fn selection(values: &[&str]) -> Option<SubtypeSelection> {
        SubtypeSelection::new(values.iter().copied(), 1000.0)
    }

    fn plan(request: &ProximityRequest) -> QueryPlan {
        build_query_plan(&Taxonomy::default(), &bbox(), request, DEFAULT_QUERY_TIMEOUT_SECS)
    }

    #[test]
    fn test_empty_request_yields_empty_plan() {
        let plan = plan(&ProximityRequest::default());
        assert_eq!(plan.query, "");
        assert!(plan.labels.is_empty());
    }

    #[test]
    fn test_parks_only() {
        let plan = plan(&ProximityRequest {
            parks: Some(500.0),
            ..Default::default()
        });

        assert_eq!(plan.labels, vec![AmenityCategory::Parks]);
        assert_eq!(
            plan.query,
            "[out:json][timeout:25];((\
             node[\"leisure\"=\"park\"](40.6,-74.1,40.8,-73.9);\
             way[\"leisure\"=\"park\"](40.6,-74.1,40.8,-73.9);\
             relation[\"leisure\"=\"park\"](40.6,-74.1,40.8,-73.9););\
             );out center;"
        );
    }

    #[test]
    fn test_labels_follow_fixed_order() {
        let plan = plan(&ProximityRequest {
            sports: selection(&["tennis"]),
            parks: Some(500.0),
            stores: selection(&["grocery"]),
            ..Default::default()
        });

        assert_eq!(
            plan.labels,
            vec![
                AmenityCategory::Parks,
                AmenityCategory::Stores,
                AmenityCategory::Sports
            ]
        );
        let parks_at = plan.query.find("\"leisure\"=\"park\"").unwrap();
        let shops_at = plan.query.find("\"shop\"~").unwrap();
        let sports_at = plan.query.find("tennis").unwrap();
        assert!(parks_at < shops_at && shops_at < sports_at);
        // One outer union, one output statement
        assert!(plan.query.starts_with("[out:json][timeout:25];(("));
        assert_eq!(plan.query.matches("out center;").count(), 1);
    }

    #[test]
    fn test_worship_maps_and_deduplicates_religions() {
        let plan = plan(&ProximityRequest {
            worship: selection(&["church", "synagogue", "shinto"]),
            ..Default::default()
        });

        assert_eq!(plan.labels, vec![AmenityCategory::Worship]);
        assert!(plan.query.contains(
            "node[\"amenity\"=\"place_of_worship\"][\"religion\"~\"^(christian|jewish|shinto)$\"]"
        ));
    }

    #[test]
    fn test_unknown_store_group_contributes_nothing() {
        let plan = plan(&ProximityRequest {
            stores: selection(&["jewellery"]),
            ..Default::default()
        });
        assert!(plan.is_empty());
        assert_eq!(plan.query, "");
    }

    #[test]
    fn test_gym_studio_adds_sport_match() {
        let plan = plan(&ProximityRequest {
            gyms: selection(&["yoga_studio"]),
            ..Default::default()
        });

        assert!(plan.query.contains("way[\"amenity\"~\"^(yoga)$\"]"));
        assert!(plan.query.contains("way[\"leisure\"~\"^(yoga)$\"]"));
        assert!(plan
            .query
            .contains("node[\"leisure\"=\"fitness_centre\"][\"sport\"~\"^(yoga)$\"]"));
    }

    #[test]
    fn test_generic_gym_has_no_sport_match() {
        let plan = plan(&ProximityRequest {
            gyms: selection(&["gym"]),
            ..Default::default()
        });

        assert!(plan.query.contains("[\"leisure\"~\"^(fitness_centre|gym)$\"]"));
        assert!(!plan.query.contains("\"sport\""));
    }

    #[test]
    fn test_driving_range_uses_golf_tag() {
        let plan = plan(&ProximityRequest {
            sports: selection(&["golf_driving_range"]),
            ..Default::default()
        });

        assert_eq!(plan.labels, vec![AmenityCategory::Sports]);
        assert!(plan.query.contains("node[\"golf\"=\"driving_range\"]"));
        assert!(!plan.query.contains("\"leisure\""));
    }

    #[test]
    fn test_sports_leisure_and_sports_centre() {
        let plan = plan(&ProximityRequest {
            sports: selection(&["tennis", "golf_driving_range"]),
            ..Default::default()
        });

        assert!(plan.query.contains("[\"leisure\"~\"^(tennis|tennis_court)$\"]"));
        assert!(plan.query.contains(
            "[\"leisure\"=\"sports_centre\"][\"sport\"~\"^(tennis|tennis_court)$\"]"
        ));
        assert!(plan.query.contains("[\"golf\"=\"driving_range\"]"));
    }

    #[test]
    fn test_raw_worship_values_are_escaped() {
        let plan = plan(&ProximityRequest {
            worship: selection(&["a\"b|c"]),
            ..Default::default()
        });
        assert!(plan.query.contains("^(a\\\"b\\\\|c)$"));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let request = ProximityRequest {
            parks: Some(100.0),
            worship: selection(&["mosque", "church"]),
            gyms: selection(&["crossfit", "gym"]),
            ..Default::default()
        };
        assert_eq!(plan(&request), plan(&request));
    }
}
