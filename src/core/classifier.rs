use crate::core::taxonomy::{
    Taxonomy, AMENITY_PLACE_OF_WORSHIP, GOLF_DRIVING_RANGE, LEISURE_FITNESS_CENTRE, LEISURE_PARK,
    LEISURE_SPORTS_CENTRE,
};
use crate::models::{Amenity, AmenityBuckets, AmenityCategory, OverpassElement};
use std::collections::BTreeMap;

type Tags = BTreeMap<String, String>;

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

impl Taxonomy {
    /// Whether the tags satisfy the classification rule of one category
    pub fn rule_matches(&self, category: AmenityCategory, tags: &Tags) -> bool {
        let leisure = tag(tags, "leisure");
        let amenity = tag(tags, "amenity");
        let sport = tag(tags, "sport");

        match category {
            AmenityCategory::Parks => leisure == Some(LEISURE_PARK),
            AmenityCategory::Worship => amenity == Some(AMENITY_PLACE_OF_WORSHIP),
            AmenityCategory::Stores => tags.contains_key("shop"),
            AmenityCategory::Gyms => {
                let vocabulary = self.gym_vocabulary();
                amenity.is_some_and(|v| vocabulary.contains(v))
                    || leisure.is_some_and(|v| vocabulary.contains(v))
                    || (leisure == Some(LEISURE_FITNESS_CENTRE)
                        && sport.is_some_and(|v| self.gym_activities().contains(v)))
            }
            AmenityCategory::Sports => {
                let vocabulary = self.sports_vocabulary();
                leisure.is_some_and(|v| vocabulary.contains(v))
                    || tag(tags, "golf") == Some(GOLF_DRIVING_RANGE)
                    || (leisure == Some(LEISURE_SPORTS_CENTRE)
                        && sport.is_some_and(|v| vocabulary.contains(v)))
            }
        }
    }

    /// Category of an element; the first matching rule in priority order wins
    pub fn classify(&self, tags: &Tags) -> Option<AmenityCategory> {
        AmenityCategory::ALL
            .into_iter()
            .find(|category| self.rule_matches(*category, tags))
    }
}

/// Partition raw Overpass elements into category buckets
///
/// Elements without a resolvable position, or matching no rule, are dropped.
pub fn classify_elements(taxonomy: &Taxonomy, elements: &[OverpassElement]) -> AmenityBuckets {
    let mut buckets = AmenityBuckets::default();
    let mut dropped = 0usize;

    for element in elements {
        let Some((lat, lng)) = element.position() else {
            dropped += 1;
            continue;
        };
        let Some(category) = taxonomy.classify(&element.tags) else {
            dropped += 1;
            continue;
        };

        buckets.bucket_mut(category).push(Amenity {
            id: element.id,
            lat,
            lng,
            tags: element.tags.clone(),
        });
    }

    tracing::debug!(
        "Classified {} of {} elements ({} dropped)",
        buckets.total(),
        elements.len(),
        dropped
    );

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Center;

    fn element(id: u64, tags: &[(&str, &str)]) -> OverpassElement {
        OverpassElement {
            kind: "node".to_string(),
            id,
            lat: Some(40.0),
            lon: Some(-74.0),
            center: None,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_each_rule() {
        let taxonomy = Taxonomy::default();
        let elements = vec![
            element(1, &[("leisure", "park")]),
            element(2, &[("amenity", "place_of_worship"), ("religion", "christian")]),
            element(3, &[("shop", "bakery")]),
            element(4, &[("leisure", "fitness_centre")]),
            element(5, &[("leisure", "golf_course")]),
            element(6, &[("golf", "driving_range")]),
            element(7, &[("leisure", "sports_centre"), ("sport", "tennis")]),
            element(8, &[("amenity", "bench")]),
        ];

        let buckets = classify_elements(&taxonomy, &elements);

        let ids = |bucket: &[Amenity]| bucket.iter().map(|a| a.id).collect::<Vec<_>>();
        assert_eq!(ids(&buckets.parks), vec![1]);
        assert_eq!(ids(&buckets.worship), vec![2]);
        assert_eq!(ids(&buckets.stores), vec![3]);
        assert_eq!(ids(&buckets.gyms), vec![4]);
        assert_eq!(ids(&buckets.sports), vec![5, 6, 7]);
        assert_eq!(buckets.total(), 7);
    }

    #[test]
    fn test_shop_beats_gym() {
        let taxonomy = Taxonomy::default();
        let tags = element(1, &[("shop", "sports"), ("amenity", "gym")]).tags;
        assert_eq!(taxonomy.classify(&tags), Some(AmenityCategory::Stores));
    }

    #[test]
    fn test_park_beats_everything() {
        let taxonomy = Taxonomy::default();
        let tags = element(
            1,
            &[("leisure", "park"), ("amenity", "place_of_worship"), ("golf", "driving_range")],
        )
        .tags;
        assert_eq!(taxonomy.classify(&tags), Some(AmenityCategory::Parks));
    }

    #[test]
    fn test_studio_sport_on_fitness_centre() {
        let taxonomy = Taxonomy::default();
        let tags = element(1, &[("leisure", "fitness_centre"), ("sport", "yoga")]).tags;
        assert_eq!(taxonomy.classify(&tags), Some(AmenityCategory::Gyms));
    }

    #[test]
    fn test_unpositioned_elements_are_dropped() {
        let taxonomy = Taxonomy::default();
        let mut missing = element(1, &[("leisure", "park")]);
        missing.lat = None;
        let mut area = element(2, &[("leisure", "park")]);
        area.kind = "way".to_string();
        area.lat = None;
        area.lon = None;
        area.center = Some(Center { lat: 41.0, lon: -73.0 });

        let buckets = classify_elements(&taxonomy, &[missing, area]);

        assert_eq!(buckets.parks.len(), 1);
        assert_eq!(buckets.parks[0].id, 2);
        assert_eq!((buckets.parks[0].lat, buckets.parks[0].lng), (41.0, -73.0));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let taxonomy = Taxonomy::default();
        let elements = vec![
            element(1, &[("shop", "supermarket")]),
            element(2, &[("leisure", "tennis_court")]),
            element(3, &[("leisure", "park")]),
        ];
        assert_eq!(
            classify_elements(&taxonomy, &elements),
            classify_elements(&taxonomy, &elements)
        );
    }
}
