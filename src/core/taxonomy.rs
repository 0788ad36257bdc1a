//! Mapping from UI-level subtype keys to OpenStreetMap tag values.
//!
//! The tables are built once at startup and shared read-only between the
//! query builder, the result classifier and the proximity matcher, so all
//! three agree on the same vocabulary.

use std::collections::{BTreeMap, BTreeSet};

/// `leisure` value for parks
pub const LEISURE_PARK: &str = "park";
/// `amenity` value for places of worship
pub const AMENITY_PLACE_OF_WORSHIP: &str = "place_of_worship";
/// Generic `leisure` value for gyms, narrowed by a `sport` tag
pub const LEISURE_FITNESS_CENTRE: &str = "fitness_centre";
/// Generic `leisure` value for sports venues, narrowed by a `sport` tag
pub const LEISURE_SPORTS_CENTRE: &str = "sports_centre";
/// `golf` value for driving ranges
pub const GOLF_DRIVING_RANGE: &str = "driving_range";

/// Sports key matched through the `golf` tag instead of `leisure`
pub const DRIVING_RANGE_KEY: &str = "golf_driving_range";

const WORSHIP_RELIGIONS: &[(&str, &str)] = &[
    ("synagogue", "jewish"),
    ("church", "christian"),
    ("mosque", "muslim"),
    ("hindu_temple", "hindu"),
    ("buddhist_temple", "buddhist"),
];

const STORE_GROUPS: &[(&str, &[&str])] = &[
    ("grocery", &["supermarket", "convenience", "greengrocer"]),
    ("home_improvement", &["doityourself", "hardware"]),
    ("appliance", &["appliance", "electronics"]),
    ("farm_supplies", &["agrarian", "farm"]),
];

const GYM_KEYS: &[(&str, &[&str])] = &[
    ("gym", &["fitness_centre", "gym"]),
    ("fitness_center", &["fitness_centre", "fitness_station"]),
    ("yoga_studio", &["yoga"]),
    ("pilates_studio", &["pilates"]),
    ("crossfit", &["crossfit"]),
    ("martial_arts", &["martial_arts", "karate", "judo", "taekwondo", "boxing"]),
    ("climbing_gym", &["climbing"]),
    ("dance_studio", &["dance"]),
];

/// Gym keys that are plain gyms; every other gym key is a specialized studio
const GENERIC_GYM_KEYS: &[&str] = &["gym", "fitness_center"];

const SPORT_KEYS: &[(&str, &[&str])] = &[
    ("tennis", &["tennis_court", "tennis"]),
    ("golf", &["golf_course", "golf"]),
];

/// Immutable subtype → tag tables
#[derive(Debug, Clone)]
pub struct Taxonomy {
    worship: BTreeMap<String, String>,
    stores: BTreeMap<String, Vec<String>>,
    gyms: BTreeMap<String, Vec<String>>,
    studio_keys: BTreeSet<String>,
    sports: BTreeMap<String, Vec<String>>,
    gym_vocabulary: BTreeSet<String>,
    gym_activities: BTreeSet<String>,
    sports_vocabulary: BTreeSet<String>,
}

impl Taxonomy {
    /// Build a taxonomy from explicit tables
    ///
    /// `studio_keys` marks the gym keys whose values must also be matched
    /// through the `sport` tag of generic fitness centres.
    pub fn new(
        worship: BTreeMap<String, String>,
        stores: BTreeMap<String, Vec<String>>,
        gyms: BTreeMap<String, Vec<String>>,
        studio_keys: BTreeSet<String>,
        sports: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let gym_vocabulary = gyms.values().flatten().cloned().collect();
        let gym_activities = gyms
            .iter()
            .filter(|(key, _)| studio_keys.contains(*key))
            .flat_map(|(_, values)| values.iter().cloned())
            .collect();
        let sports_vocabulary = sports.values().flatten().cloned().collect();

        Self {
            worship,
            stores,
            gyms,
            studio_keys,
            sports,
            gym_vocabulary,
            gym_activities,
            sports_vocabulary,
        }
    }

    /// Religion values for the requested worship keys
    ///
    /// Unknown keys pass through unchanged.
    pub fn religions_for(&self, keys: &[String]) -> BTreeSet<String> {
        keys.iter()
            .map(|key| self.worship.get(key).unwrap_or(key).clone())
            .collect()
    }

    /// Union of `shop` values for the requested store groups
    pub fn shops_for(&self, groups: &[String]) -> BTreeSet<String> {
        union_for(&self.stores, groups)
    }

    /// Union of gym tag values for the requested gym keys
    pub fn gym_tags_for(&self, keys: &[String]) -> BTreeSet<String> {
        union_for(&self.gyms, keys)
    }

    /// Tag values of the requested specialized studios, matched against `sport`
    pub fn studio_sports_for(&self, keys: &[String]) -> BTreeSet<String> {
        let studios: Vec<String> = keys
            .iter()
            .filter(|key| self.studio_keys.contains(*key))
            .cloned()
            .collect();
        union_for(&self.gyms, &studios)
    }

    /// Union of sports tag values for the requested keys, excluding the driving range
    pub fn sport_tags_for(&self, keys: &[String]) -> BTreeSet<String> {
        union_for(&self.sports, keys)
    }

    /// Every gym tag value known to the taxonomy
    pub fn gym_vocabulary(&self) -> &BTreeSet<String> {
        &self.gym_vocabulary
    }

    /// Gym tag values of specialized studios
    pub fn gym_activities(&self) -> &BTreeSet<String> {
        &self.gym_activities
    }

    /// Every sports tag value known to the taxonomy
    pub fn sports_vocabulary(&self) -> &BTreeSet<String> {
        &self.sports_vocabulary
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        let worship = WORSHIP_RELIGIONS
            .iter()
            .map(|(key, religion)| (key.to_string(), religion.to_string()))
            .collect();
        let stores = owned_table(STORE_GROUPS);
        let gyms = owned_table(GYM_KEYS);
        let studio_keys = GYM_KEYS
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| !GENERIC_GYM_KEYS.contains(key))
            .map(str::to_string)
            .collect();
        let sports = owned_table(SPORT_KEYS);

        Self::new(worship, stores, gyms, studio_keys, sports)
    }
}

fn owned_table(table: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    table
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

fn union_for(table: &BTreeMap<String, Vec<String>>, keys: &[String]) -> BTreeSet<String> {
    keys.iter()
        .filter_map(|key| table.get(key))
        .flatten()
        .cloned()
        .collect()
}
