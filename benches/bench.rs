// Criterion benchmarks for Nearby Listings

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use nearby_listings::core::{
    build_query_plan, classify_elements, ProximityMatcher, Taxonomy,
    distance::{haversine_m, expand_bbox_by_radius},
};
use nearby_listings::models::{
    BoundingBox, Listing, OverpassElement, ProximityRequest, SaleType, SubtypeSelection,
};

const TAG_SAMPLES: &[&[(&str, &str)]] = &[
    &[("leisure", "park")],
    &[("amenity", "place_of_worship"), ("religion", "christian")],
    &[("shop", "supermarket")],
    &[("leisure", "fitness_centre"), ("sport", "yoga")],
    &[("leisure", "tennis_court")],
    &[("golf", "driving_range")],
    &[("highway", "bus_stop")],
];

fn create_listing(id: usize, lat: f64, lng: f64) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("Listing {}", id),
        address: format!("{} Bench St", id),
        lat,
        lng,
        price: 250_000 + (id as u64 % 50) * 10_000,
        sale_type: if id % 2 == 0 { SaleType::Sale } else { SaleType::Rent },
        beds: (id % 5) as u32,
        baths: 1 + (id % 3) as u32,
        sqft: 600 + (id % 20) as u32 * 50,
        google_maps_link: String::new(),
        image_url: None,
    }
}

fn create_elements(count: usize) -> Vec<OverpassElement> {
    (0..count)
        .map(|i| OverpassElement {
            kind: "node".to_string(),
            id: i as u64,
            lat: Some(40.70 + (i as f64 * 0.0007) % 0.1),
            lon: Some(-74.05 + (i as f64 * 0.0011) % 0.1),
            center: None,
            tags: TAG_SAMPLES[i % TAG_SAMPLES.len()]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
        .collect()
}

fn create_request() -> ProximityRequest {
    ProximityRequest {
        parks: Some(800.0),
        worship: SubtypeSelection::new(vec!["church"], 1500.0),
        stores: SubtypeSelection::new(vec!["grocery"], 1000.0),
        gyms: SubtypeSelection::new(vec!["yoga_studio", "gym"], 1200.0),
        sports: SubtypeSelection::new(vec!["tennis", "golf_driving_range"], 2000.0),
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_m", |b| {
        b.iter(|| {
            haversine_m(
                black_box(40.7128),
                black_box(-74.0060),
                black_box(40.72),
                black_box(-74.01),
            )
        });
    });
}

fn bench_query_plan(c: &mut Criterion) {
    let taxonomy = Taxonomy::default();
    let request = create_request();
    let bbox = expand_bbox_by_radius(&BoundingBox::new(-74.05, 40.70, -73.95, 40.80), 2000.0);

    c.bench_function("build_query_plan_all_categories", |b| {
        b.iter(|| build_query_plan(black_box(&taxonomy), black_box(&bbox), black_box(&request), 25));
    });
}

fn bench_classification(c: &mut Criterion) {
    let taxonomy = Taxonomy::default();
    let mut group = c.benchmark_group("classification");

    for element_count in [100, 1000, 5000].iter() {
        let elements = create_elements(*element_count);

        group.bench_with_input(
            BenchmarkId::new("classify_elements", element_count),
            element_count,
            |b, _| {
                b.iter(|| classify_elements(black_box(&taxonomy), black_box(&elements)));
            },
        );
    }

    group.finish();
}

fn bench_proximity(c: &mut Criterion) {
    let taxonomy = Taxonomy::default();
    let request = create_request();
    let buckets = classify_elements(&taxonomy, &create_elements(2000));
    let matcher = ProximityMatcher::new(&taxonomy, &request);

    let mut group = c.benchmark_group("proximity");

    for listing_count in [10, 100, 500].iter() {
        let listings: Vec<Listing> = (0..*listing_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.1;
                let lon_offset = (i as f64 * 0.0013) % 0.1;
                create_listing(i, 40.70 + lat_offset, -74.05 + lon_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("matches", listing_count),
            listing_count,
            |b, _| {
                b.iter(|| {
                    listings
                        .iter()
                        .filter(|listing| matcher.matches(black_box(listing), black_box(&buckets)))
                        .count()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_query_plan,
    bench_classification,
    bench_proximity
);

criterion_main!(benches);
