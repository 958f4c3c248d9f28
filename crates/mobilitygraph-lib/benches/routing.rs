use criterion::{criterion_group, criterion_main, Criterion};
use mobilitygraph_lib::{
    build_graph, Coordinates, EntityStore, ItineraryRequest, ModeFilter, PlaceOfInterest,
    RouteDefinition, Router, Start, Stop, WeightMetric,
};
use once_cell::sync::Lazy;
use std::hint::black_box;

const GRID: usize = 30;
const SPACING_DEGREES: f64 = 0.004;

/// Busway grid with one MRT line running along the diagonal.
fn synthetic_store() -> EntityStore {
    let mut stops = Vec::with_capacity(GRID * GRID + GRID);
    for row in 0..GRID {
        for col in 0..GRID {
            stops.push(Stop::new(
                &format!("Halte_{row}_{col}"),
                format!("Halte {row}-{col}"),
                -6.30 + row as f64 * SPACING_DEGREES,
                106.70 + col as f64 * SPACING_DEGREES,
            ));
        }
    }
    let mut line = Vec::with_capacity(GRID);
    for step in 0..GRID {
        let id = format!("Stop_MRT_{step:02}");
        stops.push(Stop::new(
            &id,
            format!("MRT {step}"),
            -6.30 + step as f64 * SPACING_DEGREES + 0.0005,
            106.70 + step as f64 * SPACING_DEGREES + 0.0005,
        ));
        line.push(id);
    }
    let routes = vec![RouteDefinition {
        id: "Route_MRT_Diagonal".into(),
        name: "MRT Diagonal".into(),
        stop_ids: line,
    }];
    let places = (0..5)
        .map(|i| PlaceOfInterest {
            id: format!("Place_{i}"),
            name: format!("Place {i}"),
            position: Coordinates::new(-6.29 + i as f64 * 0.02, 106.80 - i as f64 * 0.015),
            region: None,
            category: None,
            description: None,
            nearest_stop_id: None,
        })
        .collect();
    EntityStore::new(stops, routes, places, Vec::new())
}

static STORE: Lazy<EntityStore> = Lazy::new(synthetic_store);
static ROUTER: Lazy<Router> = Lazy::new(|| {
    let store = synthetic_store();
    let graph = build_graph(&store);
    Router::new(store, graph)
});

fn benchmark_routing(c: &mut Criterion) {
    c.bench_function("build_graph_grid", |b| {
        let store = &*STORE;
        b.iter(|| black_box(build_graph(store).edge_count()));
    });

    let router = &*ROUTER;
    let last = GRID - 1;
    let goal = format!("Halte_{last}_{last}");

    c.bench_function("route_corner_to_corner_time", |b| {
        b.iter(|| {
            let plan = router
                .find_route("Halte_0_0", &goal, ModeFilter::All, WeightMetric::Time)
                .expect("route exists");
            black_box(plan.hop_count())
        });
    });

    c.bench_function("route_corner_to_corner_distance", |b| {
        b.iter(|| {
            let plan = router
                .find_route("Halte_0_0", &goal, ModeFilter::All, WeightMetric::Distance)
                .expect("route exists");
            black_box(plan.summary.total_distance_km)
        });
    });

    let request = ItineraryRequest::new(
        Start::Stop("Halte_0_0".into()),
        (0..5).map(|i| format!("Place_{i}")).collect(),
    );
    c.bench_function("itinerary_five_places", |b| {
        b.iter(|| {
            let itinerary = router.plan_itinerary(&request).expect("itinerary planned");
            black_box(itinerary.legs.len())
        });
    });
}

criterion_group!(benches, benchmark_routing);
criterion_main!(benches);
