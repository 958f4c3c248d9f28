use std::fmt::Write;

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{json, Map};

use crate::routing::{ItineraryResponse, Leg, RoutePlan, RouteSummary, TransferEvent};

/// Build the map representation of a path.
///
/// `geometry` holds `[lat, lon]` pairs; GeoJSON positions are `[lon, lat]`.
/// The collection holds one `LineString` for the whole path followed by one
/// `Point` per coordinate tagged `start`, `end`, or `stop`.
pub fn route_geojson(geometry: &[[f64; 2]]) -> FeatureCollection {
    let mut features = Vec::with_capacity(geometry.len() + 1);

    if !geometry.is_empty() {
        let line = geometry.iter().map(|[lat, lon]| vec![*lon, *lat]).collect();
        features.push(feature(Value::LineString(line), properties("route", None)));
    }

    let last = geometry.len().saturating_sub(1);
    for (index, [lat, lon]) in geometry.iter().enumerate() {
        let kind = if index == 0 {
            "start"
        } else if index == last {
            "end"
        } else {
            "stop"
        };
        features.push(feature(
            Value::Point(vec![*lon, *lat]),
            properties(kind, Some(index)),
        ));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(kind: &str, index: Option<usize>) -> Map<String, serde_json::Value> {
    let mut properties = Map::new();
    properties.insert("type".to_string(), json!(kind));
    if let Some(index) = index {
        properties.insert("index".to_string(), json!(index));
    }
    properties
}

fn feature(value: Value, properties: Map<String, serde_json::Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Plain-text rendering of a single route.
pub fn render_route(plan: &RoutePlan) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Route: {} -> {} (mode {}, optimised for {})",
        plan.start_stop.name, plan.end_stop.name, plan.mode, plan.metric
    );
    if let Some(place) = &plan.destination {
        let _ = writeln!(buffer, "Destination: {} ({})", place.name, place.id);
    }
    write_legs(&mut buffer, &plan.legs);
    write_summary(&mut buffer, &plan.summary);
    write_transfers(&mut buffer, &plan.transfers);
    buffer
}

/// Plain-text rendering of a multi-destination itinerary.
pub fn render_itinerary(itinerary: &ItineraryResponse) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Itinerary from {} (mode {}, optimised for {})",
        itinerary.start_stop.name, itinerary.mode, itinerary.metric
    );
    for (position, destination) in itinerary.destinations.iter().enumerate() {
        let _ = writeln!(
            buffer,
            "{:>3}. {} via {}",
            position + 1,
            destination.name,
            destination.stop_name
        );
    }
    write_legs(&mut buffer, &itinerary.legs);
    write_summary(&mut buffer, &itinerary.summary.totals);
    let _ = writeln!(
        buffer,
        "Stops passed: {}",
        itinerary.summary.stops_count
    );
    write_transfers(&mut buffer, &itinerary.transfers);
    for skipped in &itinerary.skipped {
        let _ = writeln!(buffer, "Skipped {}: {}", skipped.place_id, skipped.reason);
    }
    buffer
}

fn write_legs(buffer: &mut String, legs: &[Leg]) {
    if legs.is_empty() {
        let _ = writeln!(buffer, "No travel needed.");
        return;
    }
    for (index, leg) in legs.iter().enumerate() {
        let _ = writeln!(
            buffer,
            "{:>3}: [{}] {} -> {} ({}) {:.3} km, {:.2} min, Rp {}",
            index + 1,
            leg.mode,
            leg.from_name,
            leg.to_name,
            leg.line,
            leg.distance_km,
            leg.time_minutes,
            leg.cost_idr
        );
    }
}

fn write_summary(buffer: &mut String, summary: &RouteSummary) {
    let _ = writeln!(
        buffer,
        "Total: {:.2} km, {:.1} min, Rp {}",
        summary.total_distance_km, summary.total_time_minutes, summary.total_cost_idr
    );
}

fn write_transfers(buffer: &mut String, transfers: &[TransferEvent]) {
    for transfer in transfers {
        let _ = writeln!(
            buffer,
            "Transfer at {}: {} -> {}",
            transfer.at, transfer.from_mode, transfer.to_mode
        );
    }
}
