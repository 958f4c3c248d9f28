//! Multi-destination itineraries.
//!
//! Destinations are resolved to serving stops, ordered by a pluggable
//! [`DestinationOrdering`], routed one after another from the current stop,
//! and finished with a walking leg from the serving stop to the place itself
//! when the two are more than the walking threshold apart.

use std::fmt;
use std::str::FromStr;

use geojson::FeatureCollection;
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::{normalize_id, PlaceOfInterest, Stop};
use crate::distance::{travel_minutes, Coordinates};
use crate::error::{Error, Result};
use crate::graph::round_to;
use crate::mode::{Mode, ModeFilter, WeightMetric};
use crate::output::route_geojson;

use super::{push_unique, Leg, RouteFailure, RouteSummary, Router, TransferEvent, WALK_LINE};

/// Where an itinerary begins.
#[derive(Debug, Clone, PartialEq)]
pub enum Start {
    Stop(String),
    Coordinates(Coordinates),
}

impl fmt::Display for Start {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Start::Stop(id) => f.write_str(id),
            Start::Coordinates(position) => write!(f, "{position}"),
        }
    }
}

impl FromStr for Start {
    type Err = Error;

    /// `"lat,lon"` parses as coordinates; anything else is a stop id.
    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::invalid_request("start must not be empty"));
        }
        if value.contains(',') {
            return value.parse().map(Start::Coordinates);
        }
        Ok(Start::Stop(value.to_string()))
    }
}

/// Multi-destination routing request.
#[derive(Debug, Clone)]
pub struct ItineraryRequest {
    pub start: Start,
    pub destination_ids: Vec<String>,
    pub mode: ModeFilter,
    pub metric: WeightMetric,
}

impl ItineraryRequest {
    pub fn new(start: Start, destination_ids: Vec<String>) -> Self {
        Self {
            start,
            destination_ids,
            mode: ModeFilter::All,
            metric: WeightMetric::Time,
        }
    }

    pub fn with_mode(mut self, mode: ModeFilter) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_metric(mut self, metric: WeightMetric) -> Self {
        self.metric = metric;
        self
    }
}

/// A destination paired with the stop that serves it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedDestination<'a> {
    pub place: &'a PlaceOfInterest,
    pub stop: &'a Stop,
    /// Position used when ordering: the declared stop if bound, else the place.
    pub anchor: Coordinates,
}

/// Strategy deciding the visiting order of destinations.
pub trait DestinationOrdering: Send + Sync {
    /// Return `destinations` in visiting order, starting from `origin`.
    fn order<'a>(
        &self,
        origin: &Stop,
        destinations: Vec<ResolvedDestination<'a>>,
    ) -> Vec<ResolvedDestination<'a>>;
}

/// Greedy nearest-neighbour tour construction.
///
/// At each step the unvisited destination whose anchor is closest to the
/// current stop is chosen, and the current stop moves to that destination's
/// serving stop. The result is not guaranteed to be the shortest tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbourOrdering;

impl DestinationOrdering for NearestNeighbourOrdering {
    fn order<'a>(
        &self,
        origin: &Stop,
        mut remaining: Vec<ResolvedDestination<'a>>,
    ) -> Vec<ResolvedDestination<'a>> {
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut current = origin.position;
        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (index, candidate) in remaining.iter().enumerate() {
                let distance = current.distance_km(&candidate.anchor);
                if distance < best_distance {
                    best = index;
                    best_distance = distance;
                }
            }
            let next = remaining.remove(best);
            current = next.stop.position;
            ordered.push(next);
        }
        ordered
    }
}

/// Destination reached by the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationInfo {
    pub place_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub stop_id: String,
    pub stop_name: String,
}

/// Destination left out of the itinerary, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDestination {
    pub place_id: String,
    pub reason: String,
}

/// Totals plus headline counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItinerarySummary {
    #[serde(flatten)]
    pub totals: RouteSummary,
    pub stops_count: usize,
    pub transfers_count: usize,
}

/// Complete multi-destination itinerary.
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryResponse {
    pub mode: ModeFilter,
    pub metric: WeightMetric,
    pub summary: ItinerarySummary,
    pub legs: Vec<Leg>,
    pub stops_passed: Vec<String>,
    pub transfers: Vec<TransferEvent>,
    pub destinations: Vec<DestinationInfo>,
    pub skipped: Vec<SkippedDestination>,
    pub start_stop: Stop,
    pub end_stop: Stop,
    pub geometry: Vec<[f64; 2]>,
    pub geojson: FeatureCollection,
}

impl Router {
    /// Plan a route visiting every requested destination.
    ///
    /// Destinations that cannot be found, have no serving stop, cannot be
    /// reached, or repeat an earlier id are listed in `skipped`; the
    /// itinerary continues with the rest.
    pub fn plan_itinerary(
        &self,
        request: &ItineraryRequest,
    ) -> std::result::Result<ItineraryResponse, RouteFailure> {
        if request.destination_ids.is_empty() {
            return Err(RouteFailure::NoDestinations);
        }

        let start = self.resolve_start(&request.start, request.mode)?;

        let mut skipped = Vec::new();
        let mut resolved = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for raw_id in &request.destination_ids {
            let place_id = normalize_id(raw_id);
            if seen.contains(&place_id) {
                skipped.push(SkippedDestination {
                    place_id: place_id.to_string(),
                    reason: "duplicate destination".to_string(),
                });
                continue;
            }
            seen.push(place_id);

            let Some(place) = self.store().place(place_id) else {
                skipped.push(SkippedDestination {
                    place_id: place_id.to_string(),
                    reason: RouteFailure::PlaceNotFound {
                        place_id: place_id.to_string(),
                    }
                    .to_string(),
                });
                continue;
            };
            match self.resolve_place_stop(place, request.mode) {
                Ok(stop) => {
                    let bound = place.nearest_stop_id.as_deref() == Some(stop.id.as_str());
                    resolved.push(ResolvedDestination {
                        place,
                        stop,
                        anchor: if bound { stop.position } else { place.position },
                    });
                }
                Err(failure) => skipped.push(SkippedDestination {
                    place_id: place_id.to_string(),
                    reason: failure.to_string(),
                }),
            }
        }

        if resolved.is_empty() {
            return Err(RouteFailure::NoValidDestinations);
        }

        let ordered = self.ordering.order(start, resolved);
        let mut builder = ItineraryBuilder::default();
        let mut current = start;

        for destination in ordered {
            if current.id != destination.stop.id {
                match self.find_route(&current.id, &destination.stop.id, request.mode, request.metric) {
                    Ok(plan) => {
                        for mut leg in plan.legs {
                            leg.destination = Some(destination.place.name.clone());
                            builder.legs.push(leg);
                        }
                        for name in &plan.stops_passed {
                            push_unique(&mut builder.stops_passed, name);
                        }
                        builder.transfers.extend(plan.transfers);
                        for point in plan.geometry {
                            builder.push_point(point);
                        }
                        current = destination.stop;
                    }
                    Err(failure) => {
                        debug!(place = %destination.place.id, %failure, "destination unreachable");
                        skipped.push(SkippedDestination {
                            place_id: destination.place.id.clone(),
                            reason: failure.to_string(),
                        });
                        continue;
                    }
                }
            } else {
                push_unique(&mut builder.stops_passed, &current.name);
                builder.push_point(current.position.lat_lon());
            }

            if let Some(walk) = self.walking_leg(current, destination.place) {
                builder.legs.push(walk);
                builder.push_point(destination.place.position.lat_lon());
            }
            builder.destinations.push(DestinationInfo {
                place_id: destination.place.id.clone(),
                name: destination.place.name.clone(),
                lat: destination.place.position.lat,
                lon: destination.place.position.lon,
                stop_id: destination.stop.id.clone(),
                stop_name: destination.stop.name.clone(),
            });
        }

        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "itinerary skipped destinations");
        }

        let totals = RouteSummary::from_legs(&builder.legs);
        let geojson = route_geojson(&builder.geometry);
        Ok(ItineraryResponse {
            mode: request.mode,
            metric: request.metric,
            summary: ItinerarySummary {
                totals,
                stops_count: builder.stops_passed.len(),
                transfers_count: builder.transfers.len(),
            },
            legs: builder.legs,
            stops_passed: builder.stops_passed,
            transfers: builder.transfers,
            destinations: builder.destinations,
            skipped,
            start_stop: start.clone(),
            end_stop: current.clone(),
            geometry: builder.geometry,
            geojson,
        })
    }

    fn resolve_start(
        &self,
        start: &Start,
        filter: ModeFilter,
    ) -> std::result::Result<&Stop, RouteFailure> {
        let graph = self.graph_for(filter);
        match start {
            Start::Stop(id) => {
                let id = normalize_id(id);
                graph.stop(id).ok_or_else(|| RouteFailure::StopNotFound {
                    stop_id: id.to_string(),
                    mode: filter,
                })
            }
            Start::Coordinates(position) => graph
                .nearest_stop(*position, filter)
                .and_then(|nearest| graph.stop(&nearest.stop.id))
                .ok_or(RouteFailure::NoStopNearCoordinates {
                    position: *position,
                    mode: filter,
                }),
        }
    }

    /// Walk from `stop` to `place`, if it is further than the threshold.
    fn walking_leg(&self, stop: &Stop, place: &PlaceOfInterest) -> Option<Leg> {
        let options = self.options();
        let distance = stop.position.distance_km(&place.position);
        if !(distance > options.walk_threshold_km) {
            return None;
        }

        Some(Leg {
            from_id: stop.id.clone(),
            from_name: stop.name.clone(),
            to_id: place.id.clone(),
            to_name: place.name.clone(),
            mode: Mode::Walk,
            line: WALK_LINE.to_string(),
            distance_km: round_to(distance, 3),
            time_minutes: round_to(travel_minutes(distance, options.walking_speed_kmh), 2),
            cost_idr: crate::fares::walk_fare(),
            is_transfer: false,
            destination: Some(place.name.clone()),
        })
    }
}

#[derive(Debug, Default)]
struct ItineraryBuilder {
    legs: Vec<Leg>,
    stops_passed: Vec<String>,
    transfers: Vec<TransferEvent>,
    destinations: Vec<DestinationInfo>,
    geometry: Vec<[f64; 2]>,
}

impl ItineraryBuilder {
    /// Append a point unless it repeats the previous one.
    fn push_point(&mut self, point: [f64; 2]) {
        if self.geometry.last() != Some(&point) {
            self.geometry.push(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, lat: f64, lon: f64) -> PlaceOfInterest {
        PlaceOfInterest {
            id: id.to_string(),
            name: id.to_string(),
            position: Coordinates::new(lat, lon),
            region: None,
            category: None,
            description: None,
            nearest_stop_id: None,
        }
    }

    #[test]
    fn start_parses_coordinates_or_stop_id() {
        assert_eq!(
            "-6.2,106.8".parse::<Start>().unwrap(),
            Start::Coordinates(Coordinates::new(-6.2, 106.8))
        );
        assert_eq!(
            "Stop_MRT_01".parse::<Start>().unwrap(),
            Start::Stop("Stop_MRT_01".to_string())
        );
        assert!("".parse::<Start>().is_err());
        assert!("north,south".parse::<Start>().is_err());
    }

    #[test]
    fn greedy_ordering_visits_nearest_first() {
        let origin = Stop::new("Halte_0", "Origin", 0.0, 0.0);
        let stops = [
            Stop::new("Halte_far", "Far", 0.0, 0.05),
            Stop::new("Halte_near", "Near", 0.0, 0.01),
            Stop::new("Halte_mid", "Mid", 0.0, 0.03),
        ];
        let places = [
            place("far", 0.0, 0.05),
            place("near", 0.0, 0.01),
            place("mid", 0.0, 0.03),
        ];
        let destinations = stops
            .iter()
            .zip(places.iter())
            .map(|(stop, place)| ResolvedDestination {
                place,
                stop,
                anchor: place.position,
            })
            .collect();

        let ordered = NearestNeighbourOrdering.order(&origin, destinations);
        let ids: Vec<&str> = ordered.iter().map(|d| d.place.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
    }
}
