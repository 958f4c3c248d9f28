//! Route finding over the multi-modal graph.
//!
//! This module provides:
//! - [`Router`] - owns the entity snapshot, the full graph, and one
//!   precomputed subgraph per transit mode
//! - [`Router::find_route`] - single stop-to-stop route with per-run fares
//! - [`Router::route_to_place`] - route to the stop serving a place of interest
//! - [`Router::plan_itinerary`] - multi-destination itinerary with walking legs
//! - [`RouteFailure`] - routing problems reported as data
//!
//! Routing never mutates the graph, so a `Router` can be shared between
//! threads behind an `Arc` (see [`crate::handle::RouterHandle`]).

mod itinerary;
mod segments;

pub use itinerary::{
    DestinationInfo, DestinationOrdering, ItineraryRequest, ItineraryResponse, ItinerarySummary,
    NearestNeighbourOrdering, ResolvedDestination, SkippedDestination, Start,
};
pub use segments::{allocate_fares, mode_runs};

use std::collections::HashMap;
use std::fmt;

use geojson::FeatureCollection;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::db::{normalize_id, EntityStore, PlaceOfInterest, Stop};
use crate::distance::Coordinates;
use crate::fares::Rupiah;
use crate::graph::{build_graph_with, EdgeKind, Graph, GraphBuildOptions, NodeIndex};
use crate::mode::{Mode, ModeFilter, WeightMetric};
use crate::output::route_geojson;
use crate::path::find_route_dijkstra;

/// Label used on walking legs.
pub const WALK_LINE: &str = "Jalan Kaki";

/// Routing problems. These are returned as values, never raised as [`crate::Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteFailure {
    #[error("stop '{stop_id}' not found for mode {mode}")]
    StopNotFound { stop_id: String, mode: ModeFilter },

    #[error("no route found from '{start}' to '{end}' with mode {mode}")]
    NoPath {
        start: String,
        end: String,
        mode: ModeFilter,
    },

    #[error("place '{place_id}' not found")]
    PlaceNotFound { place_id: String },

    #[error("no destinations selected")]
    NoDestinations,

    #[error("no valid destinations found")]
    NoValidDestinations,

    #[error("no stop found near {position} for mode {mode}")]
    NoStopNearCoordinates {
        position: Coordinates,
        mode: ModeFilter,
    },
}

impl RouteFailure {
    /// `{ "error": message, "details": {...} }` body for machine consumers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "details": self,
        })
    }
}

/// One edge traversal (or walk) in a computed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub from_id: String,
    pub from_name: String,
    pub to_id: String,
    pub to_name: String,
    pub mode: Mode,
    pub line: String,
    pub distance_km: f64,
    pub time_minutes: f64,
    pub cost_idr: Rupiah,
    pub is_transfer: bool,
    /// Place this leg travels towards, set on itinerary legs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Route totals; always the plain sum of the leg values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RouteSummary {
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
    pub total_cost_idr: u64,
}

impl RouteSummary {
    pub fn from_legs(legs: &[Leg]) -> Self {
        legs.iter().fold(Self::default(), |mut summary, leg| {
            summary.total_distance_km += leg.distance_km;
            summary.total_time_minutes += leg.time_minutes;
            summary.total_cost_idr += u64::from(leg.cost_idr);
            summary
        })
    }
}

/// Change between modes along a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferEvent {
    pub at: String,
    pub from_mode: Mode,
    pub to_mode: Mode,
}

/// Fully assembled stop-to-stop route.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub mode: ModeFilter,
    pub metric: WeightMetric,
    pub summary: RouteSummary,
    pub legs: Vec<Leg>,
    /// Stop ids along the path, start and end included.
    pub path: Vec<String>,
    pub stops_passed: Vec<String>,
    pub transfers: Vec<TransferEvent>,
    pub start_stop: Stop,
    pub end_stop: Stop,
    /// `[lat, lon]` per path stop.
    pub geometry: Vec<[f64; 2]>,
    pub geojson: FeatureCollection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PlaceOfInterest>,
}

impl RoutePlan {
    pub fn hop_count(&self) -> usize {
        self.legs.len()
    }
}

/// Walking augmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterOptions {
    pub walking_speed_kmh: f64,
    /// Walking legs are only emitted for distances strictly above this.
    pub walk_threshold_km: f64,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 4.0,
            walk_threshold_km: 0.03,
        }
    }
}

/// Read-only routing service over one graph snapshot.
pub struct Router {
    store: EntityStore,
    graph: Graph,
    by_mode: HashMap<Mode, Graph>,
    options: RouterOptions,
    ordering: Box<dyn DestinationOrdering>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Wrap an already built graph, precomputing the per-mode subgraphs.
    pub fn new(store: EntityStore, graph: Graph) -> Self {
        let by_mode = Mode::TRANSIT
            .into_iter()
            .map(|mode| (mode, graph.filtered(ModeFilter::Only(mode))))
            .collect();
        Self {
            store,
            graph,
            by_mode,
            options: RouterOptions::default(),
            ordering: Box::new(NearestNeighbourOrdering),
        }
    }

    /// Build the graph from `store` and wrap it.
    pub fn from_store(store: EntityStore, options: &GraphBuildOptions) -> Self {
        let graph = build_graph_with(&store, options);
        Self::new(store, graph)
    }

    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the multi-destination ordering strategy.
    pub fn with_ordering(mut self, ordering: impl DestinationOrdering + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// Graph searched for `filter`.
    pub fn graph_for(&self, filter: ModeFilter) -> &Graph {
        match filter {
            ModeFilter::All => &self.graph,
            ModeFilter::Only(mode) => self.by_mode.get(&mode).unwrap_or(&self.graph),
        }
    }

    /// Least-cost route between two stops under `filter`, minimising `metric`.
    pub fn find_route(
        &self,
        start_id: &str,
        end_id: &str,
        filter: ModeFilter,
        metric: WeightMetric,
    ) -> Result<RoutePlan, RouteFailure> {
        let graph = self.graph_for(filter);
        let start_id = normalize_id(start_id);
        let end_id = normalize_id(end_id);

        let start = graph
            .index_of(start_id)
            .ok_or_else(|| RouteFailure::StopNotFound {
                stop_id: start_id.to_string(),
                mode: filter,
            })?;
        let end = graph
            .index_of(end_id)
            .ok_or_else(|| RouteFailure::StopNotFound {
                stop_id: end_id.to_string(),
                mode: filter,
            })?;

        let path = find_route_dijkstra(graph, start, end, metric).ok_or_else(|| {
            RouteFailure::NoPath {
                start: start_id.to_string(),
                end: end_id.to_string(),
                mode: filter,
            }
        })?;

        debug!(
            start = start_id,
            end = end_id,
            mode = %filter,
            metric = %metric,
            hops = path.len().saturating_sub(1),
            "route found"
        );
        Ok(assemble_plan(graph, &path, filter, metric))
    }

    /// Route from a stop to the stop serving a place of interest.
    pub fn route_to_place(
        &self,
        start_id: &str,
        place_id: &str,
        filter: ModeFilter,
        metric: WeightMetric,
    ) -> Result<RoutePlan, RouteFailure> {
        let place = self
            .store
            .place(place_id)
            .ok_or_else(|| RouteFailure::PlaceNotFound {
                place_id: place_id.to_string(),
            })?;
        let stop = self.resolve_place_stop(place, filter)?;

        let mut plan = self.find_route(start_id, &stop.id, filter, metric)?;
        plan.destination = Some(place.clone());
        Ok(plan)
    }

    /// Stop serving `place` in the graph for `filter`.
    ///
    /// The declared `nearest_stop_id` is used when that stop exists in the
    /// selected graph, otherwise the geographically nearest stop.
    pub fn resolve_place_stop(
        &self,
        place: &PlaceOfInterest,
        filter: ModeFilter,
    ) -> Result<&Stop, RouteFailure> {
        let graph = self.graph_for(filter);
        if let Some(stop) = place
            .nearest_stop_id
            .as_deref()
            .and_then(|id| graph.stop(id))
        {
            return Ok(stop);
        }

        graph
            .nearest_stop(place.position, filter)
            .and_then(|nearest| graph.stop(&nearest.stop.id))
            .ok_or(RouteFailure::NoStopNearCoordinates {
                position: place.position,
                mode: filter,
            })
    }
}

/// Turn a node path into legs, fares, totals and geometry.
fn assemble_plan(
    graph: &Graph,
    path: &[NodeIndex],
    filter: ModeFilter,
    metric: WeightMetric,
) -> RoutePlan {
    let mut legs = Vec::with_capacity(path.len().saturating_sub(1));
    let mut transfers = Vec::new();

    for pair in path.windows(2) {
        let (Some(from), Some(to), Some(edge)) = (
            graph.node(pair[0]),
            graph.node(pair[1]),
            graph.edge(pair[0], pair[1]),
        ) else {
            continue;
        };

        if let EdgeKind::Transfer {
            from: from_mode,
            to: to_mode,
        } = edge.kind
        {
            transfers.push(TransferEvent {
                at: from.name.clone(),
                from_mode,
                to_mode,
            });
        }

        legs.push(Leg {
            from_id: from.id.clone(),
            from_name: from.name.clone(),
            to_id: to.id.clone(),
            to_name: to.name.clone(),
            mode: edge.mode,
            line: edge.line.clone(),
            distance_km: edge.distance_km,
            time_minutes: edge.time_minutes,
            cost_idr: 0,
            is_transfer: edge.is_transfer(),
            destination: None,
        });
    }

    allocate_fares(&mut legs);

    let stops: Vec<&Stop> = path.iter().filter_map(|&index| graph.node(index)).collect();
    let mut stops_passed: Vec<String> = Vec::new();
    for stop in &stops {
        push_unique(&mut stops_passed, &stop.name);
    }
    let geometry: Vec<[f64; 2]> = stops.iter().map(|stop| stop.position.lat_lon()).collect();
    let geojson = route_geojson(&geometry);

    // The caller guarantees a non-empty path of known nodes.
    let start_stop = stops.first().map(|stop| (*stop).clone());
    let end_stop = stops.last().map(|stop| (*stop).clone());

    RoutePlan {
        mode: filter,
        metric,
        summary: RouteSummary::from_legs(&legs),
        legs,
        path: stops.iter().map(|stop| stop.id.clone()).collect(),
        stops_passed,
        transfers,
        start_stop: start_stop.unwrap_or_else(placeholder_stop),
        end_stop: end_stop.unwrap_or_else(placeholder_stop),
        geometry,
        geojson,
        destination: None,
    }
}

fn placeholder_stop() -> Stop {
    Stop::new("", "", 0.0, 0.0)
}

pub(crate) fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}
