//! MobilityGraph library entry points.
//!
//! This crate loads Jakarta transit entities (MRT, LRT and TransJakarta stops,
//! fixed routes, places of interest) from a SQLite dataset, builds a
//! multi-modal routing graph, and answers route and itinerary queries with
//! fare-accurate breakdowns. Front ends (the CLI) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod dataset;
pub mod db;
pub mod distance;
pub mod error;
pub mod fares;
pub mod graph;
pub mod handle;
pub mod mode;
pub mod output;
pub mod path;
pub mod routing;
pub mod spatial;

pub use dataset::{default_dataset_path, resolve_dataset_path};
pub use db::{
    load_entity_store, EntityStore, EntitySummary, PlaceOfInterest, Region, RouteDefinition, Stop,
    StopId,
};
pub use distance::Coordinates;
pub use error::{Error, Result};
pub use fares::Rupiah;
pub use graph::{build_graph, build_graph_with, Graph, GraphBuildOptions, GraphStats, NearestStop};
pub use handle::RouterHandle;
pub use mode::{mode_catalog, Mode, ModeFilter, ModeInfo, WeightMetric};
pub use output::{render_itinerary, render_route, route_geojson};
pub use routing::{
    DestinationOrdering, ItineraryRequest, ItineraryResponse, Leg, NearestNeighbourOrdering,
    RouteFailure, RoutePlan, RouteSummary, Router, RouterOptions, Start, TransferEvent,
};
