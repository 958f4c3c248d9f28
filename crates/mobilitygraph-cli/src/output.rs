//! Output formatting for command results.
//!
//! Every command result can be printed as human-readable text or as pretty
//! JSON. Route and itinerary text comes from the library renderers; entity
//! listings are formatted here with mode badges.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use mobilitygraph_lib::{
    EntitySummary, GraphStats, ItineraryResponse, ModeInfo, NearestStop, PlaceOfInterest,
    Region, RoutePlan, Stop,
};

use crate::terminal::{format_rupiah, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Write `value` as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::other)?;
    out.write_all(b"\n")
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    write_json(&mut io::stdout().lock(), value)
}

pub fn format_summary(summary: &EntitySummary) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "Stops: {}", summary.total_stops);
    let _ = writeln!(buffer, "  MRT: {}", summary.mrt_stops);
    let _ = writeln!(buffer, "  LRT: {}", summary.lrt_stops);
    let _ = writeln!(buffer, "  TJ: {}", summary.tj_stops);
    let _ = writeln!(buffer, "Routes: {}", summary.total_routes);
    let _ = writeln!(buffer, "Places: {}", summary.total_places);
    for (category, count) in &summary.places_by_category {
        let _ = writeln!(buffer, "  {category}: {count}");
    }
    let _ = writeln!(buffer, "Regions: {}", summary.total_regions);
    buffer
}

pub fn format_modes(modes: &[ModeInfo]) -> String {
    let mut buffer = String::new();
    for info in modes {
        let _ = writeln!(
            buffer,
            "{:<4}{} - {}",
            info.id.to_string(),
            info.name,
            info.description
        );
    }
    buffer
}

pub fn format_stops(stops: &[&Stop], palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    for stop in stops {
        let _ = writeln!(
            buffer,
            "{tag}{mode:<3}{reset} {bold}{name}{reset} {gray}{id} ({position}){reset}",
            tag = palette.tag(stop.mode),
            mode = stop.mode.code(),
            reset = palette.reset,
            bold = palette.white_bold,
            name = stop.name,
            gray = palette.gray,
            id = stop.id,
            position = stop.position,
        );
    }
    let _ = writeln!(buffer, "{} stops", stops.len());
    buffer
}

pub fn format_places(places: &[&PlaceOfInterest], palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    for place in places {
        let _ = write!(
            buffer,
            "{bold}{name}{reset} {gray}{id}{reset}",
            bold = palette.white_bold,
            name = place.name,
            reset = palette.reset,
            gray = palette.gray,
            id = place.id,
        );
        if let Some(category) = &place.category {
            let _ = write!(buffer, " [{category}]");
        }
        if let Some(region) = &place.region {
            let _ = write!(buffer, " in {region}");
        }
        if let Some(stop) = &place.nearest_stop_id {
            let _ = write!(buffer, " near {stop}");
        }
        buffer.push('\n');
    }
    let _ = writeln!(buffer, "{} places", places.len());
    buffer
}

pub fn format_regions(regions: &[Region]) -> String {
    let mut buffer = String::new();
    for region in regions {
        let _ = writeln!(buffer, "{} ({})", region.name, region.id);
    }
    buffer
}

pub fn format_nearest(stops: &[NearestStop], palette: &ColorPalette) -> String {
    if stops.is_empty() {
        return "No stops found.\n".to_string();
    }
    let mut buffer = String::new();
    for (rank, nearest) in stops.iter().enumerate() {
        let _ = writeln!(
            buffer,
            "{rank:>2}. {tag}{mode:<3}{reset} {name} {gray}{id}{reset} {distance:.3} km",
            rank = rank + 1,
            tag = palette.tag(nearest.stop.mode),
            mode = nearest.stop.mode.code(),
            reset = palette.reset,
            name = nearest.stop.name,
            gray = palette.gray,
            id = nearest.stop.id,
            distance = nearest.distance_km,
        );
    }
    buffer
}

pub fn format_graph_stats(stats: &GraphStats) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "Nodes: {}", stats.nodes);
    for (mode, count) in &stats.nodes_by_mode {
        let _ = writeln!(buffer, "  {mode}: {count}");
    }
    let _ = writeln!(buffer, "Edges: {}", stats.edges);
    let _ = writeln!(buffer, "  route: {}", stats.route_edges);
    let _ = writeln!(buffer, "  proximity: {}", stats.proximity_edges);
    let _ = writeln!(buffer, "  transfer: {}", stats.transfer_edges);
    buffer
}

/// Library route text plus a highlighted fare line.
pub fn format_route(plan: &RoutePlan, palette: &ColorPalette) -> String {
    let mut buffer = mobilitygraph_lib::render_route(plan);
    let _ = writeln!(
        buffer,
        "Fare: {}{}{}",
        palette.green,
        format_rupiah(plan.summary.total_cost_idr),
        palette.reset
    );
    buffer
}

/// Library itinerary text plus a highlighted fare line.
pub fn format_itinerary(itinerary: &ItineraryResponse, palette: &ColorPalette) -> String {
    let mut buffer = mobilitygraph_lib::render_itinerary(itinerary);
    let _ = writeln!(
        buffer,
        "Fare: {}{}{}",
        palette.green,
        format_rupiah(itinerary.summary.totals.total_cost_idr),
        palette.reset
    );
    buffer
}
