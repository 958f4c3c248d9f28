//! Dataset inspection commands: summary, modes, stops, places, regions, nearest.

use std::process::ExitCode;

use anyhow::Result;

use mobilitygraph_cli::output::{
    format_modes, format_nearest, format_places, format_regions, format_stops, format_summary,
    render_json, OutputFormat,
};
use mobilitygraph_lib::{build_graph, mode_catalog, Coordinates, ModeFilter};

use super::Context;

pub fn handle_summary(context: &Context) -> Result<ExitCode> {
    let summary = context.load_store()?.summary();
    match context.format {
        OutputFormat::Json => render_json(&summary)?,
        OutputFormat::Text => print!("{}", format_summary(&summary)),
    }
    Ok(ExitCode::SUCCESS)
}

/// The catalogue is static, so no dataset is loaded.
pub fn handle_modes(context: &Context) -> Result<ExitCode> {
    let catalog = mode_catalog();
    match context.format {
        OutputFormat::Json => render_json(&catalog)?,
        OutputFormat::Text => print!("{}", format_modes(&catalog)),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_stops(context: &Context, mode: ModeFilter) -> Result<ExitCode> {
    let store = context.load_store()?;
    let stops = store.list_stops(mode);
    match context.format {
        OutputFormat::Json => render_json(&stops)?,
        OutputFormat::Text => print!("{}", format_stops(&stops, &context.palette)),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_places(
    context: &Context,
    region: Option<&str>,
    query: Option<&str>,
) -> Result<ExitCode> {
    let store = context.load_store()?;
    let places = store.search_places(region, query);
    match context.format {
        OutputFormat::Json => render_json(&places)?,
        OutputFormat::Text => print!("{}", format_places(&places, &context.palette)),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_regions(context: &Context) -> Result<ExitCode> {
    let store = context.load_store()?;
    match context.format {
        OutputFormat::Json => render_json(store.list_regions())?,
        OutputFormat::Text => print!("{}", format_regions(store.list_regions())),
    }
    Ok(ExitCode::SUCCESS)
}

/// Nearest stops only need node positions, so the graph is built without a router.
pub fn handle_nearest(
    context: &Context,
    lat: f64,
    lon: f64,
    mode: ModeFilter,
    limit: usize,
) -> Result<ExitCode> {
    let position = Coordinates::new(lat, lon);
    let graph = build_graph(&context.load_store()?);
    let nearest = graph.nearest_stops(position, mode, limit);
    match context.format {
        OutputFormat::Json => render_json(&nearest)?,
        OutputFormat::Text => print!("{}", format_nearest(&nearest, &context.palette)),
    }
    Ok(ExitCode::SUCCESS)
}
