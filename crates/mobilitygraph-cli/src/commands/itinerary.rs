use std::process::ExitCode;

use anyhow::Result;

use mobilitygraph_cli::output::{format_itinerary, render_json, OutputFormat};
use mobilitygraph_lib::{ItineraryRequest, ModeFilter, Start, WeightMetric};

use super::{report_failure, Context};

/// Plan a multi-destination trip; a stop-name start is resolved first.
pub fn handle_itinerary(
    context: &Context,
    from: Start,
    destinations: Vec<String>,
    mode: ModeFilter,
    metric: WeightMetric,
) -> Result<ExitCode> {
    let router = context.load_router()?;
    let start = match from {
        Start::Stop(query) => Start::Stop(router.store().resolve_stop(&query)?.id.clone()),
        coordinates => coordinates,
    };
    let request = ItineraryRequest::new(start, destinations)
        .with_mode(mode)
        .with_metric(metric);

    let itinerary = match router.plan_itinerary(&request) {
        Ok(itinerary) => itinerary,
        Err(failure) => return report_failure(context, &failure),
    };
    match context.format {
        OutputFormat::Json => render_json(&itinerary)?,
        OutputFormat::Text => print!("{}", format_itinerary(&itinerary, &context.palette)),
    }
    Ok(ExitCode::SUCCESS)
}
