//! Single route command.

use std::process::ExitCode;

use anyhow::Result;

use mobilitygraph_cli::output::{format_route, render_json, OutputFormat};
use mobilitygraph_lib::{ModeFilter, WeightMetric};

use super::{report_failure, Context};

/// Where the route should end.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// Stop id or stop name.
    Stop(String),
    /// Place of interest id.
    Place(String),
}

/// Route from a stop to a stop or place.
///
/// Stop arguments accept ids or names; unknown names fail with suggestions
/// before any routing happens.
pub fn handle_route(
    context: &Context,
    from: &str,
    target: RouteTarget,
    mode: ModeFilter,
    metric: WeightMetric,
) -> Result<ExitCode> {
    let router = context.load_router()?;
    let start = router.store().resolve_stop(from)?.id.clone();

    let outcome = match target {
        RouteTarget::Stop(to) => {
            let end = router.store().resolve_stop(&to)?.id.clone();
            router.find_route(&start, &end, mode, metric)
        }
        RouteTarget::Place(place) => router.route_to_place(&start, &place, mode, metric),
    };

    let plan = match outcome {
        Ok(plan) => plan,
        Err(failure) => return report_failure(context, &failure),
    };
    match context.format {
        OutputFormat::Json => render_json(&plan)?,
        OutputFormat::Text => print!("{}", format_route(&plan, &context.palette)),
    }
    Ok(ExitCode::SUCCESS)
}
