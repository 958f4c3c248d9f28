use std::process::ExitCode;

use anyhow::Result;

use mobilitygraph_cli::output::{format_graph_stats, render_json, OutputFormat};

use super::Context;

pub fn handle_graph_stats(context: &Context) -> Result<ExitCode> {
    let router = context.load_router()?;
    let stats = router.graph().stats();
    match context.format {
        OutputFormat::Json => render_json(&stats)?,
        OutputFormat::Text => print!("{}", format_graph_stats(&stats)),
    }
    Ok(ExitCode::SUCCESS)
}
