//! Subcommand handlers.
//!
//! `main.rs` parses arguments and dispatches here; each handler loads what
//! it needs through [`Context`] and prints in the selected format.

pub mod entities;
pub mod graph;
pub mod itinerary;
pub mod route;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tracing::debug;

use mobilitygraph_cli::output::{render_json, OutputFormat};
use mobilitygraph_cli::terminal::ColorPalette;
use mobilitygraph_lib::{
    load_entity_store, resolve_dataset_path, EntityStore, GraphBuildOptions, RouteFailure, Router,
};

/// Exit code for requests that were valid but could not be routed.
const ROUTE_FAILURE_EXIT: u8 = 2;

/// Settings shared by every subcommand.
#[derive(Debug)]
pub struct Context {
    data_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub palette: ColorPalette,
}

impl Context {
    pub fn new(data_dir: Option<PathBuf>, format: OutputFormat) -> Self {
        Self {
            data_dir,
            format,
            palette: ColorPalette::detect(),
        }
    }

    fn dataset_path(&self) -> Result<PathBuf> {
        resolve_dataset_path(self.data_dir.as_deref())
            .context("failed to locate the mobility dataset")
    }

    pub fn load_store(&self) -> Result<EntityStore> {
        let path = self.dataset_path()?;
        load_store_from(&path)
    }

    pub fn load_router(&self) -> Result<Router> {
        let store = self.load_store()?;
        let router = Router::from_store(store, &GraphBuildOptions::default());
        debug!(?router, "router ready");
        Ok(router)
    }
}

fn load_store_from(path: &Path) -> Result<EntityStore> {
    load_entity_store(path)
        .with_context(|| format!("failed to load dataset from {}", path.display()))
}

/// Print a routing failure and pick the exit code.
///
/// JSON output gets the `{ "error": ..., "details": ... }` object on stdout;
/// text output gets the message on stderr.
pub fn report_failure(context: &Context, failure: &RouteFailure) -> Result<ExitCode> {
    match context.format {
        OutputFormat::Json => render_json(&failure.to_json())?,
        OutputFormat::Text => eprintln!("error: {failure}"),
    }
    Ok(ExitCode::from(ROUTE_FAILURE_EXIT))
}
