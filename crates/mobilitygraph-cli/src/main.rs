mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mobilitygraph_cli::output::OutputFormat;
use mobilitygraph_lib::{ModeFilter, Start, WeightMetric};

use commands::Context;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-modal Jakarta transit routing")]
struct Cli {
    /// Dataset file, or a directory containing `mobility.db`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count stops, routes, places and regions in the dataset.
    Summary,
    /// List the selectable transport modes.
    Modes,
    /// List stops, optionally restricted to one mode.
    Stops {
        /// MRT, LRT, TJ or ALL.
        #[arg(long, default_value = "ALL")]
        mode: ModeFilter,
    },
    /// List or search places of interest.
    Places {
        /// Only places in this region id.
        #[arg(long)]
        region: Option<String>,
        /// Case-insensitive name substring.
        #[arg(long)]
        query: Option<String>,
    },
    /// List regions.
    Regions,
    /// Find the stops closest to a coordinate.
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, default_value = "ALL")]
        mode: ModeFilter,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Route between two stops, or from a stop to a place of interest.
    Route {
        /// Start stop id or name.
        #[arg(long = "from")]
        from: String,
        /// Destination stop id or name.
        #[arg(long = "to", required_unless_present = "place", conflicts_with = "place")]
        to: Option<String>,
        /// Destination place id.
        #[arg(long)]
        place: Option<String>,
        #[arg(long, default_value = "ALL")]
        mode: ModeFilter,
        /// time, distance or cost.
        #[arg(long, default_value = "time")]
        optimize: WeightMetric,
    },
    /// Plan a trip visiting several places of interest.
    Itinerary {
        /// Start stop id, or `lat,lon`.
        #[arg(long = "from", allow_hyphen_values = true)]
        from: Start,
        /// Place ids to visit.
        #[arg(long = "to", num_args = 1.., required = true)]
        to: Vec<String>,
        #[arg(long, default_value = "ALL")]
        mode: ModeFilter,
        #[arg(long, default_value = "time")]
        optimize: WeightMetric,
    },
    /// Report node and edge counts of the routing graph.
    GraphStats,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let context = Context::new(cli.data_dir, cli.format);

    match cli.command {
        Command::Summary => commands::entities::handle_summary(&context),
        Command::Modes => commands::entities::handle_modes(&context),
        Command::Stops { mode } => commands::entities::handle_stops(&context, mode),
        Command::Places { region, query } => {
            commands::entities::handle_places(&context, region.as_deref(), query.as_deref())
        }
        Command::Regions => commands::entities::handle_regions(&context),
        Command::Nearest {
            lat,
            lon,
            mode,
            limit,
        } => commands::entities::handle_nearest(&context, lat, lon, mode, limit),
        Command::Route {
            from,
            to,
            place,
            mode,
            optimize,
        } => {
            let target = match (to, place) {
                (_, Some(place)) => commands::route::RouteTarget::Place(place),
                (Some(stop), None) => commands::route::RouteTarget::Stop(stop),
                (None, None) => anyhow::bail!("either --to or --place is required"),
            };
            commands::route::handle_route(&context, &from, target, mode, optimize)
        }
        Command::Itinerary {
            from,
            to,
            mode,
            optimize,
        } => commands::itinerary::handle_itinerary(&context, from, to, mode, optimize),
        Command::GraphStats => commands::graph::handle_graph_stats(&context),
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
