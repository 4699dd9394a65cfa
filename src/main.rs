mod commands;
mod render;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use leadcal_core::config::LeadcalConfig;
use tracing_subscriber::EnvFilter;

use crate::commands::ViewArgs;
use crate::commands::new::NewArgs;
use crate::commands::update::UpdateArgs;

#[derive(Parser)]
#[command(name = "leadcal")]
#[command(about = "Browse the merged CRM calendar: local activities, lead-derived events and Google Calendar")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events in the current month, week or day view
    Events {
        #[command(flatten)]
        view: ViewArgs,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// List events touching a single day
    Day {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new event
    New(NewArgs),
    /// Update a local event
    Update(UpdateArgs),
    /// Delete a local event
    Delete { id: String },
    /// Show deadline, demo and follow-up events derived from a leads file
    Derive {
        /// JSON file holding an array of leads
        leads: std::path::PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// Ignore the view and derive every event
        #[arg(long)]
        all: bool,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the days covered by a view
    Range {
        #[command(flatten)]
        view: ViewArgs,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = LeadcalConfig::load()?;

    match cli.command {
        Commands::Events { view, json } => commands::events::run(&config, &view, json).await,
        Commands::Day { date, json } => commands::events::run_day(&config, &date, json).await,
        Commands::New(args) => commands::new::run(&config, args).await,
        Commands::Update(args) => commands::update::run(&config, args).await,
        Commands::Delete { id } => commands::delete::run(&config, &id).await,
        Commands::Derive {
            leads,
            view,
            all,
            json,
        } => commands::derive::run(&config, &leads, &view, all, json),
        Commands::Range { view } => commands::range::run(&config, &view),
    }
}
