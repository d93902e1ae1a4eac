//! Township - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "township-tools")]
#[command(about = "Development tools for Township")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog file, or a data directory with catalog.ron and placement.ron
    ValidateCatalog {
        /// Catalog file or data directory
        #[arg(default_value = "crates/township_game/assets/data")]
        path: PathBuf,
    },
    /// Replay a save into a headless controller and report what loads
    InspectSave {
        /// Save file (.ron for text, anything else for binary)
        save: PathBuf,
        /// Catalog to resolve type indices against (defaults to the built-in one)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateCatalog { path } => {
            tracing::info!("Validating {}", path.display());
            match township_tools::validate::validate_catalog(&path) {
                Ok(summary) => tracing::info!("Validation passed: {summary}"),
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::InspectSave {
            save,
            catalog,
            json,
        } => {
            let report =
                match township_tools::inspect::inspect_file(&save, catalog.as_deref()) {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::error!("Inspection failed: {e}");
                        std::process::exit(1);
                    }
                };

            if json {
                match township_tools::inspect::to_json(&report) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        tracing::error!("{e}");
                        std::process::exit(1);
                    }
                }
            } else {
                print!("{report}");
            }

            if !report.is_clean() {
                std::process::exit(2);
            }
        }
    }
}
