//! vidql CLI

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidql::cli::Repl;
use vidql::registry::Capabilities;
use vidql::{PlannerConfig, PlanningSession};

#[derive(Parser)]
#[command(name = "vidql")]
#[command(about = "Logical planner for video queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan one statement and print the plan tree
    Plan {
        /// SQL statement
        sql: String,

        /// JSON catalog file
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Plan for a host with a GPU
        #[arg(long)]
        gpu: bool,
    },

    /// Interactive planning loop
    Repl {
        /// JSON catalog file
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

fn config_for(catalog: Option<PathBuf>, gpu: bool) -> PlannerConfig {
    let config =
        PlannerConfig::new().with_capabilities(Capabilities::default().with_gpu(gpu));
    match catalog {
        Some(path) => config.with_catalog_path(path),
        None => config,
    }
}

fn session_for(config: PlannerConfig) -> PlanningSession<vidql::InMemoryCatalog> {
    match config.load_catalog() {
        Ok(catalog) => PlanningSession::with_config(catalog, config),
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { sql, catalog, gpu } => {
            let session = session_for(config_for(catalog, gpu));

            match session.plan_sql(&sql) {
                Ok(planned) => {
                    print!("{}", planned.plan);
                    if let Some(loader) = planned.loader {
                        println!("loader: {}", loader.name);
                    }
                    if planned.use_gpu {
                        println!("udfs on: gpu");
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Repl { catalog } => {
            let session = session_for(config_for(catalog, false));

            let result = Repl::new(session).and_then(|mut repl| repl.run());
            if let Err(e) = result {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
