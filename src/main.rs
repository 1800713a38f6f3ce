//! Medora healthcare portal server.
//!
//! Entry point: loads configuration, opens the store, and either serves the
//! REST API or seeds the demo data.

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use medora::api::{self, AppState};
use medora::config;
use medora::storage::Storage;

#[derive(Parser)]
#[command(name = "medora", about = "Medora healthcare portal server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve,
    /// Insert the demo accounts and sample data
    Seed,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config().context("failed to load configuration")?;

    let storage = Storage::connect(&config.database.url)
        .await
        .context("failed to open database")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Seed => {
            storage.seed_demo_data().await.context("seeding failed")?;
        }
        Commands::Serve => {
            let state = web::Data::new(AppState { storage });
            info!("listening on {}:{}", config.server.host, config.server.port);
            HttpServer::new(move || {
                App::new()
                    .app_data(state.clone())
                    .wrap(TracingLogger::default())
                    .wrap(Cors::permissive())
                    .configure(api::configure)
            })
            .bind((config.server.host.as_str(), config.server.port))?
            .run()
            .await?;
        }
    }

    Ok(())
}
