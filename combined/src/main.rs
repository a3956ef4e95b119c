//! Combined binary - session, catalog and guards in one process.

mod app;
mod cli;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_service_lib::config::CatalogServiceConfig;
use guards_lib::Notice;
use session_service_lib::config::SessionServiceConfig;

use crate::app::App;
use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let latency = app::latency(cli.no_latency);

    let session_config = SessionServiceConfig {
        storage_dir: Some(cli.storage_dir.clone()),
        latency,
        ..SessionServiceConfig::from_env()
    };
    let catalog_config = CatalogServiceConfig {
        latency,
        ..CatalogServiceConfig::from_env()
    };

    let app = match App::build(session_config, catalog_config).await {
        Ok(app) => app,
        Err(e) => {
            error!(code = e.code(), "{}", e);
            eprintln!("{}", Notice::from_error(&e).message);
            std::process::exit(1);
        }
    };

    let result = run(&app, cli.command).await;
    if let Err(e) = result {
        error!(code = e.code(), "{}", e);
        app.report(&e);
        std::process::exit(1);
    }
    app.flush();
}

async fn run(app: &App, command: Commands) -> common::AppResult<()> {
    match command {
        Commands::Login(args) => app.login(args).await,
        Commands::Register(args) => app.register(args).await,
        Commands::Logout => app.logout(),
        Commands::Whoami => app.whoami(),
        Commands::Visit { path } => app.visit(&path),
        Commands::Catalog(args) => app.catalog(args).await,
        Commands::Users => app.users().await,
        Commands::Promote { user_id } => app.promote(&user_id).await,
        Commands::Settings { command } => app.settings(command),
        Commands::Demo => app.demo().await,
    }
}
