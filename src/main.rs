use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use food_lens::api::{self, AppState};
use food_lens::commands::{CommandHandler, Flow};
use food_lens::config::ServerConfig;
use food_lens::database::Database;
use food_lens::food::api::{RoboflowClient, UsdaClient};
use food_lens::food::config::FoodConfig;
use food_lens::providers::traits::DetectionBackend;
use food_lens::NutritionResolver;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run the HTTP API instead of the interactive prompt
    #[arg(long)]
    api: bool,

    /// Overrides PORT
    #[arg(long)]
    port: Option<u16>,

    /// Overrides DATABASE_PATH
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize colored output
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut server_config = ServerConfig::from_env();
    if let Some(port) = args.port {
        server_config.port = port;
    }
    if let Some(database) = &args.database {
        server_config.database_path = database.clone();
    }

    // Missing API keys are fatal at startup
    let food_config = FoodConfig::from_env().context("Invalid food service configuration")?;

    let usda = Arc::new(UsdaClient::new(&food_config, server_config.remote_timeout)?);
    let resolver = NutritionResolver::new(usda.clone(), usda).with_remote_timeout(server_config.remote_timeout);

    if args.api {
        run_api_server(server_config, food_config, resolver).await
    } else {
        run_cli_mode(resolver).await
    }
}

async fn run_cli_mode(resolver: NutritionResolver) -> Result<()> {
    let mut command_handler = CommandHandler::new(Arc::new(resolver));

    // Show initial help menu
    command_handler.handle_command("help").await?;

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("🥗 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match command_handler.handle_command(input).await {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => println!("{}", format!("{:#}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(
    server_config: ServerConfig,
    food_config: FoodConfig,
    resolver: NutritionResolver,
) -> Result<()> {
    let db = Database::new(&server_config.database_path)
        .await
        .with_context(|| format!("Failed to open database at {}", server_config.database_path))?;

    let detector: Option<Arc<dyn DetectionBackend>> = match food_config.roboflow {
        Some(roboflow) => {
            let client = RoboflowClient::new(roboflow, server_config.remote_timeout)?;
            Some(Arc::new(client) as Arc<dyn DetectionBackend>)
        }
        None => {
            tracing::warn!("Roboflow is not configured; /api/detect will be unavailable");
            None
        }
    };

    let app = api::create_api(AppState::new(resolver, detector, db), &server_config);

    let addr = server_config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
