use dotenvy::dotenv;
use dpf_backend::api::{create_router, AppState};
use dpf_backend::config;
use dpf_backend::errors::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the server configuration
    let server_config = config::server::ServerConfig::from_env()?;

    // 4. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured programs (config.toml is optional)
    if std::path::Path::new("config.toml").exists() {
        let program_config = config::programs::load_default_config()?;
        let created = config::programs::seed_programs(&db, &program_config)
            .await
            .inspect_err(|e| error!("Failed to seed programs: {}", e))?;
        info!("Seeded {} new program(s) from config.toml.", created);
    }

    // 6. Serve the API
    let app = create_router(Arc::new(AppState { db }));
    let listener = TcpListener::bind(server_config.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", server_config.bind_addr, e))?;
    info!("Listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
