use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use daybook_api::auth::{AppState, AppStateInner};
use daybook_assistant::GeminiClient;
use daybook_db::Database;
use daybook_session::SessionManager;

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e:#}");
            eprintln!("       Set the missing variable in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = Arc::new(Database::open(&PathBuf::from(&config.db_path))?);

    let assistant = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db: Arc::clone(&db),
        sessions: SessionManager::new(db),
        assistant: Arc::new(assistant),
        jwt_secret: config.jwt_secret.clone(),
    });

    let app = daybook_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Daybook server listening on {}", addr);
    info!("Assistant model: {}", config.gemini_model);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
