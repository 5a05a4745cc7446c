use anyhow::Context;
use axum::{Router, routing::get};
use roomcast::{AppState, rooms};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roomcast=debug,info")),
        )
        .init();

    let database_url = dotenv::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let port: u16 = match dotenv::var("PORT") {
        Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
        Err(_) => 5000,
    };

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&database_url)
        .await
        .context("failed to open database")?;

    let app_state = AppState::new(db_pool);
    app_state
        .store
        .migrate()
        .await
        .context("failed to prepare database schema")?;
    info!("database ready at {database_url}");

    let app = Router::new()
        .route("/", get(health))
        .merge(rooms::router())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on port {port}");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "Real Time Chat is Running"
}
