use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::error::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use dogginer_server::config::{BasicAuth, Config, Credentials, Storage};
use dogginer_server::repository::{MemoryStore, PgStore};
use dogginer_server::routes::create_routes;
use dogginer_server::state::AppState;
use dogginer_server::utils::PasswordEncoder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dogginer_server=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let state = match config.storage {
        Storage::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            tracing::info!("Successfully connected to database");

            sqlx::migrate!().run(&pool).await?;
            tracing::info!("Migrations run successfully");

            AppState::new(PgStore::new(pool), &config)
        }
        Storage::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            AppState::new(MemoryStore::new(), &config)
        }
    };

    let credentials = Credentials::new(
        config.admin_username.clone(),
        &config.admin_password,
        &PasswordEncoder,
    )?;
    tracing::info!(username = credentials.username(), "Basic authentication enabled");
    let auth = BasicAuth::new(credentials, &config.auth_realm);

    let app: Router = create_routes(state, auth, &config);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);
    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
