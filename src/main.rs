use hotel_pms::{config::AppConfig, create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hotel_pms=debug,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Hotel PMS API - Starting...");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;
    tracing::info!("Migrations completed successfully");

    let state = AppState::new(pool, &config.jwt_secret, config.jwt_expires_in_secs);
    if let Some(manager) = &config.bootstrap_manager {
        state
            .auth_service
            .ensure_bootstrap_manager(manager)
            .await
            .map_err(|e| format!("Failed to create bootstrap manager: {:?}", e))?;
    }

    let app = create_router(state, config.request_timeout);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Hotel PMS API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
