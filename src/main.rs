use std::sync::Arc;

use recommendations_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, InMemoryRecommendationRepository, PgRecommendationRepository, RecommendationRepository},
    services::ThreadRandom,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recommendations_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let repository: Arc<dyn RecommendationRepository> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.max_db_connections).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL storage");
            Arc::new(PgRecommendationRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            Arc::new(InMemoryRecommendationRepository::new())
        }
    };

    let state = AppState::from_parts(repository, Arc::new(ThreadRandom))
        .with_test_routes(config.enable_test_routes);
    if config.enable_test_routes {
        tracing::warn!("Test routes enabled");
    }

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
