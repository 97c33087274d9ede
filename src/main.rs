use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use items_api::config::Config;
use items_api::handlers::AppState;
use items_api::key_generator::KeyGenerator;
use items_api::rate_limiter::{CounterStore, MemoryCounterStore, RateLimiter, SWEEP_INTERVAL};
use items_api::redis::RedisCounterStore;
use items_api::repository::PgItemRepository;
use items_api::server::Server;
use items_api::service::ItemService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "items_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting items API");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Postgres: {}", e))?;

    let (store, backend): (Arc<dyn CounterStore>, &'static str) = match &config.redis_url {
        Some(url) => {
            let store = RedisCounterStore::new(url)
                .map_err(|e| anyhow::anyhow!("Failed to create Redis client: {}", e))?;
            tracing::info!("rate limit counters backed by Redis");
            (Arc::new(store), "redis")
        }
        None => {
            let store = MemoryCounterStore::new();
            let _ = store.spawn_sweeper(SWEEP_INTERVAL);
            tracing::warn!(
                "rate limit counters are process-local; set REDIS_URL to share them across instances"
            );
            (Arc::new(store), "memory")
        }
    };

    let bypass = config.rate_limit_bypassed();
    if bypass {
        tracing::warn!("rate limiting disabled via DISABLE_RATE_LIMIT");
    }

    let write_limiter = Arc::new(
        RateLimiter::new(config.rate_limit_window(), config.rate_limit_max, store.clone())
            .with_bypass(bypass),
    );
    let read_limiter = Arc::new(
        RateLimiter::new(
            config.rate_limit_window(),
            config.rate_limit_read_max,
            store,
        )
        .with_bypass(bypass),
    );

    let repository = Arc::new(PgItemRepository::new(pool));
    let service = ItemService::new(repository);

    let state = AppState {
        service,
        read_limiter,
        write_limiter,
        keys: Arc::new(KeyGenerator::default()),
        rate_limit_backend: backend,
    };

    Server::new(config, state)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
