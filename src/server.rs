use std::net::SocketAddr;

use axum::routing::get;
use axum::{middleware, Router};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::{
    create_item, delete_item, get_item, get_items, health_check, update_item, AppState,
};
use crate::middleware::request_logging;

/// Builds the router. The CORS layer answers preflight requests; the actual
/// response headers come from the response formatter.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/items", get(get_items).post(create_item))
        .route(
            "/items/:id",
            get(get_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logging)),
        )
}

pub struct Server {
    config: Config,
    app: Router,
}

impl Server {
    pub fn new(config: Config, state: AppState) -> Self {
        Self {
            config,
            app: create_app(state),
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.server_host, self.config.server_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("items API listening on {}", addr);

        // connect info is required for the limiter's peer-address fallback
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
