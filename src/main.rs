//! Arena mock API server
//!
//! (c) Softlandia 2025

use arena_mock_api::api;
use arena_mock_api::core::random::ArenaRandom;
use arena_mock_api::infrastructure::catalog::ReferenceData;
use arena_mock_api::infrastructure::config::ArenaConfig;
use arena_mock_api::infrastructure::fixtures;
use arena_mock_api::infrastructure::traits::EntityStore;

use anyhow::anyhow;
use axum::Router;
use axum::http::{HeaderValue, Method};
use di_axum::RouterServiceProviderExtensions;
use log::{info, warn};
use tokio::runtime::{Builder, Runtime};
use tower_http::cors::{Any, CorsLayer};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(web_server_task())
}

async fn web_server_task() -> anyhow::Result<()> {
    let provider = arena_mock_api::services()
        .build_provider()
        .map_err(|e| anyhow!("{e:?}"))?;
    let config = provider.get_required::<ArenaConfig>();

    if config.seed_demo_data {
        let store = provider.get_required::<dyn EntityStore>();
        let reference = provider.get_required::<ReferenceData>();
        let random = provider.get_required::<ArenaRandom>();
        fixtures::seed_demo_data(&*store, &reference, &random)
            .await
            .map_err(|e| anyhow!("failed to seed demo data: {e}"))?;
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin `{origin}`");
                None
            }
        })
        .collect();

    let app = Router::new()
        .nest("/api/v1", api::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(origins),
        )
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
