use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encore_api::{
    config::Config,
    db::{create_redis_client, Cache},
    engine::RecommendationEngine,
    routes::{create_router, AppState, ResultLimits},
    services::providers::SpotifyProvider,
    store::FeatureStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Load the dataset once; nothing is served until it is ready
    let dataset_path = config.dataset_path.clone();
    let store = tokio::task::spawn_blocking(move || FeatureStore::from_path(&dataset_path))
        .await
        .context("Dataset loader panicked")?
        .with_context(|| format!("Failed to load dataset from {}", config.dataset_path))?;

    let report = store.report();
    tracing::info!(
        path = %config.dataset_path,
        loaded = report.loaded,
        excluded_invalid = report.excluded_invalid,
        excluded_duplicate = report.excluded_duplicate,
        "Feature store ready"
    );

    let engine = Arc::new(RecommendationEngine::new(Arc::new(store)));
    tracing::info!(
        rank = engine.projection().rank(),
        energy_ratio = ?engine.projection().energy_ratio(),
        "Feature reduction ready"
    );

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => {
            let client = create_redis_client(url).context("Invalid REDIS_URL")?;
            let (cache, handle) = Cache::new(client).await;
            tracing::info!("Search cache enabled");
            (cache, Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, search cache disabled");
            (Cache::disabled(), None)
        }
    };

    let limits = ResultLimits {
        default_top_n: config.default_top_n,
        max_top_n: config.max_top_n,
        search_limit: config.search_limit,
    };
    let mut state = AppState::new(engine).with_limits(limits);

    match config.spotify_credentials() {
        Some((client_id, client_secret)) => {
            let provider = SpotifyProvider::new(
                cache,
                client_id,
                client_secret,
                config.spotify_api_url.clone(),
                config.spotify_auth_url.clone(),
            );
            state = state.with_search_provider(Arc::new(provider));
            tracing::info!(provider = "spotify", "External song search enabled");
        }
        None => {
            tracing::warn!("Spotify credentials not set, external song search disabled");
        }
    }

    let app = create_router(Arc::new(state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
