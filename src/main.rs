use statistics_service::app_state::AppState;
use statistics_service::cache::StatsCache;
use statistics_service::clients::{CampaignServiceClient, ClipServiceClient};
use statistics_service::config::Config;
use statistics_service::database;
use statistics_service::handlers;
use statistics_service::platform::PlatformRegistry;
use statistics_service::rabbitmq::{EventConsumer, EventPublisher};
use statistics_service::scheduler;

use std::net::SocketAddr;
use std::sync::Arc;
use stderrlog::Timestamp;
use tokio::signal;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Config must load before logging does: its LOG_LEVEL picks the
    // stderrlog verbosity.
    let config = Config::from_env()?;

    stderrlog::new()
        .verbosity(config.log_level_filter())
        .timestamp(Timestamp::Millisecond)
        .show_module_names(true)
        .init()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statistics_service=info,tower_http=info".into()),
        )
        .try_init()
        .ok();

    log::info!("=== statistics-service starting ===");
    log::info!("process id: {}", std::process::id());

    let pool = database::create_pool(&config.database_url).await?;
    database::schema::initialize_schema(&pool).await?;

    let cache = StatsCache::new(&config.redis_url)?;
    let publisher = EventPublisher::new(&config.rabbitmq_url, &config.event_exchange).await?;
    let platforms = PlatformRegistry::new(config.youtube_api_key.clone());
    let clip_service = ClipServiceClient::new(config.clip_service_url.clone());
    let campaign_service = CampaignServiceClient::new(config.campaign_service_url.clone());

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        pool,
        cache: Arc::new(cache),
        publisher: Arc::new(publisher),
        platforms: Arc::new(platforms),
        clip_service: Arc::new(clip_service),
        campaign_service: Arc::new(campaign_service),
    };

    let (hourly, daily) = scheduler::spawn(state.clone());

    let consumer = EventConsumer::new(state.clone()).await?;
    let consumer_handle = consumer.run().await?;

    let app = handlers::router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("binding on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("=== statistics-service ready ===");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("stopping scheduler loops");
    hourly.abort();
    daily.abort();

    log::info!("stopping event consumer, draining in-flight deliveries");
    consumer_handle.shutdown().await;

    if let Err(e) = state.publisher.close().await {
        log::warn!("failed to close event publisher cleanly: {e}");
    }

    log::info!("closing database connection pool");
    state.pool.close().await;

    log::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl+c handler");
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
        _ = ctrl_c => log::info!("received ctrl+c, shutting down gracefully"),
        _ = terminate => log::info!("received terminate signal, shutting down gracefully"),
    }
}
