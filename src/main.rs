//! Kudos Cards server bootstrap.
//!
//! Wires configuration, PostgreSQL, the cache provider, and the
//! coordination services together, then reports health until shutdown.
//! Transports (HTTP API, internal RPC) mount the `kudos-service` layer;
//! the achievement source and content generator collaborators are
//! supplied by the embedding application.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use kudos_cache::{CacheCoordinator, CacheManager, ViewDedupGuard};
use kudos_core::config::AppConfig;
use kudos_core::events::EventBus;
use kudos_core::events::bus::TOPIC_ALL;
use kudos_core::metrics::MetricsRegistry;
use kudos_core::traits::cache::CacheProvider;
use kudos_core::traits::events::EventSink;
use kudos_database::DatabasePool;
use kudos_database::repositories::{CardRepository, MetricsRepository, ShareRecordRepository};
use kudos_service::card::{CardService, ViewService};
use kudos_service::metrics::MetricsService;
use kudos_service::share::ShareService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("KUDOS_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env)?;

    init_logging(&config);
    tracing::info!(env = %env, "Starting Kudos Cards v{}", env!("CARGO_PKG_VERSION"));

    run(config).await
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    // ── Database + migrations ────────────────────────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    kudos_database::migration::run_migrations(db.pool()).await?;

    // ── Cache ────────────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache...");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Repositories ─────────────────────────────────────────────
    let card_repo = Arc::new(CardRepository::new(db.pool().clone()));
    let share_repo = Arc::new(ShareRecordRepository::new(db.pool().clone()));
    let metrics_repo = Arc::new(MetricsRepository::new(db.pool().clone()));

    // ── Events + operational counters ────────────────────────────
    let events = Arc::new(EventBus::new());
    events.subscribe(TOPIC_ALL, |event| {
        tracing::info!(
            topic = event.topic(),
            event_id = %event.id,
            "Domain event"
        );
    });
    let op_metrics = Arc::new(MetricsRegistry::new());

    // ── Coordination primitives + services ───────────────────────
    let coordinator = CacheCoordinator::new(
        Arc::clone(&cache),
        Arc::clone(&op_metrics),
        &config.resilience.lock,
        &config.resilience.stampede,
    );
    let dedup_guard = ViewDedupGuard::new(Arc::clone(&cache), &config.views);

    let card_service = Arc::new(CardService::new(
        Arc::clone(&card_repo),
        coordinator.clone(),
        Arc::clone(&events) as Arc<dyn EventSink>,
        &config.generation,
    ));
    let view_service = ViewService::new(
        Arc::clone(&card_repo),
        dedup_guard,
        Arc::clone(&events) as Arc<dyn EventSink>,
        Arc::clone(&op_metrics),
        config.views.milestones.clone(),
    );
    let share_service = ShareService::new(
        Arc::clone(&share_repo),
        Arc::clone(&card_service),
        Arc::clone(&events) as Arc<dyn EventSink>,
        Arc::clone(&op_metrics),
        config.generation.attribution_window_days,
    );
    let metrics_service = MetricsService::new(
        Arc::clone(&metrics_repo),
        coordinator.clone(),
        &config.generation,
    );

    // Held for the life of the process; transports mount these.
    let _services = (card_service, view_service, share_service, metrics_service);

    tracing::info!("Kudos Cards coordination layer ready");

    // ── Health reporting until shutdown ──────────────────────────
    let mut health_interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = health_interval.tick() => {
                report_health(&db, &cache, &op_metrics).await;
            }
            _ = shutdown_signal() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    db.close().await;
    tracing::info!(counters = ?op_metrics.snapshot(), "Kudos Cards shut down gracefully");
    Ok(())
}

/// Log database and cache health plus the counter snapshot.
async fn report_health(db: &DatabasePool, cache: &Arc<CacheManager>, metrics: &MetricsRegistry) {
    let db_healthy = db.health_check().await.unwrap_or(false);
    let cache_healthy = cache.health_check().await.unwrap_or(false);
    tracing::info!(
        db_healthy,
        cache_healthy,
        counters = ?metrics.snapshot(),
        "Health check"
    );
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
