use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use ngs_procurement::{
    api_router, cache::InMemoryCache, config, db, events, handlers::AppServices,
    services::{DashboardService, ProcurementService}, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);
    info!(
        environment = %app_config.environment,
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let db = Arc::new(
        db::establish_connection_from_app_config(&app_config)
            .await
            .context("failed to connect to database")?,
    );
    if app_config.auto_migrate {
        db::run_migrations(&db).await?;
        info!("Database migrations applied");
    }

    let (event_sender, event_receiver) = events::channel(1024);
    let event_task = tokio::spawn(events::process_events(event_receiver));

    let db_pool = db.clone();
    let event_sender_arc = Arc::new(event_sender.clone());
    let procurement = ProcurementService::new(db_pool.clone(), event_sender_arc);
    let dashboard = DashboardService::new(
        db_pool,
        Arc::new(InMemoryCache::new()),
        Duration::from_secs(app_config.dashboard_cache_ttl_secs),
    );

    let state = AppState {
        db,
        config: app_config.clone(),
        event_sender,
        services: AppServices {
            procurement,
            dashboard,
        },
    };

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", app_config.host, app_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    event_task.abort();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => warn!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
