use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domopush_api::config::ServerConfig;
use domopush_api::router::build_app_router;
use domopush_api::state::AppState;
use domopush_db::{Registry, SqliteRegistry};
use domopush_engine::{build_channels, DispatchContext, Dispatcher, EventBus};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domopush=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = domopush_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    domopush_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    domopush_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Rules ---
    let rules: Vec<Arc<domopush_core::Rule>> = domopush_core::load_rules(&config.rules_path)
        .expect("Failed to load rule configuration")
        .into_iter()
        .map(Arc::new)
        .collect();
    tracing::info!(rules = rules.len(), path = %config.rules_path, "Rules loaded");

    // --- Registry, bus, dispatcher ---
    let registry: Arc<dyn Registry> = Arc::new(SqliteRegistry::new(pool.clone()));
    let bus = Arc::new(EventBus::default());

    let channels = build_channels(&rules, Arc::clone(&registry));
    let dispatcher = Arc::new(Dispatcher::new(
        rules.clone(),
        channels,
        Arc::clone(&registry),
        DispatchContext::new(config.device_aliases.clone()),
    ));

    let dispatcher_rx = bus.subscribe();
    let dispatcher_task = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.run(dispatcher_rx).await })
    };
    tracing::info!("Dispatcher started");

    // --- App state & router ---
    let state = AppState {
        pool,
        registry,
        rules: Arc::new(rules),
        bus: Arc::clone(&bus),
    };
    let app = build_app_router(state, config.request_timeout_secs);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Drop the bus sender to close the broadcast channel; the dispatcher
    // loop ends once the last receiver drains.
    drop(bus);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher_task).await;
    tracing::info!("Dispatcher stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
