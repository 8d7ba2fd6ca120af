use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airwatch_api::config::ServerConfig;
use airwatch_api::router::build_app_router;
use airwatch_api::state::AppState;
use airwatch_api::ws;
use airwatch_events::{EmailConfig, EmailDelivery, EventBus};
use airwatch_monitor::collaborators::bus::BusEmitter;
use airwatch_monitor::collaborators::postgres::PgStore;
use airwatch_monitor::collaborators::Mailer;
use airwatch_monitor::mqtt::{self, MqttActuator};
use airwatch_monitor::{sweeper, Collaborators, Monitor, MonitorConfig};

/// How long each background task gets to stop after shutdown.
const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "airwatch_api=info,airwatch_monitor=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let monitor_config = MonitorConfig::from_env().expect("Invalid monitor configuration");
    tracing::info!(
        mqtt_host = %monitor_config.mqtt_host,
        mqtt_port = monitor_config.mqtt_port,
        window_size = monitor_config.window_size,
        "Loaded monitor configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = airwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    airwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    airwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- Email ---
    let mailer: Option<Arc<dyn Mailer>> = match EmailConfig::from_env() {
        Some(email_config) => {
            let delivery =
                EmailDelivery::new(&email_config).expect("Invalid SMTP configuration");
            tracing::info!(smtp_host = %email_config.smtp_host, "Email delivery enabled");
            Some(Arc::new(delivery))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, VOC warning emails are disabled");
            None
        }
    };

    // --- Monitor ---
    let (client, eventloop) = mqtt::connect(&monitor_config);
    let store = Arc::new(PgStore::new(pool.clone()));
    let collaborators = Collaborators {
        registry: store.clone(),
        settings: store.clone(),
        alerts: store.clone(),
        samples: store,
        emitter: Arc::new(BusEmitter::new(Arc::clone(&event_bus))),
        mailer,
        actuator: Arc::new(MqttActuator::new(
            client.clone(),
            monitor_config.actuator_topic.clone(),
        )),
    };
    let monitor = Arc::new(Monitor::new(collaborators, monitor_config.window_size));

    let cancel = CancellationToken::new();
    let ingest_handle = tokio::spawn(mqtt::run_ingest(
        Arc::clone(&monitor),
        client,
        eventloop,
        monitor_config.reconnect(),
        cancel.clone(),
    ));
    let sweeper_handle = tokio::spawn(sweeper::run_auto_clear(
        Arc::clone(&monitor),
        monitor_config.auto_clear_tick,
        cancel.clone(),
    ));
    tracing::info!("Monitor started (MQTT ingest, actuator auto-clear)");

    // --- WebSocket ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));
    let forwarder_handle = tokio::spawn(ws::forward_alerts(
        Arc::clone(&ws_manager),
        event_bus.subscribe(),
    ));

    // --- Router ---
    let state = AppState {
        pool,
        ws_manager: Arc::clone(&ws_manager),
    };
    let app = build_app_router(state, &config);

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

    cancel.cancel();
    let _ = tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, ingest_handle).await;
    let _ = tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, sweeper_handle).await;
    tracing::info!("Monitor stopped");

    // The forwarder exits once the last bus sender is gone; in-flight
    // message tasks may still hold one, so it is bounded too.
    drop(monitor);
    drop(event_bus);
    let _ = tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, forwarder_handle).await;

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
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
