use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notification_dispatch_service::config::{LoggingConfig, Settings};
use notification_dispatch_service::delivery::create_delivery_client;
use notification_dispatch_service::notification::NotificationDispatcher;
use notification_dispatch_service::policy::{PolicyGate, PolicyGateConfig};
use notification_dispatch_service::redis::{CircuitBreaker, RedisPool};
use notification_dispatch_service::server::{create_app, AppState};
use notification_dispatch_service::store::{bootstrap_settings, create_settings_store};
use notification_dispatch_service::tasks::PolicyCleanupTask;
use notification_dispatch_service::triggers::RedisSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.logging);
    tracing::info!("Configuration loaded");

    // Redis is shared by the settings store and the trigger subscriber
    let redis_pool = if settings.redis.enabled {
        let breaker = Arc::new(CircuitBreaker::default());
        Some(Arc::new(RedisPool::new(&settings.redis.url, breaker)?))
    } else {
        None
    };

    // Settings store: migrate and persist the catalogs once at startup
    let store = create_settings_store(&settings.store, redis_pool.clone());
    match bootstrap_settings(store.as_ref()).await {
        Ok(loaded) => tracing::info!(
            channels = loaded.channels.len(),
            "Notification settings ready"
        ),
        Err(e) => tracing::error!(
            backend = store.backend_name(),
            error = %e,
            "Failed to bootstrap notification settings, dispatch will use defaults"
        ),
    }

    // Dispatcher
    let delivery = create_delivery_client(&settings.delivery);
    let mut dispatcher = NotificationDispatcher::new(store, delivery)
        .with_max_concurrent(settings.dispatch.max_concurrent_deliveries);
    let policy_gate = settings.policy.enabled.then(|| {
        Arc::new(PolicyGate::new(PolicyGateConfig {
            entry_ttl_seconds: settings.policy.entry_ttl_seconds,
        }))
    });
    if let Some(gate) = &policy_gate {
        dispatcher = dispatcher.with_policy_gate(gate.clone());
    }
    let dispatcher = Arc::new(dispatcher);
    tracing::info!(
        policy_gate = policy_gate.is_some(),
        "Notification dispatcher initialized"
    );

    // Create application state
    let mut state = AppState::new(settings.clone(), dispatcher.clone());
    if let Some(pool) = &redis_pool {
        state = state.with_redis_pool(pool.clone());
    }

    // Create Redis subscriber
    let redis_subscriber = Arc::new(RedisSubscriber::new(
        settings.redis.clone(),
        dispatcher.clone(),
    ));
    let shutdown_signal = redis_subscriber.shutdown_signal();

    // Start Redis subscriber in background
    let redis_subscriber_clone = redis_subscriber.clone();
    let redis_handle = tokio::spawn(async move {
        if let Err(e) = redis_subscriber_clone.start().await {
            tracing::error!(error = %e, "Redis subscriber failed");
        }
    });

    // Start policy cleanup task in background
    let cleanup_handle = policy_gate.map(|gate| {
        let task = PolicyCleanupTask::new(
            gate,
            settings.policy.cleanup_interval_seconds,
            shutdown_signal.subscribe(),
        );
        tokio::spawn(task.run())
    });

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_signal))
        .await?;

    // Wait for background tasks to finish
    tracing::info!("Waiting for background tasks to finish...");
    let _ = redis_handle.await;
    if let Some(handle) = cleanup_handle {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = logging.format.eq_ignore_ascii_case("json");
    let (text_layer, json_layer) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .init();
}

async fn shutdown_signal_handler(shutdown_tx: tokio::sync::broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop the Redis subscriber and background tasks
    let _ = shutdown_tx.send(());
}
