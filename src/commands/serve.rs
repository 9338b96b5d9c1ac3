//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{
    Database, HttpExplorerClient, HttpPriceSource, Mailer, MemoryRateLimitStore, RateLimitStore,
    RedisRateLimitStore,
};
use crate::services::Backends;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    config.require_jwt_secret()?;
    tracing::info!("Starting server...");

    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connected");

    let rate_limits = connect_rate_limits(&config).await?;
    tracing::info!(backend = rate_limits.backend(), "Rate limit store ready");

    let mailer = Mailer::from_config(&config)?;
    tracing::info!(transports = ?mailer.transport_names(), "Mailer ready");

    let backends = Backends {
        mailer,
        rate_limits,
        prices: Arc::new(HttpPriceSource::new(config.price_api_url.clone())?),
        explorer: Arc::new(HttpExplorerClient::new(config.explorer_api_url.clone())?),
    };

    let addr = format!(
        "{}:{}",
        args.host.unwrap_or_else(|| config.server_host.clone()),
        args.port.unwrap_or(config.server_port)
    );

    let admin = config
        .admin_credentials()
        .map(|(email, password)| (email.to_string(), password.to_string()));

    let app_state = AppState::from_config(db, config, backends);

    if let Some((email, password)) = admin {
        if let Some(account) = app_state
            .account_service
            .ensure_admin(&email, &password)
            .await?
        {
            tracing::info!(email = %account.email, "Created initial admin account");
        }
    }

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Socket addresses feed the client IP fallback
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise process memory.
async fn connect_rate_limits(config: &Config) -> AppResult<Arc<dyn RateLimitStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisRateLimitStore::connect(url)
                .await
                .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("REDIS_URL not set, rate limits are kept in memory");
            Ok(Arc::new(MemoryRateLimitStore::new()))
        }
    }
}
