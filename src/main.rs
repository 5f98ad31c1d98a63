use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use finance_access::access::{prune_task, SessionRegistry};
use finance_access::backend::BackendSources;
use finance_access::config::{config, IdentityMode};
use finance_access::is_production;
use finance_access::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, PROFILE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finance_access=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Finance Access in {:?} mode", config.environment);

    if config.identity.mode == IdentityMode::Jwt && config.security.jwt_secret.is_empty() {
        anyhow::bail!("IDENTITY_MODE=jwt requires JWT_SECRET");
    }
    if is_production!() && config.identity.mode == IdentityMode::Jwt {
        tracing::warn!("Production is verifying tokens locally; prefer IDENTITY_MODE=remote");
    }

    let sources = BackendSources::from_config(config).context("failed to build backend client")?;
    let registry = Arc::new(
        SessionRegistry::new(Arc::new(sources), config.policies())
            .with_idle_timeout(Duration::from_secs(config.security.session_idle_secs)),
    );
    tokio::spawn(prune_task(
        registry.clone(),
        Duration::from_secs(config.security.session_prune_secs.max(1)),
    ));
    let app = app(AppState::new(registry, config.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Finance Access listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
