use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::enrichment::WikipediaImages;
use crate::state::AppState;

pub async fn handle(config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("Starting zoo-api in {:?} mode", config.environment);

    if config.security.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set; authenticated routes will answer 500");
    }

    let store = crate::cli::open_store(&config).await?;
    if let Some(seed) = &config.security.admin_seed {
        super::user::seed_admin(store.clone(), config.security.bcrypt_cost, seed).await?;
    }
    let images = Arc::new(WikipediaImages::new(&config.enrichment)?);

    let port = port.unwrap_or(config.server.port);
    let app = crate::app(AppState::new(config, store, images));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
