use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use wp::WpClient;

use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;

    let wp = Arc::new(WpClient::new(&config.wordpress).context("Failed to build WordPress client")?);
    info!(
        base_url = %config.wordpress.base_url,
        batch_size = config.sync.batch_size,
        "WordPress client ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { db, wp, config };

    let app = server::build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
