use std::sync::Arc;

use aroma_menu_api::{AppState, LayoutConfig, ServerConfig, aroma, init_tracing, install_crypto_provider, router};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    install_crypto_provider();

    let config = ServerConfig::from_env();
    let state = AppState {
        client: aroma::build_client(&config.user_agent)?,
        layout: Arc::new(LayoutConfig::default()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
