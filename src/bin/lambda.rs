use std::sync::Arc;

use aroma_menu_api::{
    ErrorResponse, LayoutConfig, ServerConfig, aroma, init_tracing, install_crypto_provider,
    menu_for_url, payload_param,
};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use reqwest::Client;
use serde_json::Value;

async fn handler(
    client: Client,
    layout: Arc<LayoutConfig>,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let Some(pdf) = payload_param(&event.payload, "pdf") else {
        return Ok(serde_json::to_value(ErrorResponse::new("pdf not specified"))?);
    };

    let body = match menu_for_url(&client, &pdf, &layout).await {
        Ok(menu) => serde_json::to_value(menu)?,
        Err(err) => {
            tracing::warn!(%err, %pdf, "menu request failed");
            serde_json::to_value(ErrorResponse::new(err.to_string()))?
        }
    };
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    install_crypto_provider();

    let config = ServerConfig::from_env();
    let client = aroma::build_client(&config.user_agent)?;
    let layout = Arc::new(LayoutConfig::default());

    run(service_fn(move |event: LambdaEvent<Value>| {
        handler(client.clone(), layout.clone(), event)
    }))
    .await
}
