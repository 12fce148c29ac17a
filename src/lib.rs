pub mod aroma;
pub mod builder;
pub mod error;
pub mod extract;
pub mod layout;
pub mod legend;
pub mod model;
pub mod parser;
pub mod rows;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub use error::{LegendError, MenuError};
pub use layout::LayoutConfig;
pub use model::{Day, Diet, Meal, Menu, Token, WeeklyMenu};
pub use parser::{parse_document, parse_tokens};

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub user_agent: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind: std::env::var("AROMA_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            user_agent: std::env::var("AROMA_USER_AGENT")
                .unwrap_or_else(|_| format!("aroma-menu-api/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Makes aws-lc-rs the process-wide rustls provider. Safe to call repeatedly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub layout: Arc<LayoutConfig>,
}

#[derive(Deserialize)]
pub struct RestaurantsParams {
    pub url: String,
}

#[derive(Deserialize)]
pub struct MenuParams {
    pub pdf: String,
}

#[derive(Serialize)]
pub struct RestaurantsResponse {
    pub status: bool,
    pub restaurants: Vec<aroma::Restaurant>,
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub status: bool,
    pub menu: Vec<Day>,
    pub diets: Vec<Diet>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub cause: String,
}

impl ErrorResponse {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            status: false,
            cause: cause.into(),
        }
    }
}

pub fn status_for(err: &MenuError) -> StatusCode {
    match err {
        MenuError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        MenuError::Decode(_) | MenuError::Fetch { .. } | MenuError::Scrape => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for MenuError {
    fn into_response(self) -> Response {
        warn!(err = %self, "request failed");
        (status_for(&self), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

pub async fn restaurants_for_url(client: &Client, url: &str) -> Result<RestaurantsResponse, MenuError> {
    let base = aroma::validate_url(url)?;
    let restaurants = aroma::fetch_restaurants(client, &base).await?;
    Ok(RestaurantsResponse {
        status: true,
        restaurants,
    })
}

pub async fn menu_for_url(
    client: &Client,
    pdf: &str,
    layout: &LayoutConfig,
) -> Result<MenuResponse, MenuError> {
    let pdf_url = aroma::validate_url(pdf)?;
    let menu = aroma::fetch_menu(client, &pdf_url, layout).await?;
    Ok(MenuResponse {
        status: true,
        menu: menu.days,
        diets: menu.diets,
    })
}

pub async fn get_restaurants(
    State(state): State<AppState>,
    Query(params): Query<RestaurantsParams>,
) -> Result<Json<RestaurantsResponse>, MenuError> {
    restaurants_for_url(&state.client, &params.url).await.map(Json)
}

pub async fn get_menu(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> Result<Json<MenuResponse>, MenuError> {
    menu_for_url(&state.client, &params.pdf, &state.layout).await.map(Json)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/restaurants", get(get_restaurants))
        .route("/menu", get(get_menu))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
}

/// Looks a string parameter up in a Lambda payload: top level first, then
/// `queryStringParameters`, then `pathParameters`.
pub fn payload_param(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .or_else(|| payload.get("queryStringParameters").and_then(|qs| qs.get(key)))
        .or_else(|| payload.get("pathParameters").and_then(|pp| pp.get(key)))
        .and_then(Value::as_str)
        .map(str::to_string)
}
