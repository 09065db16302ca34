//! HTTP routes and server setup

use std::num::NonZeroU16;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::constants::PROXY_IMAGE_PATH;
use crate::generate::generate;
use crate::providers::{ImageRecord, SearchQuery, search};

mod prelude;
mod relay;

use prelude::*;
use relay::{download_handler, proxy_image_handler};

/// Shared handler state: read-only configuration and the upstream HTTP client.
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<AppConfig>,
    client: reqwest::Client,
}

impl AppState {
    /// Wraps the startup configuration and client for the handlers.
    pub fn new(config: AppConfig, client: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct ImagesParams {
    q: Option<String>,
    page: Option<String>,
}

/// handles GET /api/images
async fn images_handler(
    State(state): State<AppState>,
    Query(params): Query<ImagesParams>,
) -> impl IntoResponse {
    let query = SearchQuery::from_params(params.q.as_deref(), params.page.as_deref());
    let images: Vec<ImageRecord> = search(&state.client, &state.config, &query).await;
    debug!(
        "Search {:?} page {} returned {} images",
        query.text,
        query.page,
        images.len()
    );
    Json(images)
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Serialize, Debug)]
pub(crate) struct GenerateResponse {
    image: String,
}

/// handles POST /api/generate-ai
async fn generate_handler(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, JsonError> {
    // an unreadable body is treated the same as a missing prompt
    let prompt = match body {
        Ok(Json(request)) => request.prompt.unwrap_or_default(),
        Err(rejection) => {
            debug!("Unreadable generate request: {}", rejection);
            String::new()
        }
    };
    let image = generate(&state.client, &state.config.generation, &prompt).await?;
    Ok(Json(GenerateResponse { image }))
}

/// Routes for the JSON API and the image relay.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/images", axum::routing::get(images_handler))
        .route("/api/generate-ai", axum::routing::post(generate_handler))
        .route(PROXY_IMAGE_PATH, axum::routing::get(proxy_image_handler))
        .route("/download", axum::routing::get(download_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    info!("Shutting down");
}

/// Serves the API, with `static_dir` as the fallback for everything else.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    static_dir: &Path,
    cors: bool,
    state: AppState,
) -> Result<(), anyhow::Error> {
    let mut app = create_router()
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state);
    if cors {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
