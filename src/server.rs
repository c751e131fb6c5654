use crate::config::Config;
use crate::engine::LatexEngine;
use crate::engines::EngineRegistry;
use crate::error::LatexError;
use crate::preprocessing::Pipeline;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Browser client, embedded so the binary is self-contained
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// MIME types accepted on upload
const ACCEPTED_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/bmp",
];

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<EngineRegistry>,
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// Successful recognition response
#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub latex: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub engines: Vec<EngineInfoResponse>,
    pub preset: String,
    pub target_width: u32,
    pub accepted_formats: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Serialize)]
pub struct EngineInfoResponse {
    pub name: &'static str,
    pub description: &'static str,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(&config)?;
    let pipeline = Pipeline::new(config.preset).with_target_width(config.target_width);
    let addr = format!("{}:{}", config.host, config.port);
    let max_upload = config.max_upload;

    tracing::info!(
        "Using engine \"{}\" with preset \"{}\"",
        registry.default_name(),
        config.preset.as_str()
    );

    let state = AppState {
        registry: Arc::new(registry),
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/", get(handle_index))
        .route("/process", post(handle_process))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the browser client
async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handle equation uploads
async fn handle_process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, LatexError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LatexError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    LatexError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(LatexError::MissingFile)?;

    // Check file size
    if data.len() > state.config.max_upload {
        return Err(LatexError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_upload,
        });
    }

    // Validate content type
    let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !ACCEPTED_TYPES.contains(&mime.as_str()) {
        return Err(LatexError::UnsupportedFormat(mime));
    }

    let image = image::load_from_memory(&data)
        .map_err(|e| LatexError::DecodeError(e.to_string()))?;

    let engine = state
        .registry
        .default()
        .ok_or_else(|| LatexError::Internal("No recognition engine available".to_string()))?;
    let pipeline = Arc::clone(&state.pipeline);

    // Preprocessing is CPU-bound and the model call blocks, keep both off the
    // async workers
    let (latex, preprocessing_ms) = tokio::task::spawn_blocking(move || {
        let preprocessed = pipeline.process(image);
        let recognition = engine.recognize(&preprocessed.image)?;
        Ok::<_, LatexError>((recognition.latex, preprocessed.total_time_ms))
    })
    .await
    .map_err(|e| LatexError::Internal(format!("Worker task failed: {}", e)))??;

    tracing::info!(
        "Recognized equation in {}ms (preprocessing {}ms), latex length: {}",
        start.elapsed().as_millis(),
        preprocessing_ms,
        latex.len()
    );

    Ok(Json(ProcessResponse {
        success: true,
        latex,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.registry.default_name().to_string(),
        engines: state
            .registry
            .info()
            .into_iter()
            .map(|e| EngineInfoResponse {
                name: e.name,
                description: e.description,
            })
            .collect(),
        preset: state.config.preset.as_str().to_string(),
        target_width: state.pipeline.target_width(),
        accepted_formats: ACCEPTED_TYPES.iter().map(|s| s.to_string()).collect(),
        max_upload_bytes: state.config.max_upload,
    })
}
