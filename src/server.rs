use crate::config::{ExtractionConfig, ServerConfig};
use crate::error::SealError;
use crate::extraction::{ExtractionReport, Pipeline, StepTiming};
use crate::model::BoundingBox;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Room for multipart boundaries and headers on top of the file itself
const FORM_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<ServerConfig>,
}

/// One extracted seal
#[derive(Serialize)]
pub struct CandidateResponse {
    pub rank: usize,
    #[serde(flatten)]
    pub bbox: BoundingBox,
    pub area: u64,
    pub image_base64: String,
}

/// Extraction response
#[derive(Serialize)]
pub struct ExtractResponse {
    pub candidates: Vec<CandidateResponse>,
    pub annotated_image_base64: String,
    pub strip_base64: Option<String>,
    pub processing_time_ms: u64,
    pub steps: Vec<StepTiming>,
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
    pub max_file_size_bytes: usize,
    pub extraction: ExtractionConfig,
}

/// Run the HTTP server
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let extraction = match &config.config_path {
        Some(path) => {
            tracing::info!("Loading extraction settings from {}", path.display());
            ExtractionConfig::from_json_file(path)?
        }
        None => ExtractionConfig::default(),
    };
    let pipeline = Pipeline::new(extraction)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let max_body = state.config.max_file_size.saturating_add(FORM_OVERHEAD);

    Router::new()
        .route("/extract", post(handle_extract))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Handle extraction requests
async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, SealError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;
    let mut top_k: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SealError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    SealError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "top_k" => {
                top_k = Some(field.text().await.map_err(|e| {
                    SealError::InvalidRequest(format!("Invalid top_k: {}", e))
                })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(SealError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(SealError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !mime.starts_with("image/") {
        tracing::warn!("Received file with content type: {}", mime);
    }

    let pipeline = match top_k {
        Some(raw) => {
            let top_k: usize = raw.trim().parse().map_err(|_| {
                SealError::InvalidRequest(format!("top_k is not a number: {}", raw))
            })?;
            let config = ExtractionConfig {
                top_k,
                ..state.pipeline.config().clone()
            };
            Arc::new(Pipeline::new(config)?)
        }
        None => state.pipeline.clone(),
    };

    // Pixel work runs on the blocking pool
    let response = tokio::task::spawn_blocking(move || {
        let report = pipeline.process(&data)?;
        build_response(report)
    })
    .await
    .map_err(|e| SealError::Internal(format!("Extraction task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Extraction completed in {}ms, {} seal(s) found",
        processing_time_ms,
        response.candidates.len()
    );

    Ok(Json(ExtractResponse {
        processing_time_ms,
        ..response
    }))
}

fn build_response(report: ExtractionReport) -> Result<ExtractResponse, SealError> {
    let ExtractionReport {
        result,
        total_time_ms,
        steps,
    } = report;

    let strip_base64 = result.strip().as_ref().map(encode_png).transpose()?;

    let candidates = result
        .candidates
        .iter()
        .enumerate()
        .map(|(i, crop)| {
            Ok(CandidateResponse {
                rank: i + 1,
                bbox: crop.bbox,
                area: crop.area,
                image_base64: encode_png(&crop.image)?,
            })
        })
        .collect::<Result<Vec<_>, SealError>>()?;

    Ok(ExtractResponse {
        candidates,
        annotated_image_base64: encode_png(&result.annotated_image)?,
        strip_base64,
        processing_time_ms: total_time_ms,
        steps,
    })
}

/// PNG-encode and base64 an image for JSON transport
pub fn encode_png(image: &RgbImage) -> Result<String, SealError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| SealError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
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
        max_file_size_bytes: state.config.max_file_size,
        extraction: state.pipeline.config().clone(),
    })
}
