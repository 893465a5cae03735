#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::dashboard::{ExportLinks, Renderer};
use crate::downloader::{ExportArtifact, ExportFormat, export_sequence};
use crate::error::{ExportError, IngestError, ProcessError};
use crate::export_cache::ExportCache;
use crate::ingest::IngestReport;
use crate::pipeline::{ProcessedUpload, process_upload};
use crate::sequence::SequencedDataset;
use crate::view::StationView;

/// Multipart field carrying the spreadsheet
pub const UPLOAD_FIELD: &str = "file";

pub struct AppState {
    renderer: Renderer,
    exports: ExportCache,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, handlebars::TemplateError> {
        Ok(AppState {
            renderer: Renderer::new()?,
            exports: ExportCache::new(config.export_ttl, config.export_cache_capacity),
        })
    }
}

/// Anything that stops a request from producing its page or download
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("falha na exportação: {0}")]
    Export(#[from] ExportError),

    #[error("falha no upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("nenhum arquivo foi enviado (campo de formulário 'file' esperado)")]
    MissingUpload,

    #[error("o arquivo enviado está vazio")]
    EmptyUpload,

    #[error("este link de exportação expirou; envie o arquivo novamente")]
    ExportExpired,

    #[error("erro de template: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::Process(ProcessError::Ingest(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Process(ProcessError::Load(_)) => StatusCode::BAD_REQUEST,
            DashboardError::Multipart(e) => e.status(),
            DashboardError::MissingUpload | DashboardError::EmptyUpload => StatusCode::BAD_REQUEST,
            DashboardError::ExportExpired => StatusCode::NOT_FOUND,
            DashboardError::Export(_) | DashboardError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The missing-column failure, when that is what stopped the upload
    pub fn missing_column(&self) -> Option<&IngestError> {
        match self {
            DashboardError::Process(ProcessError::Ingest(e)) => Some(e),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_columns: Option<[&'static str; 4]>,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message: self.to_string(),
                expected_columns: self.missing_column().map(IngestError::expected_columns),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct SequenceResponse<'a> {
    status: &'static str,
    report: IngestReport,
    stations: Vec<StationView<'a>>,
}

/// Build the router over shared state
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(serve_upload_page))
        .route("/upload", post(handle_upload))
        .route("/export/:id", get(export_xlsx))
        .route("/export/:id/csv", get(export_csv))
        .route("/api/sequence", post(api_sequence))
        .route("/api/export", post(api_export))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(&config)?);
    let app = router(state, &config);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);
    if config.host == "0.0.0.0" {
        match local_ip_address::local_ip() {
            Ok(ip) => info!("Reachable on the network at http://{}:{}", ip, config.port),
            Err(e) => warn!("Could not determine the LAN address: {}", e),
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_upload_page(State(state): State<Arc<AppState>>) -> Response {
    match state.renderer.upload_page() {
        Ok(html) => Html(html).into_response(),
        Err(e) => DashboardError::from(e).into_response(),
    }
}

async fn handle_upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let result = async {
        let processed = receive_and_process(multipart).await?;
        let dataset = Arc::new(processed.dataset);
        let id = state.exports.insert(Arc::clone(&dataset));
        let html = state.renderer.dashboard(
            &processed.report,
            &dataset.station_views(),
            ExportLinks::for_upload(id),
        )?;
        Ok::<_, DashboardError>(html)
    }
    .await;

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, e),
    }
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, DashboardError> {
    export_cached(&state, &id, ExportFormat::Xlsx)
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, DashboardError> {
    export_cached(&state, &id, ExportFormat::Csv)
}

async fn api_sequence(multipart: Multipart) -> Result<Response, DashboardError> {
    let processed = receive_and_process(multipart).await?;
    let body = SequenceResponse {
        status: "ok",
        report: processed.report,
        stations: processed.dataset.station_views(),
    };
    Ok(Json(body).into_response())
}

async fn api_export(multipart: Multipart) -> Result<Response, DashboardError> {
    let processed = receive_and_process(multipart).await?;
    let artifact = generate_export(&processed.dataset, ExportFormat::Xlsx)?;
    Ok(download_response(artifact))
}

fn export_cached(
    state: &AppState,
    id: &Uuid,
    format: ExportFormat,
) -> Result<Response, DashboardError> {
    let dataset = state.exports.get(id).ok_or(DashboardError::ExportExpired)?;
    let artifact = generate_export(&dataset, format)?;
    Ok(download_response(artifact))
}

fn generate_export(
    dataset: &SequencedDataset,
    format: ExportFormat,
) -> Result<ExportArtifact, ExportError> {
    let artifact = export_sequence(dataset, format, Local::now().naive_local())?;
    info!(
        "Generated {} ({} rows, {} bytes)",
        artifact.file_name,
        dataset.len(),
        artifact.bytes.len()
    );
    Ok(artifact)
}

fn download_response(artifact: ExportArtifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    )
        .into_response()
}

async fn receive_and_process(multipart: Multipart) -> Result<ProcessedUpload, DashboardError> {
    let (file_name, bytes) = read_upload(multipart).await?;
    info!("Received '{}' ({} bytes)", file_name, bytes.len());
    Ok(process_upload(&file_name, &bytes)?)
}

async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), DashboardError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(DashboardError::EmptyUpload);
        }
        return Ok((file_name, bytes.to_vec()));
    }
    Err(DashboardError::MissingUpload)
}

/// Browser-facing failure: the upload form again, with the error notice
fn error_page(state: &AppState, err: DashboardError) -> Response {
    let status = err.status();
    let message = err.to_string();
    if status.is_server_error() {
        error!("Upload failed: {}", message);
    } else {
        warn!("Upload rejected: {}", message);
    }
    match state
        .renderer
        .error_page(&message, err.missing_column().is_some())
    {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => DashboardError::from(e).into_response(),
    }
}
