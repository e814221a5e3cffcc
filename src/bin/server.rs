use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use voiceterrain::config::ConfigArgs;
use voiceterrain::{Processor, RequestResult};

#[derive(Parser, Debug)]
#[command(name = "voiceterrain-server", version, about = "HTTP front-end for voiceterrain")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Directory `/api/voice` may read from; the route is disabled without it
    #[arg(long)]
    audio_dir: Option<PathBuf>,

    /// Parent directory for temporary upload files
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone)]
struct AppState {
    processor: Arc<Processor>,
    /// Canonical root for path requests.
    audio_dir: Option<PathBuf>,
    upload_dir: PathBuf,
}

#[derive(Deserialize)]
struct PathRequest {
    path: PathBuf,
}

#[derive(Deserialize)]
struct UploadRequest {
    filename: String,
    audio_base64: String,
}

enum ApiError {
    BadRequest(String),
    Forbidden(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request handling failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(RequestResult::failure(message))).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Accepts a bare file name only; the fallback transcript keys off it.
fn upload_name(filename: &str) -> Result<&str, ApiError> {
    let name = Path::new(filename).file_name().and_then(|n| n.to_str());
    match name {
        Some(n) if n == filename => Ok(n),
        _ => Err(ApiError::BadRequest(format!("invalid filename: {filename:?}"))),
    }
}

/// Resolves a relative request path under `root` (already canonical).
/// Absolute paths, `..` and symlinks leading out of `root` are refused.
fn resolve_audio_path(root: &Path, requested: &Path) -> Result<PathBuf, ApiError> {
    let plain = requested
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain || requested.as_os_str().is_empty() {
        return Err(ApiError::Forbidden("path must be relative to the audio directory".into()));
    }
    let candidate = root.join(requested);
    match candidate.canonicalize() {
        Ok(real) if real.starts_with(root) => Ok(real),
        Ok(_) => Err(ApiError::Forbidden("path must be relative to the audio directory".into())),
        // Missing files stay inside `root`; the pipeline reports them.
        Err(_) => Ok(candidate),
    }
}

async fn voice_handler(
    State(state): State<AppState>,
    Json(req): Json<PathRequest>,
) -> Result<Json<RequestResult>, ApiError> {
    let Some(root) = &state.audio_dir else {
        return Err(ApiError::Forbidden("path requests are disabled".into()));
    };
    let path = resolve_audio_path(root, &req.path).inspect_err(|_| {
        warn!(path = %req.path.display(), "refused path outside audio directory");
    })?;
    Ok(Json(state.processor.process(&path).await))
}

async fn upload_handler(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<RequestResult>, ApiError> {
    let name = upload_name(&req.filename)?;
    let audio = base64::engine::general_purpose::STANDARD
        .decode(req.audio_base64.trim())
        .map_err(|e| ApiError::BadRequest(format!("invalid audio_base64: {e}")))?;

    // Removed when `dir` drops.
    let dir = tempfile::tempdir_in(&state.upload_dir)?;
    let path = dir.path().join(name);
    tokio::fs::write(&path, &audio).await?;
    info!(file = name, bytes = audio.len(), "received audio upload");

    Ok(Json(state.processor.process(&path).await))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/voice", post(voice_handler))
        .route("/api/voice/upload", post(upload_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    voiceterrain::init_tracing();
    let args = Args::parse();

    let audio_dir = args.audio_dir.map(|d| d.canonicalize()).transpose()?;
    let upload_dir = args.upload_dir.unwrap_or_else(std::env::temp_dir);

    let config = args.config.into_config();
    let state = AppState {
        processor: Arc::new(Processor::new(config.capabilities()?)),
        audio_dir,
        upload_dir,
    };
    match &state.audio_dir {
        Some(dir) => info!(dir = %dir.display(), "serving path requests"),
        None => info!("path requests disabled (no --audio-dir)"),
    }
    let app = router(state);

    info!("voiceterrain server at http://{}", args.addr);

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
