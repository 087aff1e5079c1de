//! HTTP façade over the ingestion and query pipelines.
//!
//! Serves question answering against the currently ingested index and
//! accepts PDF uploads that trigger a synchronous re-ingestion followed by
//! a pipeline reload.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness check |
//! | `POST` | `/api/query` | Answer a question (`{"question": …}`) |
//! | `POST` | `/api/upload` | Upload a PDF, re-ingest, reload the pipeline |
//!
//! # Shared state
//!
//! The active [`QueryPipeline`] lives behind an `Arc<RwLock<…>>`: query
//! handlers take the read half, so they never observe a half-constructed
//! pipeline, and a successful reload swaps the whole value under the write
//! half. A separate mutex serializes ingestion runs — the index directory
//! on disk is overwritten wholesale, so at most one ingestion may be in
//! flight.
//!
//! Query-time provider failures never produce a 5xx: per the query
//! pipeline's contract they arrive as `Error:`-prefixed answer text in a
//! 200 response. Hard ingestion failures during upload do return a JSON
//! error body with a 5xx status.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser frontend
//! served from another port can call the API directly.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::ingest;
use crate::query::QueryPipeline;

/// Upper bound on an uploaded PDF (the axum default of 2 MB is too small
/// for scanned documents).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pipeline: Arc<RwLock<QueryPipeline>>,
    /// Held for the duration of an upload's ingest + reload sequence.
    ingest_lock: Arc<Mutex<()>>,
}

/// Start the HTTP service.
///
/// Constructs the query pipeline once at startup; a missing index or
/// credential aborts process start rather than deferring the failure to
/// the first request.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let config = Arc::new(config.clone());

    let pipeline = QueryPipeline::build(&config)?;
    println!(
        "Query pipeline ready: {} chunks indexed, generation model {}",
        pipeline.chunk_count(),
        pipeline.generation_model()
    );

    let state = AppState {
        config,
        pipeline: Arc::new(RwLock::new(pipeline)),
        ingest_lock: Arc::new(Mutex::new(())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_root))
        .route("/api/query", post(handle_query))
        .route("/api/upload", post(handle_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    println!("ragpipe API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

// ============ GET / ============

#[derive(Serialize)]
struct RootResponse {
    message: String,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "ragpipe API is live!".to_string(),
    })
}

// ============ POST /api/query ============

#[derive(Deserialize)]
struct QueryRequest {
    question: String,
}

#[derive(Serialize)]
struct QueryResponse {
    question: String,
    answer: String,
}

/// Always 200; a blank question or a provider failure comes back as
/// answer text.
async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let pipeline = state.pipeline.read().await;
    let answer = pipeline.run_query(&request.question).await;

    Json(QueryResponse {
        question: request.question,
        answer,
    })
}

// ============ POST /api/upload ============

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Persist the uploaded file, re-ingest the input directory, then rebuild
/// and swap the query pipeline. A reload failure leaves the previous
/// pipeline serving and is reported in the response; the upload itself is
/// still confirmed.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut saved: Option<(String, std::path::PathBuf)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let Some(client_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        // Multipart filenames are untrusted; keep only the final component.
        let file_name = Path::new(&client_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read upload: {}", e)))?;

        let upload_dir = &state.config.paths.input_dir;
        std::fs::create_dir_all(upload_dir)
            .map_err(|e| internal_error(format!("Failed to create upload directory: {}", e)))?;

        let path = upload_dir.join(&file_name);
        std::fs::write(&path, &data)
            .map_err(|e| internal_error(format!("Failed to save upload: {}", e)))?;

        saved = Some((file_name, path));
        break;
    }

    let Some((file_name, path)) = saved else {
        return Err(bad_request("Multipart body contained no file"));
    };

    // One ingestion at a time: the index pair is overwritten wholesale.
    let _guard = state.ingest_lock.lock().await;

    ingest::run_ingestion(&state.config)
        .await
        .map_err(|e| internal_error(format!("Ingestion failed: {:#}", e)))?;

    match QueryPipeline::build(&state.config) {
        Ok(fresh) => {
            *state.pipeline.write().await = fresh;
            Ok(Json(UploadResponse {
                message: format!("File '{}' uploaded successfully!", file_name),
                path: Some(path.display().to_string()),
            }))
        }
        Err(e) => Ok(Json(UploadResponse {
            message: format!(
                "File '{}' uploaded, but failed to reload query pipeline: {}",
                file_name, e
            ),
            path: None,
        })),
    }
}
