//! HTTP server for the shopmigrate API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/customers`  | Convert a customer export (`file`)       |
//! | POST   | `/api/products`   | Convert a product export (`file`, `baseUrl`) |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, request_error, ConversionResponse};
use crate::config::Config;
use crate::error::{ConvertError, ServerError, ServerResult};
use crate::transform::pipeline::{convert_customers_bytes, convert_products_bytes};

type ApiResult = Result<Json<ConversionResponse>, (StatusCode, Json<Value>)>;

/// Build the application router.
pub fn router(config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let body_limit = config.max_upload_bytes;

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/customers", post(upload_customers))
        .route("/api/products", post(upload_products))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(config)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> ServerResult<()> {
    let port = config.port;
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Shopmigrate server running on http://localhost:{}", port);
    eprintln!("   POST /api/customers - Convert customer export");
    eprintln!("   POST /api/products  - Convert product export");
    eprintln!("   GET  /api/logs      - SSE log stream");
    eprintln!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot bind port {}: {}", port, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

/// Health check endpoint
async fn health(State(config): State<Config>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "shopmigrate",
        "version": env!("CARGO_PKG_VERSION"),
        "imageBaseUrl": config.image_base_url,
        "endpoints": {
            "customers": "POST /api/customers",
            "products": "POST /api/products",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers just miss entries
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Uploaded file plus the optional text fields we understand.
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
    base_url: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut base_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                file = Some((name, data.to_vec()));
            }
            "baseUrl" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                base_url = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    Ok(Upload {
        file_name,
        bytes,
        base_url,
    })
}

fn reject(error: ServerError) -> (StatusCode, Json<Value>) {
    log_error(error.to_string());
    match error {
        ServerError::Convert(e) => (StatusCode::UNPROCESSABLE_ENTITY, Json(error_response(&e))),
        ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(request_error(&msg))),
        ServerError::Internal(msg) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(request_error(&msg)))
        }
    }
}

/// Run a CPU-bound conversion off the async executor.
async fn run_blocking<T, F>(job: F) -> ServerResult<T>
where
    F: FnOnce() -> Result<T, ConvertError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ServerError::Internal(format!("Conversion task failed: {}", e)))?;
    Ok(result?)
}

fn log_upload(kind: &str, upload: &Upload) {
    log_info(format!(
        "📄 New {} upload: {} ({} bytes)",
        kind,
        upload.file_name.as_deref().unwrap_or("unknown"),
        upload.bytes.len()
    ));
}

/// Customer conversion endpoint
async fn upload_customers(multipart: Multipart) -> ApiResult {
    let upload = read_upload(multipart).await.map_err(reject)?;
    log_upload("customer", &upload);

    let outcome = run_blocking(move || convert_customers_bytes(&upload.bytes))
        .await
        .map_err(reject)?;

    Ok(Json(ConversionResponse::from(outcome)))
}

/// Product conversion endpoint
async fn upload_products(State(config): State<Config>, multipart: Multipart) -> ApiResult {
    let upload = read_upload(multipart).await.map_err(reject)?;
    log_upload("product", &upload);

    let base_url = config
        .base_url_or(upload.base_url.as_deref())
        .map(str::to_string);
    let bytes = upload.bytes;

    let outcome = run_blocking(move || convert_products_bytes(&bytes, base_url.as_deref()))
        .await
        .map_err(reject)?;

    Ok(Json(ConversionResponse::from(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_maps_to_unprocessable() {
        let (status, Json(body)) = reject(ServerError::Convert(ConvertError::EmptyInput));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "parse_error");
    }

    #[test]
    fn test_missing_file_maps_to_bad_request() {
        let (status, Json(body)) = reject(ServerError::BadRequest("No file provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file provided");
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_errors() {
        let ok = run_blocking(|| Ok::<_, ConvertError>(7)).await.unwrap();
        assert_eq!(ok, 7);

        let err = run_blocking(|| Err::<(), _>(ConvertError::TooFewLines))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Convert(ConvertError::TooFewLines)));
    }

    #[tokio::test]
    async fn test_health_reports_base_url() {
        let config = Config::default().with_image_base_url("https://cdn.example.com");
        let Json(body) = health(State(config)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["imageBaseUrl"], "https://cdn.example.com");
    }
}
