//! REST API handlers.
//!
//! Each handler parses its input, runs one `PasteStore` operation on the
//! blocking pool and maps the outcome to JSON. Internal failures are logged
//! here and leave the process only as an opaque 500.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use pastebox_state::{PasteError, PasteResult, StorageError};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
}

fn error_response(msg: &str, code: &'static str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: msg.to_string(),
            code,
        }),
    )
}

/// Map a store error to its HTTP shape.
fn paste_error_response(err: &PasteError) -> axum::response::Response {
    if err.is_internal() {
        error!(error = %err, code = err.code(), "paste operation failed");
        return error_response(
            "Internal server error",
            "internal_error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .into_response();
    }
    let status = match err {
        PasteError::Validation(_) => StatusCode::BAD_REQUEST,
        PasteError::NotFound => StatusCode::NOT_FOUND,
        PasteError::Forbidden => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if let PasteError::CollisionExhausted { attempts } = err {
        warn!(attempts, "create failed, slug space contended");
    }
    error_response(&err.to_string(), err.code(), status).into_response()
}

fn invalid_body() -> axum::response::Response {
    error_response(
        "Invalid request body",
        "validation_error",
        StatusCode::BAD_REQUEST,
    )
    .into_response()
}

/// Map a body that could not be read to the JSON error shape.
fn body_rejection_response(rejection: &BytesRejection) -> axum::response::Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit = crate::MAX_REQUEST_BYTES, "request body over limit");
        return error_response(
            "Content is too large (max 500KB)",
            "validation_error",
            StatusCode::BAD_REQUEST,
        )
        .into_response();
    }
    warn!(error = %rejection, "request body unreadable");
    invalid_body()
}

/// Run a store operation off the async workers.
async fn run_blocking<T, F>(op: F) -> PasteResult<T>
where
    F: FnOnce() -> PasteResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result,
        Err(e) => Err(PasteError::Storage(StorageError::Unavailable(format!(
            "store task failed: {e}"
        )))),
    }
}

// ── Create ─────────────────────────────────────────────────────

/// Create request body.
#[derive(Default, Deserialize)]
pub struct CreateTextRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "deletePassword")]
    pub secret: Option<String>,
}

impl std::fmt::Debug for CreateTextRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateTextRequest")
            .field("content_len", &self.content.as_ref().map(String::len))
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// POST /api/texts
pub async fn create_text(
    State(state): State<ApiState>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection_response(&rejection),
    };
    let req: CreateTextRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(_) => return invalid_body(),
    };
    let content = req.content.unwrap_or_default();
    let secret = req.secret.unwrap_or_default();

    let store = state.store.clone();
    match run_blocking(move || store.create(&content, &secret)).await {
        Ok(created) => (StatusCode::CREATED, ApiResponse::ok(created)).into_response(),
        Err(e) => paste_error_response(&e),
    }
}

// ── Retrieve ───────────────────────────────────────────────────

/// GET /api/texts/:slug
pub async fn get_text(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let store = state.store.clone();
    match run_blocking(move || store.get(&slug)).await {
        Ok(view) => ApiResponse::ok(view).into_response(),
        Err(e) => paste_error_response(&e),
    }
}

// ── Delete ─────────────────────────────────────────────────────

/// Delete request body.
#[derive(Default, Deserialize)]
pub struct DeleteTextRequest {
    #[serde(default, alias = "password")]
    pub secret: Option<String>,
}

#[derive(Serialize)]
struct Deleted {
    message: &'static str,
}

/// DELETE /api/texts/:slug
pub async fn delete_text(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection_response(&rejection),
    };
    // A bodiless DELETE is a missing secret, not a malformed request.
    let req: DeleteTextRequest = if body.is_empty() {
        DeleteTextRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(_) => return invalid_body(),
        }
    };
    let secret = req.secret.unwrap_or_default();

    let store = state.store.clone();
    match run_blocking(move || store.delete(&slug, &secret)).await {
        Ok(()) => ApiResponse::ok(Deleted {
            message: "Text deleted successfully",
        })
        .into_response(),
        Err(e) => paste_error_response(&e),
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    let store = state.store.clone();
    match run_blocking(move || store.count()).await {
        Ok(pastes) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "pastes": pastes })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pastebox_core::CredentialConfig;
    use pastebox_state::{Argon2Guard, MemoryBackend, PasteStore, RandomSlugGenerator};

    fn test_state() -> (ApiState, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let guard = Argon2Guard::new(&CredentialConfig {
            memory_kib: 64,
            iterations: 1,
            lanes: 1,
        })
        .unwrap();
        let store = PasteStore::new(
            backend.clone(),
            Arc::new(RandomSlugGenerator::new()),
            Arc::new(guard),
        );
        (ApiState { store }, backend)
    }

    fn json_body(value: serde_json::Value) -> Bytes {
        Bytes::from(serde_json::to_vec(&value).unwrap())
    }

    #[tokio::test]
    async fn create_returns_created() {
        let (state, _) = test_state();
        let body = json_body(serde_json::json!({ "content": "hello", "secret": "abc" }));

        let resp = create_text(State(state), Ok(body)).await.into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_accepts_delete_password_alias() {
        let (state, _) = test_state();
        let body = json_body(serde_json::json!({ "content": "hello", "deletePassword": "abc" }));

        let resp = create_text(State(state), Ok(body)).await.into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_rejects_garbage_body() {
        let (state, _) = test_state();
        let resp = create_text(State(state), Ok(Bytes::from_static(b"not json")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_nonexistent_text() {
        let (state, _) = test_state();
        let resp = get_text(State(state), Path("zzzzzzzz".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_without_body_is_bad_request() {
        let (state, _) = test_state();
        let slug = state.store.create("hello", "abc").unwrap().slug;

        let resp = delete_text(State(state.clone()), Path(slug.clone()), Ok(Bytes::new()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.get(&slug).is_ok());
    }

    #[tokio::test]
    async fn delete_wrong_secret_is_forbidden() {
        let (state, _) = test_state();
        let slug = state.store.create("hello", "abc").unwrap().slug;

        let body = json_body(serde_json::json!({ "password": "nope" }));
        let resp = delete_text(State(state), Path(slug), Ok(body))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn storage_failure_is_opaque() {
        let (state, backend) = test_state();
        backend.set_simulate_failure(true);

        let resp = get_text(State(state), Path("aaaaaaaa".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "internal_error");
        assert!(!json.to_string().contains("simulated"));
    }

    #[tokio::test]
    async fn healthz_reports_count() {
        let (state, backend) = test_state();
        state.store.create("hello", "abc").unwrap();

        let resp = healthz(State(state.clone())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        backend.set_simulate_failure(true);
        let resp = healthz(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn request_debug_hides_secret() {
        let req = CreateTextRequest {
            content: Some("hello".to_string()),
            secret: Some("hunter2".to_string()),
        };
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("hello"));
    }
}
