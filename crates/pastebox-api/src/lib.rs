//! pastebox-api: REST API for pastebox.
//!
//! Thin axum layer over [`PasteStore`]. Store calls are synchronous (Argon2 and
//! redb), so handlers run them on the blocking pool.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/texts` | Create a paste from `{content, secret}` |
//! | GET | `/api/texts/{slug}` | Fetch a paste and count the view |
//! | DELETE | `/api/texts/{slug}` | Delete a paste, body `{secret}` |
//! | GET | `/healthz` | Liveness plus live paste count |

pub mod handlers;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use pastebox_core::MAX_CONTENT_BYTES;
use pastebox_state::PasteStore;

/// Request bodies may be larger than the content itself because of JSON
/// escaping: a control character encodes as the six bytes `\u00XX`. The extra
/// 64 KiB covers the secret and the surrounding object.
pub const MAX_REQUEST_BYTES: usize = 6 * MAX_CONTENT_BYTES + 64 * 1024;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: PasteStore,
}

/// Build the complete API router.
pub fn build_router(store: PasteStore) -> Router {
    let api_state = ApiState { store };

    let api_routes = Router::new()
        .route("/texts", post(handlers::create_text))
        .route(
            "/texts/{slug}",
            get(handlers::get_text).delete(handlers::delete_text),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(api_state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/healthz", get(handlers::healthz).with_state(api_state))
}
