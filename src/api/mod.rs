//! HTTP surface.
//!
//! Every response uses the `{success, message?, ...payload}` envelope.
//! Handlers are generic over a [`Backend`], so the same router serves the
//! `PostgreSQL` deployment, the in-memory fallback and tests.

mod error;
mod extract;
mod notifications;
mod proof;
mod state;
mod tasks;
pub mod views;

pub use error::{ApiError, ErrorDetail};
pub use extract::{ApiJson, Authenticated};
pub use state::{
    AppState, Backend, BackendNotificationService, BackendTaskService, InMemoryBackend,
    PostgresBackend,
};

use crate::config::AppConfig;
use crate::task::domain::MAX_PROOF_FILE_BYTES;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;
use views::{Envelope, HealthPayload};

/// Headroom above the proof size limit for multipart framing, so oversized
/// files reach validation instead of failing mid-stream.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Router settings outside the shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterOptions {
    /// Directory served under `/uploads`; `None` serves nothing.
    pub upload_dir: Option<String>,
    /// Single allowed CORS origin; `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    /// Whether 500 responses include the internal error text.
    pub expose_error_detail: bool,
}

impl RouterOptions {
    /// Derives router settings from application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            upload_dir: Some(config.upload_dir.clone()),
            cors_allowed_origin: config.cors_allowed_origin.clone(),
            expose_error_detail: config.expose_error_detail,
        }
    }
}

/// Builds the application router.
pub fn router<B: Backend>(state: AppState<B>, options: &RouterOptions) -> Router {
    let body_limit = usize::try_from(MAX_PROOF_FILE_BYTES + MULTIPART_OVERHEAD_BYTES)
        .unwrap_or(usize::MAX);

    let api = Router::new()
        .route("/tasks", post(tasks::create::<B>).get(tasks::list::<B>))
        .route(
            "/tasks/:id",
            get(tasks::get::<B>)
                .put(tasks::update::<B>)
                .delete(tasks::delete::<B>),
        )
        .route("/tasks/:id/steps/:step", patch(tasks::toggle_step::<B>))
        .route("/proof/pending", get(proof::pending::<B>))
        .route("/proof/:id/text", post(proof::submit_text::<B>))
        .route(
            "/proof/:id/file",
            post(proof::submit_file::<B>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/proof/:id/review", post(proof::review::<B>))
        .route("/notifications", get(notifications::list::<B>))
        .route("/notifications/:id/read", patch(notifications::mark_read::<B>))
        .with_state(state);

    let mut app = Router::new()
        .route(
            "/",
            get(|| async {
                Json(Envelope::with_message(
                    "EquiTask API is running",
                    HealthPayload {
                        version: env!("CARGO_PKG_VERSION"),
                    },
                ))
            }),
        )
        .nest("/api", api)
        .fallback(|| async { ApiError::not_found("Route not found") });

    if let Some(dir) = &options.upload_dir {
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }
    if options.expose_error_detail {
        app = app.layer(axum::middleware::map_response(|response: Response| async move {
            attach_error_detail(response)
        }));
    }
    app.layer(cors_layer(options.cors_allowed_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(value) = origin else {
        return CorsLayer::permissive();
    };
    match value.parse::<HeaderValue>() {
        Ok(allowed) => CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(err) => {
            warn!(origin = value, error = %err, "ignoring invalid CORS origin");
            CorsLayer::new()
        }
    }
}

#[derive(Serialize)]
struct DetailedErrorBody {
    success: bool,
    message: &'static str,
    error: String,
}

fn attach_error_detail(mut response: Response) -> Response {
    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    (
        response.status(),
        Json(DetailedErrorBody {
            success: false,
            message: "Server error",
            error: detail,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests;
