mod downloads;
mod generate;
mod reviews;
mod session;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use revlens_analysis::{AnalysisError, Pipeline, SessionContext};
use revlens_core::{AppConfig, ProfileKind};
use revlens_docs::{DocsError, ScratchDir};
use revlens_llm::{ClientOptions, LlmError, OpenAiClient};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Review exports can be large; axum's default 2 MB limit is too small.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared handler state. The session lock is only held for reads and
/// writes of session fields, never across a completion call.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionContext>>,
    pub pipeline: Pipeline,
    pub client_options: Arc<ClientOptions>,
    pub scratch: Arc<ScratchDir>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, client_options: ClientOptions, scratch: ScratchDir) -> Self {
        Self {
            session: Arc::new(Mutex::new(SessionContext::new())),
            pipeline,
            client_options: Arc::new(client_options),
            scratch: Arc::new(scratch),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let pipeline = Pipeline::from_config(config)?;
        let scratch = ScratchDir::new(config.scratch_dir.clone());
        scratch.ensure()?;
        Ok(Self::new(
            pipeline,
            ClientOptions::from_config(config),
            scratch,
        ))
    }

    /// Completion client authenticated with the session credential.
    pub(super) fn completion_client(
        &self,
        credential: &str,
        request_id: &str,
    ) -> Result<OpenAiClient, ApiError> {
        OpenAiClient::new(credential, &self.client_options)
            .map_err(|e| map_client_error(request_id, &e))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    version: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn json(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_analysis_error(request_id: impl Into<String>, error: &AnalysisError) -> ApiError {
    let code = match error {
        AnalysisError::InvalidCredential => "validation_error",
        AnalysisError::CredentialRequired => "unauthorized",
        AnalysisError::NotOnMainScreen => "forbidden",
        AnalysisError::MissingInput(_)
        | AnalysisError::MissingReport(_)
        | AnalysisError::MissingReviews(_)
        | AnalysisError::SessionReset => "conflict",
        e if e.is_upstream() => {
            tracing::error!(error = %e, "completion service failed");
            "upstream_error"
        }
        e => {
            tracing::error!(error = %e, "analysis failed");
            "internal_error"
        }
    };
    ApiError::new(request_id, code, error.to_string())
}

pub(super) fn map_docs_error(request_id: impl Into<String>, error: &DocsError) -> ApiError {
    tracing::error!(error = %error, "document conversion failed");
    ApiError::new(request_id, "internal_error", error.to_string())
}

fn map_client_error(request_id: &str, error: &LlmError) -> ApiError {
    tracing::error!(error = %error, "completion client could not be built");
    ApiError::new(
        request_id,
        "internal_error",
        "completion client could not be configured",
    )
}

pub(super) fn parse_profile(request_id: &str, raw: &str) -> Result<ProfileKind, ApiError> {
    raw.parse::<ProfileKind>()
        .map_err(|reason| ApiError::new(request_id, "validation_error", reason))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Home-screen routes: inspecting the session and getting past the key gate.
fn session_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/session", get(session::get_session))
        .route("/api/v1/credential", post(session::save_credential))
        .route("/api/v1/screen/main", post(session::enter_main))
}

/// Main-screen routes; each handler checks the screen under the session lock.
fn main_screen_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/products/{profile}/reviews",
            post(reviews::upload_reviews).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/products/{profile}/analyze",
            post(reviews::analyze),
        )
        .route(
            "/api/v1/generate/keywords",
            post(generate::keywords_and_descriptions),
        )
        .route("/api/v1/generate/titles", post(generate::optimized_titles))
        .route("/api/v1/generate/summary", post(generate::review_summary))
        .route("/api/v1/reset", post(session::reset))
        .route("/api/v1/downloads/{artifact}", get(downloads::download))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(session_router())
        .merge(main_screen_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::json(
        HealthData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        req_id.0,
    )
}
