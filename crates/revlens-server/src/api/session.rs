use axum::{extract::State, Extension, Json};
use revlens_analysis::{DerivedArtifacts, Report, Screen, SessionContext};
use revlens_core::ProfileKind;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_analysis_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct PerProfile<T> {
    main: T,
    competitor: T,
}

impl<T> PerProfile<T> {
    fn from_fn(f: impl Fn(ProfileKind) -> T) -> Self {
        Self {
            main: f(ProfileKind::Main),
            competitor: f(ProfileKind::Competitor),
        }
    }
}

/// Everything a client needs to redraw the current screen.
#[derive(Debug, Serialize)]
pub(super) struct SessionView {
    screen: Screen,
    credential_saved: bool,
    reviews_uploaded: PerProfile<bool>,
    reports: PerProfile<Option<Report>>,
    artifacts: DerivedArtifacts,
}

impl SessionView {
    pub(super) fn from_session(session: &SessionContext) -> Self {
        Self {
            screen: session.screen(),
            credential_saved: session.credential_saved(),
            reviews_uploaded: PerProfile::from_fn(|kind| session.raw_text(kind).is_some()),
            reports: PerProfile::from_fn(|kind| session.report(kind).cloned()),
            artifacts: session.artifacts().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CredentialRequest {
    api_key: String,
}

pub(super) async fn get_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SessionView>> {
    let session = state.session.lock().await;
    ApiResponse::json(SessionView::from_session(&session), req_id.0)
}

pub(super) async fn save_credential(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let mut session = state.session.lock().await;
    session
        .save_credential(&body.api_key)
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(SessionView::from_session(&session), req_id.0))
}

pub(super) async fn enter_main(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let mut session = state.session.lock().await;
    session
        .enter_main()
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(SessionView::from_session(&session), req_id.0))
}

pub(super) async fn reset(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let mut session = state.session.lock().await;
    session
        .require_main()
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
    session.reset();
    Ok(ApiResponse::json(SessionView::from_session(&session), req_id.0))
}
