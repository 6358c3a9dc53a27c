use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use revlens_analysis::{generate_competitive_edge, Report};
use revlens_core::ProfileKind;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{
    map_analysis_error, map_docs_error, parse_profile, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Serialize)]
pub(super) struct UploadData {
    profile: ProfileKind,
    chars: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    profile: ProfileKind,
    report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    competitive_edge: Option<String>,
}

/// Store an uploaded CSV export, convert it to PDF and keep the extracted
/// text as the profile's raw review text.
pub(super) async fn upload_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(profile): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<UploadData>>, ApiError> {
    let kind = parse_profile(&req_id.0, &profile)?;
    if body.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "request body must contain a CSV file",
        ));
    }
    state
        .session
        .lock()
        .await
        .require_main()
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;

    let scratch = Arc::clone(&state.scratch);
    let text = tokio::task::spawn_blocking(move || scratch.ingest_csv(kind, &body))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "review conversion task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "review conversion task failed")
        })?
        .map_err(|e| map_docs_error(req_id.0.clone(), &e))?;

    let chars = text.chars().count();
    state.session.lock().await.set_raw_text(kind, text);

    Ok(ApiResponse::json(UploadData { profile: kind, chars }, req_id.0))
}

/// Run the pipeline over the profile's uploaded text and store the report.
///
/// Results are dropped with `conflict` if the session was reset mid-run.
///
/// A competitor run also derives competitive-edge insights from the new report.
pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(profile): Path<String>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let kind = parse_profile(&req_id.0, &profile)?;
    let (credential, raw_text, generation) = {
        let session = state.session.lock().await;
        let credential = session
            .require_main()
            .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?
            .to_owned();
        let raw_text = session
            .require_raw_text(kind)
            .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?
            .to_owned();
        (credential, raw_text, session.generation())
    };

    let client = state.completion_client(&credential, &req_id.0)?;
    let report = state
        .pipeline
        .run(&client, &kind.profile(), &raw_text)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;

    {
        let mut session = state.session.lock().await;
        session
            .ensure_generation(generation)
            .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
        session.store_report(kind, report.clone());
    }

    let competitive_edge = if kind == ProfileKind::Competitor && !report.is_empty() {
        let insights = generate_competitive_edge(&client, &report)
            .await
            .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
        let mut session = state.session.lock().await;
        session
            .ensure_generation(generation)
            .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
        session.set_competitive_edge(insights.clone());
        Some(insights)
    } else {
        None
    };

    Ok(ApiResponse::json(
        AnalyzeData {
            profile: kind,
            report,
            competitive_edge,
        },
        req_id.0,
    ))
}
