use axum::{extract::State, Extension, Json};
use revlens_analysis::{
    generate_keywords_and_descriptions, generate_optimized_titles, generate_review_summary,
    Report, SessionContext,
};
use revlens_core::ProfileKind;
use serde::Serialize;
use tokio::sync::MutexGuard;

use crate::middleware::RequestId;

use super::{map_analysis_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct KeywordsData {
    keywords: String,
    descriptions: String,
    combined: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TextData {
    text: String,
}

/// Inputs for a generator, read under one short lock.
struct GenerateContext {
    credential: String,
    report: Report,
    generation: u64,
}

/// Credential, main-product report and session generation.
async fn main_report_context(
    state: &AppState,
    request_id: &str,
) -> Result<GenerateContext, ApiError> {
    let session = state.session.lock().await;
    let credential = session
        .require_main()
        .map_err(|e| map_analysis_error(request_id, &e))?
        .to_owned();
    let report = session
        .require_report(ProfileKind::Main)
        .map_err(|e| map_analysis_error(request_id, &e))?
        .clone();
    Ok(GenerateContext {
        credential,
        report,
        generation: session.generation(),
    })
}

/// Lock the session for writing a result, unless it was reset since `generation`.
async fn session_for_write<'a>(
    state: &'a AppState,
    request_id: &str,
    generation: u64,
) -> Result<MutexGuard<'a, SessionContext>, ApiError> {
    let session = state.session.lock().await;
    session
        .ensure_generation(generation)
        .map_err(|e| map_analysis_error(request_id, &e))?;
    Ok(session)
}

pub(super) async fn keywords_and_descriptions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<KeywordsData>>, ApiError> {
    let ctx = main_report_context(&state, &req_id.0).await?;
    let client = state.completion_client(&ctx.credential, &req_id.0)?;

    let generated = generate_keywords_and_descriptions(&client, &ctx.report)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
    session_for_write(&state, &req_id.0, ctx.generation)
        .await?
        .set_keywords_and_descriptions(&generated);

    let combined = generated.combined();
    Ok(ApiResponse::json(
        KeywordsData {
            keywords: generated.keywords,
            descriptions: generated.descriptions,
            combined,
        },
        req_id.0,
    ))
}

pub(super) async fn optimized_titles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TextData>>, ApiError> {
    let ctx = main_report_context(&state, &req_id.0).await?;
    let context = state
        .session
        .lock()
        .await
        .artifacts()
        .keywords_and_descriptions
        .clone();
    let client = state.completion_client(&ctx.credential, &req_id.0)?;

    let text = generate_optimized_titles(&client, &context)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
    session_for_write(&state, &req_id.0, ctx.generation)
        .await?
        .set_optimized_titles(text.clone());

    Ok(ApiResponse::json(TextData { text }, req_id.0))
}

pub(super) async fn review_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TextData>>, ApiError> {
    let ctx = main_report_context(&state, &req_id.0).await?;
    let client = state.completion_client(&ctx.credential, &req_id.0)?;

    let text = generate_review_summary(&client, &ctx.report)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
    session_for_write(&state, &req_id.0, ctx.generation)
        .await?
        .set_review_summary(text.clone());

    Ok(ApiResponse::json(TextData { text }, req_id.0))
}
