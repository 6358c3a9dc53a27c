use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use revlens_analysis::ArtifactKind;

use crate::middleware::RequestId;

use super::{map_analysis_error, map_docs_error, ApiError, AppState};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Stream a stored artifact back as a Word document attachment.
pub(super) async fn download(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(artifact): Path<String>,
) -> Result<Response, ApiError> {
    let kind: ArtifactKind = artifact
        .parse()
        .map_err(|reason: String| ApiError::new(req_id.0.clone(), "not_found", reason))?;

    let text = {
        let session = state.session.lock().await;
        session
            .require_main()
            .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;
        session.artifact_text(kind).map(str::to_owned)
    };
    let Some(text) = text else {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            format!("{kind} has not been generated yet"),
        ));
    };

    let bytes = revlens_docs::docx_bytes(&text).map_err(|e| map_docs_error(req_id.0.clone(), &e))?;
    let disposition = format!("attachment; filename=\"{}\"", kind.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
