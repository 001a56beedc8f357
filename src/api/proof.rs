//! `/api/proof` handlers.

use super::{
    ApiError, AppState, Backend,
    extract::{ApiJson, Authenticated, parse_task_id},
    views::{Envelope, PendingPayload, ReviewBody, TaskPayload, TextProofBody, task_views},
};
use crate::task::services::{FileProofRequest, ReviewProofRequest};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

/// Multipart field carrying the proof file.
const FILE_FIELD: &str = "file";

type ApiResult<T> = Result<T, ApiError>;

pub(super) async fn submit_text<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(task_id): Path<String>,
    ApiJson(body): ApiJson<TextProofBody>,
) -> ApiResult<(StatusCode, Json<Envelope<TaskPayload>>)> {
    let task = state
        .tasks()
        .submit_text_proof(&principal, parse_task_id(&task_id)?, body.text)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Text proof submitted",
            TaskPayload::of(&task),
        )),
    ))
}

pub(super) async fn submit_file<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(task_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Envelope<TaskPayload>>)> {
    let id = parse_task_id(&task_id)?;
    let Some(request) = read_file_field(multipart).await? else {
        state.tasks().ensure_proof_accepted(&principal, id).await?;
        return Err(ApiError::validation("file is required"));
    };
    let task = state
        .tasks()
        .submit_file_proof(&principal, id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "File proof submitted",
            TaskPayload::of(&task),
        )),
    ))
}

async fn read_file_field(mut multipart: Multipart) -> ApiResult<Option<FileProofRequest>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(FILE_FIELD).to_owned();
        let mime_type = field.content_type().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        return Ok(Some(FileProofRequest::new(file_name, mime_type, bytes.to_vec())));
    }
    Ok(None)
}

pub(super) async fn pending<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Envelope<PendingPayload>>> {
    let tasks = state.tasks().pending_proofs(&principal).await?;
    Ok(Json(Envelope::ok(PendingPayload {
        count: tasks.len(),
        pending: task_views(&tasks),
    })))
}

pub(super) async fn review<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(task_id): Path<String>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> ApiResult<Json<Envelope<TaskPayload>>> {
    let mut request = ReviewProofRequest::new(body.decision);
    if let Some(comment) = body.comment {
        request = request.with_comment(comment);
    }
    let task = state
        .tasks()
        .review_proof(&principal, parse_task_id(&task_id)?, request)
        .await?;
    let decision = task
        .manager_review()
        .map_or("reviewed", |review| review.decision.as_str());
    Ok(Json(Envelope::with_message(
        format!("Task {decision}"),
        TaskPayload::of(&task),
    )))
}
