//! `/api/tasks` handlers.

use super::{
    ApiError, AppState, Backend,
    extract::{ApiJson, Authenticated, parse_task_id},
    views::{
        CreateTaskBody, DeletedPayload, Envelope, StepToggleBody, TaskListPayload, TaskPayload,
        TaskProgressPayload, TaskView, UpdateTaskBody, task_views,
    },
};
use crate::identity::domain::UserId;
use crate::task::services::{CreateTaskRequest, UpdateTaskRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

type ApiResult<T> = Result<T, ApiError>;

pub(super) async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> ApiResult<(StatusCode, Json<Envelope<TaskPayload>>)> {
    let task = state
        .tasks()
        .create_task(&principal, create_request(body))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Task created successfully",
            TaskPayload::of(&task),
        )),
    ))
}

fn create_request(body: CreateTaskBody) -> CreateTaskRequest {
    let mut request = CreateTaskRequest::new(body.title).with_steps(body.steps);
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(category) = body.category {
        request = request.with_category(category);
    }
    if let Some(assignee) = body.assigned_to {
        request = request.with_assignee(UserId::from_uuid(assignee));
    }
    if let Some(due_date) = body.due_date {
        request = request.with_due_date(due_date);
    }
    if let Some(urgency) = body.urgency_color {
        request = request.with_urgency(urgency);
    }
    if let Some(status) = body.status {
        request = request.with_status(status);
    }
    request
}

pub(super) async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Envelope<TaskListPayload>>> {
    let tasks = state.tasks().list_tasks(&principal).await?;
    Ok(Json(Envelope::ok(TaskListPayload {
        count: tasks.len(),
        tasks: task_views(&tasks),
    })))
}

pub(super) async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Envelope<TaskProgressPayload>>> {
    let task = state
        .tasks()
        .get_task(&principal, parse_task_id(&task_id)?)
        .await?;
    Ok(Json(Envelope::ok(TaskProgressPayload {
        progress: task.progress(),
        task: TaskView::from(&task),
    })))
}

pub(super) async fn toggle_step<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path((task_id, step_number)): Path<(String, String)>,
    ApiJson(body): ApiJson<StepToggleBody>,
) -> ApiResult<Json<Envelope<TaskProgressPayload>>> {
    let number: u32 = step_number
        .parse()
        .map_err(|_| ApiError::validation("Invalid step number"))?;
    let task = state
        .tasks()
        .set_step_completion(
            &principal,
            parse_task_id(&task_id)?,
            number,
            body.is_completed,
        )
        .await?;
    Ok(Json(Envelope::ok(TaskProgressPayload {
        progress: task.progress(),
        task: TaskView::from(&task),
    })))
}

pub(super) async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(task_id): Path<String>,
    ApiJson(body): ApiJson<UpdateTaskBody>,
) -> ApiResult<Json<Envelope<TaskPayload>>> {
    let task = state
        .tasks()
        .update_task(&principal, parse_task_id(&task_id)?, update_request(body))
        .await?;
    Ok(Json(Envelope::with_message(
        "Task updated successfully",
        TaskPayload::of(&task),
    )))
}

fn update_request(body: UpdateTaskBody) -> UpdateTaskRequest {
    let mut request = UpdateTaskRequest::new();
    if let Some(title) = body.title {
        request = request.with_title(title);
    }
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(due_date) = body.due_date {
        request = request.with_due_date(due_date);
    }
    if let Some(urgency) = body.urgency_color {
        request = request.with_urgency(urgency);
    }
    if let Some(status) = body.status {
        request = request.with_status(status);
    }
    request
}

pub(super) async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(principal): Authenticated,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Envelope<DeletedPayload>>> {
    let id = parse_task_id(&task_id)?;
    state.tasks().delete_task(&principal, id).await?;
    Ok(Json(Envelope::with_message(
        "Task deleted successfully",
        DeletedPayload { task_id: id },
    )))
}
