use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use chrono_tz::Tz;
use tracing::warn;

use herald_types::api::{
    CreateMessageRequest, CreateMessageResponse, MessageDraft, MessageResponse,
    UpdateMessageRequest,
};
use herald_types::models::ScheduledMessage;

use crate::error::{ApiJson, ApiResult};
use crate::rules;
use crate::state::{AppState, blocking};

fn to_response(index: usize, m: ScheduledMessage, tz: Tz) -> MessageResponse {
    let scheduled_for = rules::parse_send_at(&m.send_at, tz).map(|at| at.fixed_offset());
    if scheduled_for.is_none() {
        warn!("Unreadable Datetime '{}' on schedule row {}", m.send_at, index);
    }
    MessageResponse {
        index,
        summary: m.summary(),
        send_at: m.send_at,
        scheduled_for,
        text: m.text,
        recipient_id: m.recipient_id,
        status: m.status,
    }
}

pub async fn list_messages(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let messages = blocking(&state, |s| s.schedule().list()).await?;

    Ok(Json(
        messages
            .into_iter()
            .enumerate()
            .map(|(i, m)| to_response(i, m, state.tz))
            .collect::<Vec<_>>(),
    ))
}

pub async fn get_draft(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let draft = blocking(&state, |s| s.schedule().draft(Utc::now())).await?;

    Ok(Json(draft))
}

pub async fn create_message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let (index, message, req) = blocking(&state, move |s| {
        let schedule = s.schedule();
        let message = schedule.create(&req.text, req.date, req.time, &req.recipient)?;
        let index = schedule.list()?.len().saturating_sub(1);
        Ok((index, message, req))
    })
    .await?;

    // Hand the submitted values back so the form can keep them.
    let draft = MessageDraft {
        text: req.text,
        date: req.date,
        time: req.time,
        recipient: Some(req.recipient),
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateMessageResponse {
            message: to_response(index, message, state.tz),
            draft,
        }),
    ))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    ApiJson(req): ApiJson<UpdateMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = blocking(&state, move |s| {
        s.schedule()
            .update(index, &req.text, req.date, req.time, req.recipient.as_deref())
    })
    .await?;

    Ok(Json(to_response(index, message, state.tz)))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<impl IntoResponse> {
    blocking(&state, move |s| s.schedule().delete(index)).await?;

    Ok(StatusCode::NO_CONTENT)
}
