use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use herald_types::api::{DeleteRecipientResponse, RecipientRequest, RecipientResponse};
use herald_types::models::Recipient;

use crate::error::{ApiJson, ApiResult};
use crate::state::{AppState, blocking};

fn to_response(index: usize, r: Recipient) -> RecipientResponse {
    RecipientResponse {
        index,
        label: r.label(),
        id: r.id,
        kind: r.kind,
        name: r.name,
    }
}

pub async fn list_recipients(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let recipients = blocking(&state, |s| s.directory().list()).await?;

    Ok(Json(
        recipients
            .into_iter()
            .enumerate()
            .map(|(i, r)| to_response(i, r))
            .collect::<Vec<_>>(),
    ))
}

pub async fn create_recipient(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RecipientRequest>,
) -> ApiResult<impl IntoResponse> {
    let (index, recipient) = blocking(&state, move |s| {
        let dir = s.directory();
        let recipient = dir.create(req.kind, &req.name, &req.id)?;
        // Appended, so it is the last row unless someone raced us.
        let index = dir.list()?.len().saturating_sub(1);
        Ok((index, recipient))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(index, recipient))))
}

pub async fn update_recipient(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    ApiJson(req): ApiJson<RecipientRequest>,
) -> ApiResult<impl IntoResponse> {
    let recipient = blocking(&state, move |s| {
        s.directory().update(index, req.kind, &req.name, &req.id)
    })
    .await?;

    Ok(Json(to_response(index, recipient)))
}

pub async fn delete_recipient(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<impl IntoResponse> {
    let dangling_references = blocking(&state, move |s| s.directory().delete(index)).await?;

    Ok(Json(DeleteRecipientResponse { dangling_references }))
}
