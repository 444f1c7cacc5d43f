//! Per-collection CRUD endpoint handlers.
//!
//! Every collection shares one JSON contract: list, fetch, create, replace
//! and delete, with the deleted document echoed back. The collection is the
//! first path segment, so unknown segments 404 before touching storage.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use liaison_business::{Entity, EntityKind};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::DocumentStore;
use crate::storage::FileStorage;

/// Generic error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "not_found".to_owned(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request".to_owned(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error: "internal_error".to_owned(),
            message: message.into(),
        }
    }
}

enum PathError {
    UnknownKind(String),
    InvalidId(String),
}

impl IntoResponse for PathError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::UnknownKind(kind) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found(format!(
                    "no such collection: {kind}"
                ))),
            )
                .into_response(),
            Self::InvalidId(id) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!("invalid id: {id}"))),
            )
                .into_response(),
        }
    }
}

fn parse_kind(kind: &str) -> Result<EntityKind, PathError> {
    EntityKind::from_path(kind).ok_or_else(|| PathError::UnknownKind(kind.to_owned()))
}

fn parse_id(id: &str) -> Result<Uuid, PathError> {
    id.parse().map_err(|_| PathError::InvalidId(id.to_owned()))
}

pub async fn list_entities<D, F>(
    State(state): State<AppState<D, F>>,
    Path(kind): Path<String>,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.store.list(kind).await {
        Ok(entities) => (StatusCode::OK, Json(entities)).into_response(),
        Err(e) => {
            tracing::error!("Failed to list {}: {}", kind.path(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Failed to list records")),
            )
                .into_response()
        }
    }
}

/// List handler for the emails collection, whose POST slot is taken by the
/// inbound-mail webhook.
pub async fn list_emails<D, F>(State(state): State<AppState<D, F>>) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    list_entities(State(state), Path(EntityKind::Email.path().to_owned())).await
}

pub async fn create_entity<D, F>(
    State(state): State<AppState<D, F>>,
    Path(kind): Path<String>,
    Json(entity): Json<Entity>,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.store.insert(kind, entity).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => {
            tracing::error!("Failed to create in {}: {}", kind.path(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Failed to create record")),
            )
                .into_response()
        }
    }
}

pub async fn get_entity<D, F>(
    State(state): State<AppState<D, F>>,
    Path((kind, id)): Path<(String, String)>,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let (kind, id) = match parse_kind(&kind).and_then(|kind| Ok((kind, parse_id(&id)?))) {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    match state.store.get(kind, id).await {
        Ok(Some(entity)) => (StatusCode::OK, Json(entity)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("No record with that id")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch from {}: {}", kind.path(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Failed to fetch record")),
            )
                .into_response()
        }
    }
}

pub async fn update_entity<D, F>(
    State(state): State<AppState<D, F>>,
    Path((kind, id)): Path<(String, String)>,
    Json(entity): Json<Entity>,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let (kind, id) = match parse_kind(&kind).and_then(|kind| Ok((kind, parse_id(&id)?))) {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    match state.store.update(kind, id, entity).await {
        Ok(Some(updated)) => (StatusCode::OK, Json(updated)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("No record with that id")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update in {}: {}", kind.path(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Failed to update record")),
            )
                .into_response()
        }
    }
}

pub async fn delete_entity<D, F>(
    State(state): State<AppState<D, F>>,
    Path((kind, id)): Path<(String, String)>,
) -> impl IntoResponse
where
    D: DocumentStore,
    F: FileStorage,
{
    let (kind, id) = match parse_kind(&kind).and_then(|kind| Ok((kind, parse_id(&id)?))) {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    match state.store.delete(kind, id).await {
        Ok(Some(deleted)) => (StatusCode::OK, Json(deleted)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("No record with that id")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to delete from {}: {}", kind.path(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Failed to delete record")),
            )
                .into_response()
        }
    }
}
