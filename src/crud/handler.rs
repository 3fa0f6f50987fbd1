//! HTTP handlers shared by every entity kind.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::Crud;
use crate::error::CrudError;
use crate::handler::AppState;
use crate::model::{ErrorResponse, MessageResponse};
use crate::schema::Entity;

fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(data)).into_response()
}

pub fn error_response(status: StatusCode, msg: &str) -> Response {
    respond(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

pub fn invalid_body(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection.body_text(), "rejected request body");
    error_response(StatusCode::BAD_REQUEST, "Invalid request body")
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        match &self {
            CrudError::Validation { .. } => {
                tracing::info!(error = %self, "validation failed");
                error_response(StatusCode::BAD_REQUEST, &self.to_string())
            }
            CrudError::NotFound { .. } | CrudError::Store { .. } => {
                let msg = crate::unpack_error(&self);
                tracing::error!(error = %msg, "request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg)
            }
        }
    }
}

pub async fn list<E: Entity>(State(state): State<AppState>) -> Response {
    match Crud::new(state.store.as_ref(), E::KIND).list().await {
        Ok(records) => respond(StatusCode::OK, records),
        Err(e) => e.into_response(),
    }
}

pub async fn create<E: Entity>(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return invalid_body(rejection),
    };

    match Crud::new(state.store.as_ref(), E::KIND).create(&payload).await {
        Ok(record) => respond(StatusCode::CREATED, record),
        Err(e) => e.into_response(),
    }
}

pub async fn update<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return invalid_body(rejection),
    };

    match Crud::new(state.store.as_ref(), E::KIND).update(id, &payload).await {
        Ok(record) => respond(StatusCode::OK, record),
        Err(e) => e.into_response(),
    }
}

pub async fn delete<E: Entity>(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match Crud::new(state.store.as_ref(), E::KIND).delete(id).await {
        Ok(()) => respond(
            StatusCode::OK,
            MessageResponse {
                message: format!("{} deleted", E::KIND),
            },
        ),
        Err(e) => e.into_response(),
    }
}
