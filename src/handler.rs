use std::sync::Arc;

use axum::{Json, Router, http::Method, response::IntoResponse, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::crud;
use crate::flashcards;
use crate::model::MessageResponse;
use crate::schema::{Flashcard, Form, Mech, Note, Todo};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(MessageResponse {
        message: "ok".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(healthcheck))
        .nest("/api/notes", crud::routes::<Note>())
        .nest("/api/todos", crud::routes::<Todo>())
        .nest("/api/mechs", crud::routes::<Mech>())
        .nest("/api/flashcards", crud::routes::<Flashcard>().merge(flashcards::routes()))
        .nest("/api/forms", crud::routes::<Form>())
        .layer(cors)
        .with_state(state)
}
