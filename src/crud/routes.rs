use axum::{
    Router,
    routing::{get, patch},
};

use super::handler;
use crate::handler::AppState;
use crate::schema::Entity;

pub fn routes<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list::<E>).post(handler::create::<E>))
        .route("/:id", patch(handler::update::<E>).delete(handler::delete::<E>))
}
