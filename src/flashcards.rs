//! Random flashcard drawing for the quiz page.

use axum::{
    Json,
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;

use crate::crud::{Crud, error_response};
use crate::handler::AppState;
use crate::model::Record;
use crate::schema::EntityKind;

#[derive(Debug, Deserialize)]
pub struct DrawParams {
    /// Id of the card currently shown; avoided when another card exists.
    pub exclude: Option<i64>,
}

/// Picks one card uniformly at random, skipping `exclude` unless it is the only card.
pub fn pick<'a, R: Rng + ?Sized>(cards: &'a [Record], exclude: Option<i64>, rng: &mut R) -> Option<&'a Record> {
    let candidates: Vec<&Record> = cards
        .iter()
        .filter(|c| exclude.is_none() || c.id() != exclude)
        .collect();

    match candidates.choose(rng) {
        Some(card) => Some(*card),
        None => cards.first(),
    }
}

pub async fn random(State(state): State<AppState>, Query(params): Query<DrawParams>) -> Response {
    let cards = match Crud::new(state.store.as_ref(), EntityKind::Flashcard).list().await {
        Ok(cards) => cards,
        Err(e) => return e.into_response(),
    };

    match pick(&cards, params.exclude, &mut rand::rng()) {
        Some(card) => (StatusCode::OK, Json(card)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No flashcards yet"),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/random", get(random))
}
