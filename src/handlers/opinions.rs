use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::database::{Collection, Document, Filter, FindOptions, InsertOneResult};
use crate::middleware::{ApiResult, Envelope};
use crate::models::{NewOpinion, Opinion};
use crate::state::AppState;

/// GET /opinion - every opinion, in the order they were posted
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Document>> {
    let opinions = state
        .store
        .find(Collection::Opinions, Filter::all(), FindOptions::default())
        .await?;

    Ok(Envelope::outcome(
        !opinions.is_empty(),
        "Opinions found",
        "No opinions found",
        "opinions",
        opinions,
    ))
}

/**
 * POST /opinion - Append a visitor opinion
 *
 * Expected Input:
 * ```json
 * { "name": "Peter", "email": "peter@dailybugle.com", "photo": "https://...", "opinion": "Great store!" }
 * ```
 *
 * `name` is stored as `username`.
 */
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<NewOpinion>, JsonRejection>,
) -> ApiResult<InsertOneResult> {
    let Json(input) = payload?;
    let doc = Document::from(Opinion::from(input));

    let result = state.store.insert_one(Collection::Opinions, doc).await?;

    Ok(Envelope::outcome(
        result.inserted_id.is_some(),
        "Opinion added",
        "Opinion was not added",
        "result",
        result,
    ))
}
