use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::database::{Collection, DeleteResult, Document, Filter, FindOptions, InsertOneResult, UpdateResult};
use crate::middleware::{ApiResult, AuthClaims, Envelope};
use crate::models::{NewToy, ToyUpdate, PRICE_FIELD, SELLER_EMAIL_FIELD};
use crate::state::AppState;

use super::parse_id;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Zero-based page number; only used together with `limit`
    pub page: Option<u64>,
    /// Page size; absent or 0 returns everything
    pub limit: Option<u64>,
}

// Largest window a store can be asked for; larger values just mean "past the end"
const MAX_WINDOW: u64 = i64::MAX as u64;

impl ListQuery {
    fn find_options(&self) -> FindOptions {
        let options = FindOptions::sorted_by(PRICE_FIELD);
        match self.limit {
            Some(limit) if limit > 0 => {
                let limit = limit.min(MAX_WINDOW);
                let skip = self.page.unwrap_or(0).saturating_mul(limit).min(MAX_WINDOW);
                options.page(skip, limit)
            }
            _ => options,
        }
    }
}

/// GET /toys - all toys, cheapest first, optionally paged with ?page=&limit=
///
/// An empty page reports `success: false`.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Document>> {
    let Query(query) = query?;

    let toys = state
        .store
        .find(Collection::Toys, Filter::all(), query.find_options())
        .await?;

    Ok(Envelope::outcome(!toys.is_empty(), "Toys found", "No toys found", "toys", toys))
}

/// GET /toy/:id - single toy; 200 whether or not it exists
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Option<Document>> {
    let id = parse_id(&id)?;

    let toy = state.store.find_one(Collection::Toys, id).await?;

    Ok(Envelope::outcome(toy.is_some(), "Toy found", "Toy not found", "toy", toy))
}

/// GET /mytoys - toys whose `sellerEmail` equals the token's `email` claim
pub async fn mine(
    State(state): State<AppState>,
    Extension(AuthClaims(claims)): Extension<AuthClaims>,
) -> ApiResult<Vec<Document>> {
    let email = claims.email().cloned().unwrap_or(Value::Null);

    let toys = state
        .store
        .find(
            Collection::Toys,
            Filter::equals(SELLER_EMAIL_FIELD, email),
            FindOptions::sorted_by(PRICE_FIELD),
        )
        .await?;

    Ok(Envelope::outcome(!toys.is_empty(), "Toys found", "No toys found", "toys", toys))
}

/// POST /addtoy - insert the body as a new toy
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<NewToy>, JsonRejection>,
) -> ApiResult<InsertOneResult> {
    let Json(toy) = payload?;
    let doc = toy.into_document()?;

    let result = state.store.insert_one(Collection::Toys, doc).await?;
    if let Some(id) = &result.inserted_id {
        info!("Toy added: {}", id);
    }

    Ok(Envelope::outcome(
        result.inserted_id.is_some(),
        "Toy added",
        "Toy was not added",
        "result",
        result,
    ))
}

/// PATCH /toy/:id - overwrite price, quantity and description
///
/// Succeeds only when at least one of the three values actually changed.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ToyUpdate>, JsonRejection>,
) -> ApiResult<UpdateResult> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let set = update.into_set()?;

    let result = state.store.update_one(Collection::Toys, id, set).await?;

    Ok(Envelope::outcome(
        result.modified_count > 0,
        "Toy updated",
        "Toy was not updated",
        "result",
        result,
    ))
}

/// DELETE /toy/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<DeleteResult> {
    let id = parse_id(&id)?;

    let result = state.store.delete_one(Collection::Toys, id).await?;
    if result.deleted_count > 0 {
        info!("Toy deleted: {}", id);
    }

    Ok(Envelope::outcome(
        result.deleted_count > 0,
        "Toy deleted",
        "Toy was not deleted",
        "result",
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_needs_a_limit() {
        let q = ListQuery { page: Some(3), limit: None };
        assert_eq!(q.find_options(), FindOptions::sorted_by(PRICE_FIELD));

        let q = ListQuery { page: Some(1), limit: Some(10) };
        assert_eq!(q.find_options(), FindOptions::sorted_by(PRICE_FIELD).page(10, 10));

        let q = ListQuery { page: None, limit: Some(5) };
        assert_eq!(q.find_options(), FindOptions::sorted_by(PRICE_FIELD).page(0, 5));
    }

    #[test]
    fn zero_limit_means_everything() {
        let q = ListQuery { page: Some(2), limit: Some(0) };
        assert_eq!(q.find_options(), FindOptions::sorted_by(PRICE_FIELD));
    }

    #[test]
    fn huge_windows_are_clamped() {
        let q = ListQuery { page: Some(i64::MAX as u64), limit: Some(2) };
        assert_eq!(q.find_options(), FindOptions::sorted_by(PRICE_FIELD).page(MAX_WINDOW, 2));

        let q = ListQuery { page: Some(1), limit: Some(u64::MAX) };
        assert_eq!(q.find_options(), FindOptions::sorted_by(PRICE_FIELD).page(MAX_WINDOW, MAX_WINDOW));
    }
}
