use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    routes::common::{PageQuery, Paged, SearchQuery},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{StorageEntry, UpsertStorageEntryRequest};

#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<UpsertStorageEntryRequest>,
) -> impl IntoResponse {
    match StorageEntry::create(&state.pool, req).await {
        Ok(entry) => (StatusCode::CREATED, success_to_api_response(entry)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match StorageEntry::find_by_id(&state.pool, id).await {
        Ok(Some(entry)) => (StatusCode::OK, success_to_api_response(entry)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "存储条目不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    match StorageEntry::list(&state.pool, &query).await {
        Ok((items, total)) => (
            StatusCode::OK,
            success_to_api_response(Paged::new(items, &query, total)),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let page = query.page_query();
    let result = match query.query.as_deref() {
        Some(term) if !term.is_empty() => StorageEntry::search(&state.pool, term, &page).await,
        _ => StorageEntry::list(&state.pool, &page).await,
    };

    match result {
        Ok((items, total)) => (
            StatusCode::OK,
            success_to_api_response(Paged::new(items, &page, total)),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertStorageEntryRequest>,
) -> impl IntoResponse {
    match StorageEntry::update(&state.pool, id, req).await {
        Ok(Some(entry)) => (StatusCode::OK, success_to_api_response(entry)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "存储条目不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match StorageEntry::delete(&state.pool, id).await {
        Ok(true) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "deleted": true })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "存储条目不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}
