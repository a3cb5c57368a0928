use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    routes::common::{PageQuery, Paged, SearchQuery},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{ProjectConfiguration, UpsertProjectConfigurationRequest};

#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<UpsertProjectConfigurationRequest>,
) -> impl IntoResponse {
    match ProjectConfiguration::create(&state.pool, req).await {
        Ok(config) => (StatusCode::CREATED, success_to_api_response(config)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match ProjectConfiguration::find_by_id(&state.pool, id).await {
        Ok(Some(config)) => (StatusCode::OK, success_to_api_response(config)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "配置不存在".to_string()),
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
    match ProjectConfiguration::list(&state.pool, &query).await {
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
        Some(term) if !term.is_empty() => {
            ProjectConfiguration::search(&state.pool, term, &page).await
        }
        _ => ProjectConfiguration::list(&state.pool, &page).await,
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
    Path(id): Path<i64>,
    Json(req): Json<UpsertProjectConfigurationRequest>,
) -> impl IntoResponse {
    match ProjectConfiguration::update(&state.pool, id, req).await {
        Ok(Some(config)) => (StatusCode::OK, success_to_api_response(config)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "配置不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match ProjectConfiguration::delete(&state.pool, id).await {
        Ok(true) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "deleted": true })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "配置不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}
