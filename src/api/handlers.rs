use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::query_engine::{QueryEngine, render_html};

use super::models::{SearchParams, SearchResponse};

pub async fn search_handler(
    State(query_engine): State<Arc<QueryEngine>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    log::info!(
        "Search request {:?}: {:?}",
        params.req_count,
        params.query
    );

    let SearchParams { query, req_count } = params;
    // Searching is CPU bound; keep it off the reactor threads.
    let result = tokio::task::spawn_blocking(move || {
        let outcome = query_engine.search(&query);
        render_html(&outcome)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Search error: {}", e),
        )
    })?;

    Ok(Json(SearchResponse { result, req_count }))
}
