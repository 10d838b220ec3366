use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use quicksearch::api::create_router;
use quicksearch::api::models::SearchResponse;
use quicksearch::query_engine::QueryEngine;

mod test_helpers {
    use super::*;

    pub fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    pub fn router() -> Result<axum::Router> {
        let engine = QueryEngine::from_file(fixture("entities.tsv"), true, 5)?;
        Ok(create_router(Arc::new(engine), fixture("")))
    }

    pub async fn get(uri: &str) -> Result<(StatusCode, Vec<u8>)> {
        let response = router()?
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    pub async fn search(uri: &str) -> Result<SearchResponse> {
        let (status, body) = get(uri).await?;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
        Ok(serde_json::from_slice(&body)?)
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_search_echoes_counter() -> Result<()> {
    let response = search("/api?query=angel&req_count=7").await?;

    assert_eq!(response.req_count, Some(7));
    assert!(response.result.contains("Angela Merkel (score=205"));
    Ok(())
}

#[tokio::test]
async fn test_search_counter_is_a_json_number() -> Result<()> {
    let (_, body) = get("/api?query=angel&req_count=12").await?;
    let raw: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(raw["req_count"], serde_json::json!(12));
    assert!(raw["result"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_search_decodes_query_parameter() -> Result<()> {
    for uri in [
        "/api?query=Angela%20Merkel&req_count=1",
        "/api?query=Angela+Merkel&req_count=1",
    ] {
        let response = search(uri).await?;
        let first_row = response.result.find("<tr>").unwrap();
        assert!(
            response.result[first_row..].starts_with("<tr><td>Angela Merkel "),
            "{uri}: {}",
            response.result
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_search_escapes_markup_in_results() -> Result<()> {
    let response = search("/api?query=%3Cscript%3Eangel&req_count=3").await?;
    assert!(!response.result.contains("<script>"));
    Ok(())
}

#[tokio::test]
async fn test_empty_query_returns_empty_result() -> Result<()> {
    let response = search("/api?query=&req_count=4").await?;
    assert_eq!(
        response,
        SearchResponse {
            result: String::new(),
            req_count: Some(4),
        }
    );

    let response = search("/api?req_count=5").await?;
    assert_eq!(response.result, "");
    assert_eq!(response.req_count, Some(5));
    Ok(())
}

#[tokio::test]
async fn test_missing_counter_is_echoed_as_null() -> Result<()> {
    let (_, body) = get("/api?query=angel").await?;
    let raw: serde_json::Value = serde_json::from_slice(&body)?;
    assert!(raw["req_count"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_invalid_counter_is_rejected() -> Result<()> {
    let (status, _) = get("/api?query=angel&req_count=abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_static_files_are_served() -> Result<()> {
    let (status, body) = get("/test.tsv").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("first test entity"));

    let (status, _) = get("/missing.html").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
