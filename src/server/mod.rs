//! HTTP boundary
//!
//! One endpoint: `GET /transcript?url=...`. The handler owns no business
//! logic; it relays the pipeline's outcome and picks a status code from the
//! failure kind.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::pipeline::HarvestPipeline;
use crate::report;

#[derive(Debug, Deserialize)]
struct TranscriptQuery {
    url: Option<String>,
}

/// Build the router around a shared pipeline.
pub fn create_router(pipeline: Arc<HarvestPipeline>) -> Router {
    Router::new()
        .route("/transcript", get(get_transcript))
        .with_state(pipeline)
}

/// Bind the endpoint and serve until the process exits.
pub async fn serve(config: Config) -> crate::Result<()> {
    let pipeline = Arc::new(HarvestPipeline::new(&config)?);
    let router = create_router(pipeline);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {e}"))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

async fn get_transcript(
    State(pipeline): State<Arc<HarvestPipeline>>,
    Query(query): Query<TranscriptQuery>,
) -> Response {
    let url = match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing URL", "kind": "bad_input" })),
            )
                .into_response();
        }
    };

    match pipeline.acquire(&url).await {
        Ok(acquisition) => (StatusCode::OK, Json(acquisition)).into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(report::http_status(e.kind()))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({ "error": e.to_string(), "kind": e.kind().as_str() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryArchive;
    use tower::ServiceExt;

    fn empty_pipeline() -> Arc<HarvestPipeline> {
        Arc::new(HarvestPipeline::with_parts(
            Vec::new(),
            Arc::new(MemoryArchive::default()),
        ))
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let router = create_router(empty_pipeline());

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/transcript")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Missing URL");
    }

    #[tokio::test]
    async fn test_blank_url_is_bad_request() {
        let router = create_router(empty_pipeline());

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/transcript?url=%20%20")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
