//! Path extractor for roadmap ids.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use skillforge_core::RoadmapId;

use crate::error::ApiError;

/// Extracts the `:id` path segment as a [`RoadmapId`].
///
/// A segment that is not a valid id cannot name any stored roadmap, so it is
/// rejected as ROADMAP_NOT_FOUND rather than as a format error.
#[derive(Debug, Clone, Copy)]
pub struct RoadmapPath(pub RoadmapId);

#[async_trait]
impl<S> FromRequestParts<S> for RoadmapPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::roadmap_not_found())?;

        raw.parse::<RoadmapId>().map(RoadmapPath).map_err(|e| {
            tracing::debug!(path_param = %raw, error = %e, "Unparseable roadmap id");
            ApiError::roadmap_not_found()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/roadmap/:id",
            get(|RoadmapPath(id): RoadmapPath| async move { id.to_string() }),
        )
    }

    async fn get_status(uri: &str) -> Result<(StatusCode, Vec<u8>), String> {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app().oneshot(request).await.map_err(|e| format!("{:?}", e))?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        Ok((status, bytes.to_vec()))
    }

    #[tokio::test]
    async fn test_valid_id_extracted() -> Result<(), String> {
        let id = RoadmapId::now_v7();
        let (status, body) = get_status(&format!("/roadmap/{}", id)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, id.to_string().into_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() -> Result<(), String> {
        let (status, body) = get_status("/roadmap/not-a-uuid").await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ApiError = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
        assert_eq!(error.code, ErrorCode::RoadmapNotFound);
        Ok(())
    }
}
