//! JSON body extractor with API-shaped rejections.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Drop-in for `axum::Json` whose rejections are 400 `ApiError` bodies
/// instead of axum's plain-text 400/415/422 responses.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: i64,
    }

    async fn send(content_type: Option<&str>, body: &'static str) -> Result<(StatusCode, Option<ApiError>), String> {
        let app = Router::new().route(
            "/echo",
            post(|ApiJson(body): ApiJson<Payload>| async move { body.value.to_string() }),
        );
        let mut builder = Request::builder().method("POST").uri("/echo");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let request = builder.body(Body::from(body)).map_err(|e| e.to_string())?;
        let response = app.oneshot(request).await.map_err(|e| format!("{:?}", e))?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        Ok((status, serde_json::from_slice(&bytes).ok()))
    }

    #[tokio::test]
    async fn test_valid_body_passes() -> Result<(), String> {
        let (status, _) = send(Some("application/json"), r#"{"value": 3}"#).await?;
        assert_eq!(status, StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_syntax_error_is_invalid_format() -> Result<(), String> {
        let (status, error) = send(Some("application/json"), r#"{"value": "#).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.map(|e| e.code), Some(ErrorCode::InvalidFormat));
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_shape_is_invalid_input() -> Result<(), String> {
        let (status, error) = send(Some("application/json"), r#"{"value": "three"}"#).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.map(|e| e.code), Some(ErrorCode::InvalidInput));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() -> Result<(), String> {
        let (status, _) = send(None, r#"{"value": 3}"#).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
