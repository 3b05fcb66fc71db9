use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::AppError;

/// `Json` body extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Counted {
        #[allow(dead_code)]
        quantity: i64,
    }

    async fn extract(body: &'static str) -> Result<AppJson<Counted>, AppError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        AppJson::<Counted>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn malformed_bodies_become_validation_errors() {
        let err = extract(r#"{"quantity": 2.5}"#).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.starts_with("Invalid request body")));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        assert!(matches!(extract("{").await, Err(AppError::Validation(_))));
        assert!(extract(r#"{"quantity": 3}"#).await.is_ok());
    }
}
