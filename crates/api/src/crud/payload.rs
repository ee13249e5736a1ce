//! Body extractor accepting either JSON or an urlencoded HTML form.

use axum::extract::{Form, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ocwiki_core::error::CoreError;
use ocwiki_core::forms::validation_message;
use ocwiki_core::sanitize::sanitize_error_message;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;
use crate::pages::PageError;

/// Which encoding the request body used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Json,
    Form,
}

impl PayloadKind {
    /// Detect the body encoding from `Content-Type`.
    pub fn detect(headers: &HeaderMap) -> Option<Self> {
        let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/x-www-form-urlencoded" => Some(Self::Form),
            m if m == "application/json" || m.ends_with("+json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// A deserialized and validated request body.
///
/// Required fields that are absent or blank produce
/// `400 "Missing required fields"`; other validation failures list the
/// offending fields.
#[derive(Debug)]
pub struct Payload<T> {
    pub data: T,
    pub kind: PayloadKind,
}

/// Rejection for [`Payload`]: JSON for API callers, an HTML error page for
/// form submissions.
#[derive(Debug)]
pub struct PayloadRejection {
    pub kind: Option<PayloadKind>,
    pub error: AppError,
}

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        match self.kind {
            Some(PayloadKind::Form) => PageError(self.error).into_response(),
            _ => self.error.into_response(),
        }
    }
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = PayloadKind::detect(req.headers()).ok_or_else(|| PayloadRejection {
            kind: None,
            error: AppError::UnsupportedMediaType(
                "Expected an application/json or form-encoded body".into(),
            ),
        })?;

        let reject = |error: AppError| PayloadRejection {
            kind: Some(kind),
            error,
        };

        let data: T = match kind {
            PayloadKind::Json => {
                Json::<T>::from_request(req, state)
                    .await
                    .map_err(|r| reject(malformed(&r.body_text())))?
                    .0
            }
            PayloadKind::Form => {
                Form::<T>::from_request(req, state)
                    .await
                    .map_err(|r| reject(malformed(&r.body_text())))?
                    .0
            }
        };

        data.validate()
            .map_err(|e| reject(AppError::Core(CoreError::Validation(validation_message(&e)))))?;

        Ok(Self { data, kind })
    }
}

fn malformed(detail: &str) -> AppError {
    AppError::BadRequest(sanitize_error_message(&format!(
        "Malformed request body: {detail}"
    )))
}
