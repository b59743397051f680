use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use atrium_core::AppError;
use tower_http::cors::CorsLayer;

use crate::middleware::{DISPLAY_NAME_HEADER, EMAIL_HEADER, SUBJECT_HEADER};

pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(SUBJECT_HEADER),
            HeaderName::from_static(EMAIL_HEADER),
            HeaderName::from_static(DISPLAY_NAME_HEADER),
        ]))
}
