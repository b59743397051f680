use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use atrium_core::{AppError, UserIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the authenticated subject set by the identity proxy.
pub const SUBJECT_HEADER: &str = "x-atrium-subject";
/// Header carrying the authenticated email set by the identity proxy.
pub const EMAIL_HEADER: &str = "x-atrium-email";
/// Optional header carrying the display name set by the identity proxy.
pub const DISPLAY_NAME_HEADER: &str = "x-atrium-display-name";

pub async fn require_auth(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = identity_from_headers(request.headers())?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_sign_in_hook_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("sign-in hook token required".to_owned()))?;

    if !tokens_match(presented, state.sign_in_hook_token.as_str()) {
        return Err(AppError::Unauthorized("invalid sign-in hook token".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn identity_from_headers(headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    let subject = header_value(headers, SUBJECT_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let email = header_value(headers, EMAIL_HEADER);
    let display_name = header_value(headers, DISPLAY_NAME_HEADER)
        .or_else(|| email.clone())
        .unwrap_or_else(|| subject.clone());

    Ok(UserIdentity::new(subject, display_name, email))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
            == 0
}
