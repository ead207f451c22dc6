//! Shared-secret API key check, grounded on the original's `check_key()`
//! in `api.py`. `libs/core/axum-helpers` carries a JWT/session/CSRF stack
//! built for per-user auth this service doesn't have, so this is a small
//! bespoke `axum::middleware::from_fn` instead.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;

const API_KEY_HEADER: &str = "x-api-key";

/// Mirrors `domain_jobs::error::ErrorResponse`'s JSON shape without
/// depending on the crate for it.
#[derive(Serialize)]
struct ErrorBody {
    code: i32,
    error: &'static str,
    message: &'static str,
}

fn unauthorized() -> Response {
    let body = ErrorBody {
        code: 1401,
        error: "UNAUTHORIZED",
        message: "missing or invalid X-API-Key",
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Rejects the request unless `X-API-Key` matches `Config::api_key`. An
/// empty configured key disables the check entirely (local dev).
pub async fn require_api_key(
    State(expected): State<std::sync::Arc<str>>,
    request: Request,
    next: Next,
) -> Response {
    if expected.is_empty() {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key_matches(key, &expected) => next.run(request).await,
        _ => unauthorized(),
    }
}

/// Constant-time comparison: a length check (public, not secret-dependent)
/// followed by `ConstantTimeEq` over the byte slices, so a wrong key never
/// leaks how many leading bytes matched.
fn key_matches(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    provided.len() == expected.len() && provided.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_identical_keys() {
        assert!(key_matches("s3cr3t", "s3cr3t"));
    }

    #[test]
    fn rejects_wrong_key() {
        assert!(!key_matches("wrong", "s3cr3t"));
    }

    #[test]
    fn rejects_differing_lengths() {
        assert!(!key_matches("s3cr3t-extra", "s3cr3t"));
    }
}
