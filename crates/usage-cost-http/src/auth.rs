//! Function-key authentication middleware.
//!
//! When a function key is configured, calculation requests must present it either
//! in the `x-functions-key` header or in the `code` query parameter. Without a
//! configured key every request is let through.

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::server::AppState;

/// Header carrying the function key
pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";

/// Query parameter carrying the function key
pub const FUNCTION_KEY_QUERY: &str = "code";

/// Function-key configuration for the calculation routes.
#[derive(Clone, Default)]
pub struct FunctionKeyAuth {
    /// Expected key. `None` disables the check.
    pub function_key: Option<String>,
}

impl FunctionKeyAuth {
    /// Auth requiring the given key
    pub fn new(function_key: Option<String>) -> Self {
        Self { function_key }
    }

    /// Whether a presented key is acceptable
    pub fn accepts(&self, presented: Option<&str>) -> bool {
        match &self.function_key {
            None => true,
            Some(expected) => presented
                .is_some_and(|key| key.as_bytes().ct_eq(expected.as_bytes()).into()),
        }
    }
}

impl std::fmt::Debug for FunctionKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionKeyAuth")
            .field(
                "function_key",
                &self.function_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that rejects calculation requests without the configured function key.
pub async fn function_key_middleware(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = request
        .headers()
        .get(FUNCTION_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| params.get(FUNCTION_KEY_QUERY).map(String::as_str));

    if state.auth.accepts(presented) {
        Ok(next.run(request).await)
    } else {
        tracing::debug!("rejecting request without a valid function key");
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_key_configured_accepts_everything() {
        let auth = FunctionKeyAuth::default();
        assert!(auth.accepts(None));
        assert!(auth.accepts(Some("anything")));
    }

    #[test]
    fn test_configured_key_must_match() {
        let auth = FunctionKeyAuth::new(Some("s3cret".to_string()));
        assert!(auth.accepts(Some("s3cret")));
        assert!(!auth.accepts(Some("wrong")));
        assert!(!auth.accepts(None));
    }

    #[test]
    fn test_key_prefix_and_extension_rejected() {
        let auth = FunctionKeyAuth::new(Some("s3cret".to_string()));
        assert!(!auth.accepts(Some("s3cre")));
        assert!(!auth.accepts(Some("s3cret!")));
        assert!(!auth.accepts(Some("")));
    }

    #[test]
    fn test_debug_redacts_key() {
        let auth = FunctionKeyAuth::new(Some("s3cret".to_string()));
        let debug = format!("{auth:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[redacted]"));
    }
}
