//! Bridge error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Everything a handler can fail with, mapped onto the bridge's
/// JSON error shape.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Caller input error (missing or malformed field).
    #[error("{0}")]
    BadRequest(String),
    /// Signing was requested before any PKP was minted or loaded.
    #[error("No PKP has been minted or loaded; call /createWallet first")]
    NoPkp,
    /// The signing network or the chain rejected or dropped the request.
    #[error("Upstream failure: {0}")]
    Upstream(anyhow::Error),
    /// Local failure inside the bridge itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Upstream(err)
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            BridgeError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": msg }),
            ),
            BridgeError::NoPkp => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": self.to_string() }),
            ),
            BridgeError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                // Echo the failure as-is: message is the outermost error,
                // stack is the full cause chain.
                json!({
                    "success": false,
                    "error": err.to_string(),
                    "message": err.root_cause().to_string(),
                    "stack": format!("{err:?}"),
                }),
            ),
            BridgeError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": msg }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_status_codes() {
        let cases = [
            (BridgeError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (BridgeError::NoPkp, StatusCode::INTERNAL_SERVER_ERROR),
            (
                BridgeError::Upstream(anyhow::anyhow!("node down")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                BridgeError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_upstream_preserves_cause_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = inner.context("Handshake request failed").unwrap_err();
        let bridge_err = BridgeError::from(err);

        if let BridgeError::Upstream(e) = &bridge_err {
            assert_eq!(e.to_string(), "Handshake request failed");
            assert_eq!(e.root_cause().to_string(), "connection refused");
        } else {
            panic!("expected Upstream");
        }
    }
}
