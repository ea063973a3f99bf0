//! Bridge endpoint handlers.
//!
//! Each handler covers one bridge operation: readiness probing, remote
//! JS execution, PKP minting, record retrieval, and PKP signing.
//! Handlers talk to the network and the chain only through the
//! [`LitClient`] / [`PkpMinter`] traits on [`AppState`].

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::session;
use crate::storage;

use super::{AppState, BridgeError};

/// URI embedded in the SIWE message for a given endpoint.
fn endpoint_uri(state: &AppState, endpoint: &str) -> String {
    format!("http://localhost:{}/{}", state.config.port, endpoint)
}

/// GET /: liveness probe for the managing process.
pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "Server is running" }))
}

/// POST /isReady: whether the network connection is established.
///
/// Always 200; readiness is reported in the body, never as an error.
pub async fn handle_is_ready(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "ready": state.lit.is_ready() }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteJsRequest {
    #[serde(default)]
    pub code: Option<String>,
    /// Arbitrary parameters forwarded to the executed code.
    #[serde(default)]
    pub js_params: Value,
}

/// POST /executeJs: run caller-supplied JS on the signing network.
pub async fn handle_execute_js(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExecuteJsRequest>,
) -> Result<Json<Value>, BridgeError> {
    // Validate before any network traffic.
    let code = match body.code {
        Some(c) if !c.trim().is_empty() => c,
        _ => return Err(BridgeError::BadRequest("No code provided".to_string())),
    };

    let session = session::get_session_sigs(
        &state.signer,
        state.lit.as_ref(),
        state.config.network.chain_id(),
        &endpoint_uri(&state, "executeJs"),
    )
    .await?;

    let response = state.lit.execute_js(&session, &code, body.js_params).await?;
    Ok(Json(response))
}

/// POST /createWallet: mint a new PKP and persist its record.
///
/// Mints are serialized: concurrent calls each mint, but their store
/// writes cannot interleave, so the store always holds exactly one
/// complete record afterwards.
pub async fn handle_create_wallet(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, BridgeError> {
    let _guard = state.mint_lock.lock().await;

    let session = session::get_session_sigs(
        &state.signer,
        state.lit.as_ref(),
        state.config.network.chain_id(),
        &endpoint_uri(&state, "createWallet"),
    )
    .await?;

    let mint = state.minter.mint_with_auth(&session.auth_sig).await?;

    storage::save_pkp(state.store.as_ref(), &mint.pkp)
        .map_err(|e| BridgeError::Internal(format!("{e:#}")))?;
    *state.pkp.write().await = Some(mint.pkp.clone());

    let body = serde_json::to_value(&mint).map_err(|e| BridgeError::Internal(e.to_string()))?;
    Ok(Json(body))
}

/// GET /pkp: the persisted PKP record, read back from the store.
///
/// The body is the record object itself, or bare `null` before any mint,
/// so clients can decode it directly.
pub async fn handle_get_pkp(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, BridgeError> {
    let pkp = storage::load_pkp(state.store.as_ref())
        .map_err(|e| BridgeError::Internal(format!("{e:#}")))?;
    match pkp {
        Some(pkp) => {
            let body =
                serde_json::to_value(&pkp).map_err(|e| BridgeError::Internal(e.to_string()))?;
            Ok(Json(body))
        }
        None => Ok(Json(Value::Null)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(default)]
    pub to_sign: Option<String>,
}

/// POST /sign: threshold-sign a digest with the active PKP.
pub async fn handle_sign(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignRequest>,
) -> Result<Json<Value>, BridgeError> {
    let to_sign = match body.to_sign {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(BridgeError::BadRequest("No toSign provided".to_string())),
    };

    let pkp = state
        .pkp
        .read()
        .await
        .clone()
        .ok_or(BridgeError::NoPkp)?;

    let bytes = hex::decode(to_sign.trim_start_matches("0x"))
        .map_err(|e| BridgeError::BadRequest(format!("toSign is not valid hex: {e}")))?;

    let session = session::get_session_sigs(
        &state.signer,
        state.lit.as_ref(),
        state.config.network.chain_id(),
        &endpoint_uri(&state, "sign"),
    )
    .await?;

    let signature = state
        .lit
        .pkp_sign(&session, &pkp.public_key, &bytes)
        .await?;
    Ok(Json(json!({ "signature": signature })))
}
