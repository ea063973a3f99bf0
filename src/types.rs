//! Shared types and client seams for the Lit bridge.
//!
//! The two traits here, [`LitClient`] and [`PkpMinter`], are the boundaries
//! between the bridge's HTTP glue and the signing network / minting contract.
//! Handlers only ever talk to the traits, which keeps every endpoint testable
//! against in-process mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---- Session Delegation -----------------------------------------------

/// One ability/resource pair a session delegation is scoped to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAbility {
    pub resource: String,
    pub ability: String,
}

impl ResourceAbility {
    /// Permission to run caller-supplied JS on the signing network.
    pub fn lit_action_execution() -> Self {
        Self {
            resource: "lit-litaction://*".to_string(),
            ability: "lit-action-execution".to_string(),
        }
    }

    /// Permission to request threshold signatures with any PKP key.
    pub fn pkp_signing() -> Self {
        Self {
            resource: "lit-pkp://*".to_string(),
            ability: "pkp-signing".to_string(),
        }
    }
}

/// EIP-191 signature over a SIWE message, in the shape the signing
/// nodes expect as proof of wallet ownership.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    /// Hex-encoded 65-byte signature with "0x" prefix.
    pub sig: String,
    /// How the signature was produced, e.g. "web3.eth.personal.sign".
    pub derived_via: String,
    /// The exact SIWE message text that was signed.
    pub signed_message: String,
    /// Checksummed address of the signing wallet.
    pub address: String,
}

/// A short-lived session delegation: the wallet's auth sig plus the
/// ability/resource pairs and expiration it covers.
///
/// Built fresh for every request that needs network authentication and
/// never cached; the nodes enforce the expiration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSigs {
    pub auth_sig: AuthSig,
    pub resource_ability_requests: Vec<ResourceAbility>,
    /// ISO-8601 expiry timestamp, ten minutes from issuance.
    pub expiration: String,
}

// ---- Minted PKP Record ------------------------------------------------

/// A minted PKP: the on-chain key-pair whose private share lives on the
/// signing nodes. Identifier widths are fixed: `token_id` is 66 chars
/// ("0x" + 64 hex), `public_key` is 130 hex chars (uncompressed
/// secp256k1, no prefix), `eth_address` is 42 chars.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PkpInfo {
    pub token_id: String,
    pub public_key: String,
    pub eth_address: String,
}

/// Result of a mint: the PKP record plus the raw transaction receipt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintResult {
    pub pkp: PkpInfo,
    /// Receipt of the mint transaction, passed through as-is.
    pub tx: Value,
}

// ---- Signing Network Seam ---------------------------------------------

/// Client for the decentralized signing network.
///
/// The network's threshold cryptography is opaque to the bridge; this
/// trait only covers connectivity and request dispatch.
#[async_trait]
pub trait LitClient: Send + Sync {
    /// Whether the network connection is established (a threshold of
    /// nodes has completed the handshake).
    fn is_ready(&self) -> bool;

    /// Handshake with the bootstrap nodes until the ready threshold is met.
    async fn connect(&self) -> anyhow::Result<()>;

    /// Latest blockhash observed by the network, used as a SIWE nonce.
    async fn latest_blockhash(&self) -> anyhow::Result<String>;

    /// Run caller-supplied JS on the network under a session delegation.
    /// Returns the node response verbatim.
    async fn execute_js(
        &self,
        session: &SessionSigs,
        code: &str,
        js_params: Value,
    ) -> anyhow::Result<Value>;

    /// Ask the network to produce an aggregated signature over `to_sign`
    /// with the PKP identified by `pubkey`.
    async fn pkp_sign(
        &self,
        session: &SessionSigs,
        pubkey: &str,
        to_sign: &[u8],
    ) -> anyhow::Result<Value>;
}

// ---- Minting Seam -----------------------------------------------------

/// On-chain PKP minting, authorized by a wallet auth sig.
#[async_trait]
pub trait PkpMinter: Send + Sync {
    async fn mint_with_auth(&self, auth_sig: &AuthSig) -> anyhow::Result<MintResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ability_pairs() {
        let action = ResourceAbility::lit_action_execution();
        assert_eq!(action.resource, "lit-litaction://*");
        assert_eq!(action.ability, "lit-action-execution");

        let signing = ResourceAbility::pkp_signing();
        assert_eq!(signing.resource, "lit-pkp://*");
        assert_eq!(signing.ability, "pkp-signing");
    }

    #[test]
    fn test_pkp_info_serializes_camel_case() {
        let pkp = PkpInfo {
            token_id: "0xabc".to_string(),
            public_key: "04def".to_string(),
            eth_address: "0x123".to_string(),
        };
        let json = serde_json::to_value(&pkp).unwrap();
        assert_eq!(json["tokenId"], "0xabc");
        assert_eq!(json["publicKey"], "04def");
        assert_eq!(json["ethAddress"], "0x123");
    }

    #[test]
    fn test_session_sigs_roundtrip() {
        let session = SessionSigs {
            auth_sig: AuthSig {
                sig: "0x00".to_string(),
                derived_via: "web3.eth.personal.sign".to_string(),
                signed_message: "msg".to_string(),
                address: "0xABCD".to_string(),
            },
            resource_ability_requests: vec![ResourceAbility::pkp_signing()],
            expiration: "2026-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_string(&session).unwrap();
        let back: SessionSigs = serde_json::from_str(&json).unwrap();
        assert_eq!(back.auth_sig.address, "0xABCD");
        assert_eq!(back.resource_ability_requests.len(), 1);
    }
}
