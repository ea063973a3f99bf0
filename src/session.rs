//! Session Delegation Helper
//!
//! Builds the short-lived signed authorization the signing network requires:
//! a Sign-In With Ethereum (EIP-4361) message binding the wallet address,
//! the requested ability/resource pairs, a ten-minute expiry, and a nonce
//! tied to current network state, signed with the bridge wallet.
//!
//! Delegations are built fresh per request and never cached.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use crate::types::{AuthSig, LitClient, ResourceAbility, SessionSigs};

/// How long a session delegation stays valid.
pub const SESSION_TTL_MINUTES: i64 = 10;

/// SIWE domain used in the sign-in message.
const SIWE_DOMAIN: &str = "localhost";

/// Statement included in every delegation message.
const SIWE_STATEMENT: &str =
    "I am delegating limited abilities on the Lit network to this session.";

/// Construct an EIP-4361 (SIWE) message string manually.
///
/// Format:
/// ```text
/// {domain} wants you to sign in with your Ethereum account:
/// {address}
///
/// {statement}
///
/// URI: {uri}
/// Version: 1
/// Chain ID: {chain_id}
/// Nonce: {nonce}
/// Issued At: {issued_at}
/// Expiration Time: {expiration}
/// Resources:
/// - {resource} ({ability})
/// ```
#[allow(clippy::too_many_arguments)]
pub fn build_siwe_message(
    domain: &str,
    address: &Address,
    statement: &str,
    uri: &str,
    chain_id: u64,
    nonce: &str,
    issued_at: &str,
    expiration: &str,
    resources: &[ResourceAbility],
) -> String {
    let mut message = format!(
        "{domain} wants you to sign in with your Ethereum account:\n\
         {address}\n\
         \n\
         {statement}\n\
         \n\
         URI: {uri}\n\
         Version: 1\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {issued_at}\n\
         Expiration Time: {expiration}",
        domain = domain,
        address = address.to_checksum(None),
        statement = statement,
        uri = uri,
        chain_id = chain_id,
        nonce = nonce,
        issued_at = issued_at,
        expiration = expiration,
    );

    if !resources.is_empty() {
        message.push_str("\nResources:");
        for r in resources {
            message.push_str(&format!("\n- {} ({})", r.resource, r.ability));
        }
    }

    message
}

/// Sign a prepared message with the wallet and wrap it as an [`AuthSig`].
pub async fn generate_auth_sig(signer: &PrivateKeySigner, message: &str) -> Result<AuthSig> {
    let signature = signer
        .sign_message(message.as_bytes())
        .await
        .context("Failed to sign delegation message")?;

    Ok(AuthSig {
        sig: format!("0x{}", hex::encode(signature.as_bytes())),
        derived_via: "web3.eth.personal.sign".to_string(),
        signed_message: message.to_string(),
        address: signer.address().to_checksum(None),
    })
}

/// Build a fresh session delegation scoped to JS execution and PKP signing.
///
/// Obtains a nonce from current network state, constructs the SIWE message,
/// signs it with the wallet, and returns the signed object. Any failing
/// step (network unreachable, signing failure) propagates to the caller.
pub async fn get_session_sigs(
    signer: &PrivateKeySigner,
    lit: &dyn LitClient,
    chain_id: u64,
    uri: &str,
) -> Result<SessionSigs> {
    let resources = vec![
        ResourceAbility::lit_action_execution(),
        ResourceAbility::pkp_signing(),
    ];

    let nonce = lit
        .latest_blockhash()
        .await
        .context("Failed to fetch nonce from the signing network")?;

    let issued_at = Utc::now().to_rfc3339();
    let expiration = (Utc::now() + Duration::minutes(SESSION_TTL_MINUTES)).to_rfc3339();

    let message = build_siwe_message(
        SIWE_DOMAIN,
        &signer.address(),
        SIWE_STATEMENT,
        uri,
        chain_id,
        &nonce,
        &issued_at,
        &expiration,
        &resources,
    );

    let auth_sig = generate_auth_sig(signer, &message).await?;

    Ok(SessionSigs {
        auth_sig,
        resource_ability_requests: resources,
        expiration,
    })
}
