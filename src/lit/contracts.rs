//! On-Chain PKP Minting
//!
//! Mints a new PKP (key-pair NFT) on Chronicle Yellowstone via the PKP
//! helper contract, with the bridge wallet's auth sig registered as a
//! permitted auth method scoped to sign-anything.

use alloy::primitives::{Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sha3::{Digest, Keccak256};

use crate::config::LitNetwork;
use crate::types::{AuthSig, MintResult, PkpInfo, PkpMinter};

// ---- Contract Addresses -------------------------------------------------

/// PKP contract addresses on Chronicle Yellowstone (datil-dev deployment).
pub mod datil_dev {
    use alloy_primitives::{address, Address};

    pub const PKP_NFT: Address = address!("02c4242f72d62c8fef2b2db088a35a9f4ec741c7");
    pub const PKP_HELPER: Address = address!("ca9c62fb4cea8831ebb6fd9fe747cc372515cf7f");
}

fn pkp_nft_address(_network: LitNetwork) -> Address {
    // All networks currently share the datil-dev deployment addresses.
    datil_dev::PKP_NFT
}

fn pkp_helper_address(_network: LitNetwork) -> Address {
    datil_dev::PKP_HELPER
}

// ---- ABI Definitions (minimal subset for minting) ------------------------

sol! {
    #[allow(missing_docs)]
    interface IPkpNft {
        function mintCost() external view returns (uint256);
        function getPubkey(uint256 tokenId) external view returns (bytes);
        function getEthAddress(uint256 tokenId) external view returns (address);
    }

    #[allow(missing_docs)]
    interface IPkpHelper {
        function mintNextAndAddAuthMethods(
            uint256 keyType,
            uint256[] permittedAuthMethodTypes,
            bytes[] permittedAuthMethodIds,
            bytes[] permittedAuthMethodPubkeys,
            uint256[][] permittedAuthMethodScopes,
            bool addPkpEthAddressAsPermittedAddress,
            bool sendPkpToItself
        ) external payable returns (uint256);
    }
}

/// ECDSA secp256k1 key type.
const KEY_TYPE: u64 = 2;

/// Auth method type for an Ethereum wallet auth sig.
const AUTH_METHOD_ETH_WALLET: u64 = 1;

/// Permission scope allowing the auth method to sign anything.
const SCOPE_SIGN_ANYTHING: u64 = 1;

/// Auth method id for a wallet: keccak256("{lowercase address}:lit").
fn wallet_auth_method_id(address: &str) -> Vec<u8> {
    Keccak256::digest(format!("{}:lit", address.to_lowercase()).as_bytes()).to_vec()
}

fn transfer_topic() -> [u8; 32] {
    Keccak256::digest(b"Transfer(address,address,uint256)").into()
}

// ---- Minter --------------------------------------------------------------

/// [`PkpMinter`] implementation backed by the PKP contracts.
pub struct ContractPkpMinter {
    rpc_url: String,
    network: LitNetwork,
    signer: PrivateKeySigner,
}

impl ContractPkpMinter {
    pub fn new(rpc_url: String, network: LitNetwork, signer: PrivateKeySigner) -> Self {
        Self {
            rpc_url,
            network,
            signer,
        }
    }
}

#[async_trait]
impl PkpMinter for ContractPkpMinter {
    async fn mint_with_auth(&self, auth_sig: &AuthSig) -> Result<MintResult> {
        let nft_addr = pkp_nft_address(self.network);
        let helper_addr = pkp_helper_address(self.network);

        let wallet = alloy::network::EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.parse().context("Invalid RPC URL")?);

        // Current mint cost, paid as transaction value.
        let cost_tx = TransactionRequest::default()
            .to(nft_addr)
            .input(Bytes::from(IPkpNft::mintCostCall {}.abi_encode()).into());
        let cost_out = provider
            .call(cost_tx)
            .await
            .context("Failed to read mint cost")?;
        let mint_cost = U256::from_be_slice(&cost_out);

        // Mint with the wallet auth sig as a permitted auth method.
        let call = IPkpHelper::mintNextAndAddAuthMethodsCall {
            keyType: U256::from(KEY_TYPE),
            permittedAuthMethodTypes: vec![U256::from(AUTH_METHOD_ETH_WALLET)],
            permittedAuthMethodIds: vec![Bytes::from(wallet_auth_method_id(&auth_sig.address))],
            permittedAuthMethodPubkeys: vec![Bytes::new()],
            permittedAuthMethodScopes: vec![vec![U256::from(SCOPE_SIGN_ANYTHING)]],
            addPkpEthAddressAsPermittedAddress: true,
            sendPkpToItself: false,
        };

        let tx = TransactionRequest::default()
            .to(helper_addr)
            .value(mint_cost)
            .input(Bytes::from(call.abi_encode()).into());

        let pending = provider
            .send_transaction(tx)
            .await
            .context("Failed to send mint transaction")?;

        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to get mint receipt")?;

        // Extract the token id from the ERC-721 Transfer event.
        let transfer = transfer_topic();
        let mut token_id: Option<U256> = None;
        for log in receipt.inner.logs() {
            let topics = log.topics();
            if topics.len() >= 4 && topics[0].0 == transfer {
                token_id = Some(U256::from_be_bytes::<32>(topics[3].0));
                break;
            }
        }
        let Some(token_id) = token_id else {
            bail!("Mint receipt contained no Transfer event");
        };

        // Resolve the new key-pair's identity from contract state.
        let pubkey_tx = TransactionRequest::default()
            .to(nft_addr)
            .input(Bytes::from(IPkpNft::getPubkeyCall { tokenId: token_id }.abi_encode()).into());
        let pubkey_out = provider
            .call(pubkey_tx)
            .await
            .context("Failed to read PKP public key")?;
        let public_key = decode_abi_bytes(&pubkey_out).context("Malformed getPubkey response")?;

        let addr_tx = TransactionRequest::default()
            .to(nft_addr)
            .input(
                Bytes::from(IPkpNft::getEthAddressCall { tokenId: token_id }.abi_encode()).into(),
            );
        let addr_out = provider
            .call(addr_tx)
            .await
            .context("Failed to read PKP address")?;
        if addr_out.len() < 32 {
            bail!("Malformed getEthAddress response");
        }
        let eth_address = Address::from_slice(&addr_out[12..32]);

        let pkp = PkpInfo {
            token_id: format!("0x{token_id:064x}"),
            public_key: hex::encode(&public_key),
            eth_address: eth_address.to_checksum(None),
        };

        tracing::info!(
            token_id = %pkp.token_id,
            eth_address = %pkp.eth_address,
            tx_hash = ?receipt.transaction_hash,
            "Minted PKP"
        );

        let tx_json = serde_json::to_value(&receipt).context("Failed to serialize receipt")?;

        Ok(MintResult { pkp, tx: tx_json })
    }
}

/// Decode a single ABI-encoded dynamic `bytes` return value.
fn decode_abi_bytes(out: &[u8]) -> Result<Vec<u8>> {
    if out.len() < 64 {
        bail!("Return data too short for dynamic bytes");
    }
    let len = U256::from_be_slice(&out[32..64]).to::<usize>();
    if out.len() < 64 + len {
        bail!("Return data shorter than declared length");
    }
    Ok(out[64..64 + len].to_vec())
}
