//! Signing network integration: the node client and the PKP minting
//! contract client. Both implement the seams in [`crate::types`].

pub mod client;
pub mod contracts;

pub use client::HttpLitClient;
pub use contracts::ContractPkpMinter;
