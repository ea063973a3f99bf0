//! Lit Bridge
//!
//! A local HTTP bridge exposing a decentralized signing network (Lit) to
//! non-JS callers over plain JSON. The bridge holds one funded wallet,
//! mints and caches a single PKP (programmable key pair), and forwards
//! JS-execution and signing requests to the network under short-lived
//! session delegations.

pub mod config;
pub mod lit;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;
pub mod wallet;
