// ABOUTME: Identity-broker client crate: LDAP login and one-time unwrap.
// ABOUTME: Implements sshgrant-core's IdentityBroker over the Vault HTTP API.

//! # sshgrant-vault
//!
//! HTTP client for the Vault-style identity broker:
//!
//! - `POST /v1/auth/ldap/login/{username}` exchanges LDAP credentials
//!   for a session token;
//! - `POST /v1/sys/wrapping/unwrap` redeems a single-use wrapped token
//!   (with the session token as `X-Vault-Token`) for the signed
//!   certificate. A second unwrap of the same token fails server-side.

pub mod client;
pub mod error;

pub use client::VaultClient;
pub use error::{Result, VaultError};
