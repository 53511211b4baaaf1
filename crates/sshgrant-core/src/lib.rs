// ABOUTME: Core library for sshgrant: config, broker seams, and the workflow.
// ABOUTME: Everything network-facing lives behind the traits in broker.

//! # sshgrant-core
//!
//! Core of the `sshgrant` tool: requests short-lived, signed SSH
//! certificates by brokering between an identity broker (Vault-style
//! LDAP login + one-time token unwrap), a privileged grant Lambda gated
//! behind an approver's MFA, and the local filesystem.
//!
//! The interesting piece is the two-party token-wrapping handshake in
//! [`workflow::issue`]: a requester obtains a single-use wrapped token —
//! pasted back by a human approver for sensitive environments, or minted
//! directly via the MFA grant path for the rest — and exchanges it,
//! together with a fresh LDAP session, for the signed certificate.
//! The wrapped token is consumable exactly once, enforced by the broker.
//!
//! Module layout:
//!
//! ```text
//! sshgrant-core
//! ├── config     # Environment tags, injected Config, TTL policy
//! ├── broker     # IdentityBroker / GrantBroker / Prompt trait seams
//! ├── keys       # Public-key reading, certificate persistence
//! ├── workflow   # The linear issuance state machine
//! └── error      # WorkflowError taxonomy
//! ```
//!
//! Concrete broker implementations live in `sshgrant-vault` (HTTP) and
//! `sshgrant-aws` (STS + Lambda); the `sshgrant` binary wires them up.

pub mod broker;
pub mod config;
pub mod error;
pub mod keys;
pub mod workflow;

pub use broker::{GrantBroker, IdentityBroker, Prompt, SessionToken, SignedCertificate, WrappedToken};
pub use config::{Config, Environment, DEFAULT_TTL, MAX_TTL};
pub use error::{Result, WorkflowError};
pub use workflow::{IssuanceRequest, Outcome};
