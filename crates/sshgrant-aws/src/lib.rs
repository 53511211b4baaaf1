// ABOUTME: Privileged-action broker crate: MFA session chain plus grant Lambda.
// ABOUTME: Implements sshgrant-core's GrantBroker over aws-sdk-sts and aws-sdk-lambda.

//! # sshgrant-aws
//!
//! The automatic token-minting path for non-sensitive environments:
//! a fresh MFA code buys an STS session, the session assumes the
//! environment's grant role, and the elevated credentials invoke the
//! grant Lambda once with `{"user_name", "ttl"}`. The Lambda answers
//! `{"token": ...}` (a single-use wrapped token) or `{"error": ...}`.
//!
//! Sensitive (production-tier) environments never use this path; they
//! require a human approver to run the grant out-of-band.

pub mod error;
pub mod grant;
pub mod mfa;

pub use error::{GrantError, Result};
pub use grant::GrantClient;
