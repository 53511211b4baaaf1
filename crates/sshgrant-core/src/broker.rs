// ABOUTME: Trait seams between the workflow and its external brokers.
// ABOUTME: Also defines the credential-bearing newtypes, all with redacted Debug.

use crate::config::Environment;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Session token returned by a successful LDAP login. Used exactly once
/// for the unwrap call, never persisted.
#[derive(Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        SessionToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(\"[REDACTED]\")")
    }
}

/// Opaque single-use wrapped token. The broker enforces single use
/// server-side; nothing here tracks consumption locally.
#[derive(Clone)]
pub struct WrappedToken(String);

impl WrappedToken {
    pub fn new(token: impl Into<String>) -> Self {
        WrappedToken(token.into())
    }

    /// Builds a token from a value pasted into a terminal, trimming the
    /// spaces and quote characters approvers tend to include.
    pub fn from_pasted(raw: &str) -> Self {
        WrappedToken(raw.trim_matches([' ', '\'', '"']).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WrappedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WrappedToken(\"[REDACTED]\")")
    }
}

/// Signed certificate payload returned by the unwrap exchange. Written
/// verbatim to the output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate(String);

impl SignedCertificate {
    pub fn new(payload: impl Into<String>) -> Self {
        SignedCertificate(payload.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Client for the identity broker: LDAP login plus the one-time unwrap
/// exchange. One failed attempt terminates the workflow; no retries.
#[async_trait]
pub trait IdentityBroker {
    /// Exchange LDAP credentials for a session token.
    async fn login(
        &self,
        environment: Environment,
        user_name: &str,
        password: &str,
    ) -> Result<SessionToken>;

    /// Redeem a wrapped token for the signed certificate it protects.
    async fn unwrap_certificate(
        &self,
        environment: Environment,
        session: &SessionToken,
        wrapped: &WrappedToken,
    ) -> Result<SignedCertificate>;
}

/// Client for the privileged grant path: mints a wrapped token by
/// invoking the grant Lambda under an MFA-elevated session. Only used
/// for non-sensitive environments.
#[async_trait]
pub trait GrantBroker {
    async fn invoke_grant(
        &self,
        user_name: &str,
        environment: Environment,
        ttl: u64,
    ) -> Result<WrappedToken>;
}

/// Interactive terminal capability, injected so tests can script it and
/// so presentation stays out of the workflow.
pub trait Prompt {
    /// Display a block of text (instructions, final hints).
    fn show(&self, text: &str);

    /// Read a line of input.
    fn input(&self, prompt: &str) -> Result<String>;

    /// Read a masked secret. Implementations must never echo or log it.
    fn password(&self, prompt: &str) -> Result<String>;

    /// Yes/no confirmation; empty input means `default_yes`.
    fn confirm(&self, prompt: &str, default_yes: bool) -> Result<bool>;
}
