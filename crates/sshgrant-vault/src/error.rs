// ABOUTME: Error types for the identity-broker client using thiserror.
// ABOUTME: Two failure classes mirror the broker contract: login and unwrap.

use thiserror::Error;

/// Errors from the identity broker.
///
/// Bad credentials, a locked account, and an unreachable broker all
/// surface as `Authentication`, distinguished only by message; the
/// broker gives the client no way to tell them apart reliably.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),

    /// LDAP login did not yield a client token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The unwrap exchange was refused or returned no certificate.
    /// Covers consumed, expired, and malformed wrapped tokens.
    #[error("failed to unwrap the signed certificate: {0}")]
    Unwrap(String),
}

/// Result type alias using VaultError.
pub type Result<T> = std::result::Result<T, VaultError>;

impl From<VaultError> for sshgrant_core::WorkflowError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::Client(msg) => sshgrant_core::WorkflowError::Config(msg),
            VaultError::Authentication(msg) => sshgrant_core::WorkflowError::Authentication(msg),
            VaultError::Unwrap(msg) => sshgrant_core::WorkflowError::Unwrap(msg),
        }
    }
}
