// ABOUTME: Error types for the privileged grant path using thiserror.
// ABOUTME: Distinguishes infrastructure failures from a denying/malformed lambda payload.

use thiserror::Error;

/// Errors from the MFA-gated grant path. All fatal, nothing retries.
#[derive(Error, Debug)]
pub enum GrantError {
    /// The MFA session could not be established.
    #[error("MFA session failed: {0}")]
    Mfa(String),

    /// The grant role could not be assumed with the MFA session.
    #[error("failed to assume the grant role: {0}")]
    AssumeRole(String),

    /// The Lambda invocation itself failed (transport, permissions,
    /// function error).
    #[error("failed to invoke the grant lambda: {0}")]
    Invoke(String),

    /// The Lambda responded, but with an error payload or something
    /// that is not `{"token": ...}`. Reported verbatim so a denial is
    /// distinguishable from infrastructure failure.
    #[error("invalid response from lambda: {0}")]
    InvalidResponse(String),
}

/// Result type alias using GrantError.
pub type Result<T> = std::result::Result<T, GrantError>;

impl From<GrantError> for sshgrant_core::WorkflowError {
    fn from(err: GrantError) -> Self {
        sshgrant_core::WorkflowError::Grant(err.to_string())
    }
}
