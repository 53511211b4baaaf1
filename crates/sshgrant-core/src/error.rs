// ABOUTME: Error types for the certificate issuance workflow using thiserror.
// ABOUTME: One variant per failure class; every failure is terminal, nothing retries.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a certificate issuance run.
///
/// Every variant is fatal. The only recoverable branch in the whole
/// workflow is declining the overwrite confirmation, which is not an
/// error at all.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The requested TTL exceeds the configured ceiling. Raised before
    /// any network activity.
    #[error("requested ttl of {requested}s exceeds the maximum of {max}s")]
    PolicyViolation { requested: u64, max: u64 },

    /// LDAP login against the identity broker failed, or the broker was
    /// unreachable. One class, distinguished only by message.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The unwrap exchange was refused (token already used, expired, or
    /// malformed) or the response carried no certificate.
    #[error("failed to unwrap the signed certificate: {0}")]
    Unwrap(String),

    /// The privileged grant invocation failed or returned an error payload.
    #[error("privileged grant failed: {0}")]
    Grant(String),

    /// Failed to read the requester's public key file.
    #[error("failed to read public key from {path}: {source}")]
    ReadPublicKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The public key file did not contain an OpenSSH public key line.
    #[error("{path} does not look like an OpenSSH public key")]
    MalformedPublicKey { path: PathBuf },

    /// Failed to write the signed certificate to disk.
    #[error("failed to write certificate to {path}: {source}")]
    WriteCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An interactive prompt could not be read.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias using WorkflowError.
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_policy_violation_display() {
        let err = WorkflowError::PolicyViolation {
            requested: 50000,
            max: 43200,
        };
        let display = format!("{}", err);
        assert!(display.contains("50000"));
        assert!(display.contains("43200"));
    }

    #[test]
    fn test_authentication_display() {
        let err = WorkflowError::Authentication("vault is unreachable".to_string());
        assert!(format!("{}", err).contains("authentication failed"));
    }

    #[test]
    fn test_write_certificate_display() {
        let err = WorkflowError::WriteCertificate {
            path: PathBuf::from("/tmp/id_rsa-cert.pub"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        };
        let display = format!("{}", err);
        assert!(display.contains("failed to write certificate"));
        assert!(display.contains("/tmp/id_rsa-cert.pub"));
    }
}
