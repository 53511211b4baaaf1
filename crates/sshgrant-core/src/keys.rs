// ABOUTME: Public-key file reading and certificate persistence helpers.
// ABOUTME: Only touches OpenSSH one-line public keys; key management is out of scope.

use crate::error::{Result, WorkflowError};
use std::path::{Path, PathBuf};

/// Read an OpenSSH public key, keeping only the algorithm and key body.
///
/// `"ssh-rsa AAB...3odo3Xsjd user@host\n"` becomes `"ssh-rsa AAB...3odo3Xsjd"`:
/// the trailing comment varies per machine and is dropped so the approver
/// sees a stable value.
pub fn read_public_key(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| WorkflowError::ReadPublicKey {
        path: path.to_path_buf(),
        source: e,
    })?;

    let first_line = contents.lines().next().unwrap_or("");
    let mut tokens = first_line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(algorithm), Some(body)) => Ok(format!("{} {}", algorithm, body)),
        _ => Err(WorkflowError::MalformedPublicKey {
            path: path.to_path_buf(),
        }),
    }
}

/// Derive the private key path from the public key path by stripping the
/// `.pub` extension, for the final ssh invocation hint.
pub fn private_key_path(public_key_path: &Path) -> PathBuf {
    if public_key_path.extension().is_some_and(|e| e == "pub") {
        public_key_path.with_extension("")
    } else {
        public_key_path.to_path_buf()
    }
}

/// Write the signed certificate verbatim to the output path.
pub fn write_certificate(path: &Path, payload: &[u8]) -> Result<()> {
    std::fs::write(path, payload).map_err(|e| WorkflowError::WriteCertificate {
        path: path.to_path_buf(),
        source: e,
    })
}
