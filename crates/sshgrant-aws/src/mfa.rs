// ABOUTME: MFA-elevated credential chain: GetSessionToken then AssumeRole.
// ABOUTME: Credentials live for one grant invocation and are never persisted.

use crate::error::{GrantError, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::config::Credentials;
use sshgrant_core::config::{Config, Environment};
use std::fmt;
use tracing::debug;

/// Time-boxed credentials for the environment's grant role, obtained by
/// chaining an MFA session into a role assumption. Used to build exactly
/// one Lambda client, then dropped.
pub struct ElevatedCredentials {
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: String,
}

impl fmt::Debug for ElevatedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevatedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .finish()
    }
}

/// Exchange a fresh MFA code for credentials on the environment's grant
/// role. Two STS calls: `GetSessionToken` against the requester's own
/// MFA device, then `AssumeRole` on the grant role with that session.
pub async fn elevated_credentials(
    config: &Config,
    environment: Environment,
    user_name: &str,
    mfa_code: &str,
) -> Result<ElevatedCredentials> {
    let duration = i32::try_from(config.session_duration)
        .map_err(|_| GrantError::Mfa("session_duration does not fit an STS request".into()))?;

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;

    debug!(user_name, "requesting an MFA session token");
    let sts = aws_sdk_sts::Client::new(&shared);
    let session = sts
        .get_session_token()
        .duration_seconds(duration)
        .serial_number(config.mfa_serial(user_name))
        .token_code(mfa_code)
        .send()
        .await
        .map_err(|e| GrantError::Mfa(e.to_string()))?;
    let session_creds = session
        .credentials()
        .ok_or_else(|| GrantError::Mfa("GetSessionToken returned no credentials".into()))?;

    let mfa_provider = Credentials::new(
        session_creds.access_key_id(),
        session_creds.secret_access_key(),
        Some(session_creds.session_token().to_string()),
        None,
        "sshgrant-mfa",
    );
    let mfa_conf = aws_sdk_sts::config::Builder::from(&shared)
        .credentials_provider(mfa_provider)
        .build();
    let elevated_sts = aws_sdk_sts::Client::from_conf(mfa_conf);

    let grant_role_arn = &config.environment(environment).grant_role_arn;
    debug!(environment = %environment, "assuming the grant role");
    let assumed = elevated_sts
        .assume_role()
        .role_arn(grant_role_arn)
        .role_session_name(format!("sshgrant-{}", user_name))
        .duration_seconds(duration)
        .send()
        .await
        .map_err(|e| GrantError::AssumeRole(e.to_string()))?;
    let role_creds = assumed
        .credentials()
        .ok_or_else(|| GrantError::AssumeRole("AssumeRole returned no credentials".into()))?;

    Ok(ElevatedCredentials {
        access_key_id: role_creds.access_key_id().to_string(),
        secret_access_key: role_creds.secret_access_key().to_string(),
        session_token: role_creds.session_token().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_credentials_debug_is_redacted() {
        let creds = ElevatedCredentials {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "very-secret".to_string(),
            session_token: "session-secret".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("session-secret"));
    }
}
