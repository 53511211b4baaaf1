// ABOUTME: HTTP client for the Vault identity broker: LDAP login and unwrap.
// ABOUTME: Response parsing is split from transport so the JSON contract is testable.

use crate::error::{Result, VaultError};
use async_trait::async_trait;
use serde::Deserialize;
use sshgrant_core::broker::{IdentityBroker, SessionToken, SignedCertificate, WrappedToken};
use sshgrant_core::config::{Config, Environment};
use std::time::Duration;
use tracing::debug;

/// Client for the identity broker's HTTP API.
///
/// Each method performs exactly one request; a failed attempt terminates
/// the workflow, there are no retries.
pub struct VaultClient {
    http: reqwest::Client,
    config: Config,
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: Option<LoginAuth>,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: Option<String>,
}

#[derive(Deserialize)]
struct UnwrapResponse {
    #[serde(default)]
    errors: Vec<String>,
    data: Option<UnwrapData>,
}

#[derive(Deserialize)]
struct UnwrapData {
    signed_key: Option<String>,
}

impl VaultClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VaultError::Client(e.to_string()))?;
        Ok(VaultClient { http, config })
    }
}

#[async_trait]
impl IdentityBroker for VaultClient {
    async fn login(
        &self,
        environment: Environment,
        user_name: &str,
        password: &str,
    ) -> sshgrant_core::Result<SessionToken> {
        let vault_addr = &self.config.environment(environment).vault_addr;
        let url = format!("{}/v1/auth/ldap/login/{}", vault_addr, user_name);
        debug!(user_name, environment = %environment, "logging in to vault");

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .map_err(|e| VaultError::Authentication(format!("vault is unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VaultError::Authentication(format!("failed to read response: {}", e)))?;

        let token = parse_login(&status, &body)?;
        Ok(SessionToken::new(token))
    }

    async fn unwrap_certificate(
        &self,
        environment: Environment,
        session: &SessionToken,
        wrapped: &WrappedToken,
    ) -> sshgrant_core::Result<SignedCertificate> {
        let vault_addr = &self.config.environment(environment).vault_addr;
        let url = format!("{}/v1/sys/wrapping/unwrap", vault_addr);
        debug!(environment = %environment, "unwrapping the signed certificate");

        let response = self
            .http
            .post(&url)
            .header("X-Vault-Token", session.as_str())
            .json(&serde_json::json!({ "token": wrapped.as_str() }))
            .send()
            .await
            .map_err(|e| VaultError::Unwrap(format!("vault is unreachable: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| VaultError::Unwrap(format!("failed to read response: {}", e)))?;

        let signed_key = parse_unwrap(&body)?;
        Ok(SignedCertificate::new(signed_key))
    }
}

/// Extract `auth.client_token` from a login response. Anything else —
/// wrong password, locked account, HTML error page — is one
/// authentication failure class.
fn parse_login(status: &reqwest::StatusCode, body: &str) -> Result<String> {
    let parsed: LoginResponse = serde_json::from_str(body)
        .map_err(|_| VaultError::Authentication(format!("unexpected response ({})", status)))?;

    parsed
        .auth
        .and_then(|auth| auth.client_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            VaultError::Authentication(format!(
                "login response carried no client token ({})",
                status
            ))
        })
}

/// Extract `data.signed_key` from an unwrap response. A non-empty
/// `errors` array is the broker refusing the wrapped token: already
/// consumed, expired, or malformed.
fn parse_unwrap(body: &str) -> Result<String> {
    let parsed: UnwrapResponse = serde_json::from_str(body)
        .map_err(|_| VaultError::Unwrap("unexpected response from vault".to_string()))?;

    if !parsed.errors.is_empty() {
        return Err(VaultError::Unwrap(format!(
            "vault refused the wrapped token (already used or expired?): {}",
            parsed.errors.join("; ")
        )));
    }

    parsed
        .data
        .and_then(|data| data.signed_key)
        .ok_or_else(|| VaultError::Unwrap("unwrap response carried no signed key".to_string()))
}
