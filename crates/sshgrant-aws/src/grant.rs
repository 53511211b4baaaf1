// ABOUTME: Grant Lambda invocation: mints a wrapped token under elevated credentials.
// ABOUTME: Implements sshgrant-core's GrantBroker for non-sensitive environments.

use crate::error::{GrantError, Result};
use crate::mfa;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lambda::config::Credentials;
use aws_sdk_lambda::primitives::Blob;
use serde::{Deserialize, Serialize};
use sshgrant_core::broker::{GrantBroker, Prompt, WrappedToken};
use sshgrant_core::config::{Config, Environment};
use tracing::debug;

/// Structured request the grant Lambda expects. TTL is canonically an
/// integer number of seconds.
#[derive(Serialize)]
struct GrantRequest<'a> {
    user_name: &'a str,
    ttl: u64,
}

#[derive(Deserialize)]
struct GrantResponse {
    token: Option<String>,
    error: Option<String>,
}

/// Grant broker backed by the environment's grant Lambda.
///
/// `invoke_grant` prompts for a fresh MFA code, chains it into elevated
/// credentials, and makes one Lambda invocation. Any response that is
/// not `{"token": ...}` is a fatal, non-retryable failure.
pub struct GrantClient<P> {
    config: Config,
    prompt: P,
}

impl<P: Prompt + Send + Sync> GrantClient<P> {
    pub fn new(config: Config, prompt: P) -> Self {
        GrantClient { config, prompt }
    }
}

#[async_trait]
impl<P: Prompt + Send + Sync> GrantBroker for GrantClient<P> {
    async fn invoke_grant(
        &self,
        user_name: &str,
        environment: Environment,
        ttl: u64,
    ) -> sshgrant_core::Result<WrappedToken> {
        let mfa_code = self.prompt.input("Enter AWS MFA code")?;
        let elevated =
            mfa::elevated_credentials(&self.config, environment, user_name, mfa_code.trim())
                .await?;

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .load()
            .await;
        let conf = aws_sdk_lambda::config::Builder::from(&shared)
            .credentials_provider(Credentials::new(
                elevated.access_key_id.clone(),
                elevated.secret_access_key.clone(),
                Some(elevated.session_token.clone()),
                None,
                "sshgrant-grant-role",
            ))
            .build();
        let lambda = aws_sdk_lambda::Client::from_conf(conf);

        let lambda_arn = &self.config.environment(environment).lambda_arn;
        let payload = serde_json::to_vec(&GrantRequest { user_name, ttl })
            .map_err(|e| GrantError::Invoke(e.to_string()))?;

        debug!(environment = %environment, "invoking the grant lambda");
        let output = lambda
            .invoke()
            .function_name(lambda_arn)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| GrantError::Invoke(e.to_string()))?;

        if let Some(function_error) = output.function_error() {
            return Err(GrantError::Invoke(format!(
                "lambda reported a function error: {}",
                function_error
            ))
            .into());
        }

        let response = output
            .payload()
            .ok_or_else(|| GrantError::InvalidResponse("empty payload".to_string()))?;
        let token = parse_grant_response(response.as_ref())?;
        Ok(WrappedToken::new(token))
    }
}

/// Parse the Lambda's structured response. `{"token": ...}` is the only
/// success shape; an `{"error": ...}` payload is the grant being denied
/// and anything else is malformed — both fatal.
fn parse_grant_response(payload: &[u8]) -> Result<String> {
    let parsed: GrantResponse = serde_json::from_slice(payload).map_err(|_| {
        GrantError::InvalidResponse(String::from_utf8_lossy(payload).into_owned())
    })?;

    if let Some(token) = parsed.token.filter(|t| !t.is_empty()) {
        return Ok(token);
    }
    match parsed.error {
        Some(details) => Err(GrantError::InvalidResponse(details)),
        None => Err(GrantError::InvalidResponse(
            String::from_utf8_lossy(payload).into_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grant_response_token() {
        let token = parse_grant_response(br#"{"token":"s.CMIPnk3wZS8kdWeKYBlYR5fM"}"#)
            .expect("should parse token response");
        assert_eq!(token, "s.CMIPnk3wZS8kdWeKYBlYR5fM");
    }

    #[test]
    fn test_parse_grant_response_error_field() {
        let err = parse_grant_response(br#"{"error": "an error occurred"}"#).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "invalid response from lambda: an error occurred"
        );
    }

    #[test]
    fn test_parse_grant_response_malformed_payload() {
        let err = parse_grant_response(b"Internal Server Error").unwrap_err();
        let display = format!("{}", err);
        assert!(display.contains("invalid response from lambda"));
        assert!(display.contains("Internal Server Error"));
    }

    #[test]
    fn test_parse_grant_response_unrelated_json() {
        let err = parse_grant_response(br#"{"statusCode": 500}"#).unwrap_err();
        assert!(format!("{}", err).contains("invalid response from lambda"));
    }

    #[test]
    fn test_grant_request_serialises_ttl_as_integer() {
        let payload = serde_json::to_string(&GrantRequest {
            user_name: "alice",
            ttl: 3600,
        })
        .expect("should serialise");
        assert_eq!(payload, r#"{"user_name":"alice","ttl":3600}"#);
    }
}
