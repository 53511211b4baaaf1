// ABOUTME: Integration tests for the issuance workflow using scripted fakes.
// ABOUTME: Covers policy, both token paths, unwrap flow, and persistence rules.

use async_trait::async_trait;
use sshgrant_core::broker::{
    GrantBroker, IdentityBroker, Prompt, SessionToken, SignedCertificate, WrappedToken,
};
use sshgrant_core::config::{Config, Environment, MAX_TTL};
use sshgrant_core::error::{Result, WorkflowError};
use sshgrant_core::workflow::{self, IssuanceRequest, Outcome};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

// ============================================================================
// Fakes
// ============================================================================

struct FakeIdentityBroker {
    signed_key: String,
    login_calls: Mutex<Vec<(Environment, String)>>,
    unwrap_calls: Mutex<Vec<String>>,
}

impl FakeIdentityBroker {
    fn new(signed_key: &str) -> Self {
        FakeIdentityBroker {
            signed_key: signed_key.to_string(),
            login_calls: Mutex::new(Vec::new()),
            unwrap_calls: Mutex::new(Vec::new()),
        }
    }

    fn network_calls(&self) -> usize {
        self.login_calls.lock().unwrap().len() + self.unwrap_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityBroker for FakeIdentityBroker {
    async fn login(
        &self,
        environment: Environment,
        user_name: &str,
        _password: &str,
    ) -> Result<SessionToken> {
        self.login_calls
            .lock()
            .unwrap()
            .push((environment, user_name.to_string()));
        Ok(SessionToken::new("vault-token"))
    }

    async fn unwrap_certificate(
        &self,
        _environment: Environment,
        session: &SessionToken,
        wrapped: &WrappedToken,
    ) -> Result<SignedCertificate> {
        assert_eq!(session.as_str(), "vault-token", "unwrap must reuse the login session");
        self.unwrap_calls
            .lock()
            .unwrap()
            .push(wrapped.as_str().to_string());
        Ok(SignedCertificate::new(self.signed_key.clone()))
    }
}

struct FakeGrantBroker {
    response: std::result::Result<String, String>,
    calls: Mutex<Vec<(String, Environment, u64)>>,
}

impl FakeGrantBroker {
    fn token(token: &str) -> Self {
        FakeGrantBroker {
            response: Ok(token.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn error(details: &str) -> Self {
        FakeGrantBroker {
            response: Err(details.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GrantBroker for FakeGrantBroker {
    async fn invoke_grant(
        &self,
        user_name: &str,
        environment: Environment,
        ttl: u64,
    ) -> Result<WrappedToken> {
        self.calls
            .lock()
            .unwrap()
            .push((user_name.to_string(), environment, ttl));
        match &self.response {
            Ok(token) => Ok(WrappedToken::new(token.clone())),
            Err(details) => Err(WorkflowError::Grant(format!(
                "invalid response from lambda: {}",
                details
            ))),
        }
    }
}

struct ScriptedPrompt {
    inputs: Mutex<Vec<String>>,
    confirm_answer: bool,
    shown: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    fn new(inputs: &[&str], confirm_answer: bool) -> Self {
        ScriptedPrompt {
            inputs: Mutex::new(inputs.iter().rev().map(|s| s.to_string()).collect()),
            confirm_answer,
            shown: Mutex::new(Vec::new()),
        }
    }

    fn shown_text(&self) -> String {
        self.shown.lock().unwrap().join("\n")
    }
}

impl Prompt for ScriptedPrompt {
    fn show(&self, text: &str) {
        self.shown.lock().unwrap().push(text.to_string());
    }

    fn input(&self, _prompt: &str) -> Result<String> {
        self.inputs
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| WorkflowError::Prompt("no scripted input left".to_string()))
    }

    fn password(&self, _prompt: &str) -> Result<String> {
        Ok("toor".to_string())
    }

    fn confirm(&self, _prompt: &str, _default_yes: bool) -> Result<bool> {
        Ok(self.confirm_answer)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    _dir: TempDir,
    request: IssuanceRequest,
}

fn fixture(environment: Environment, ttl: u64) -> Fixture {
    let dir = TempDir::new().expect("should create temp dir");
    let public_key_path = dir.path().join("id_rsa.pub");
    std::fs::write(&public_key_path, "ssh-rsa AAA alice@laptop\n")
        .expect("should write public key");

    let request = IssuanceRequest {
        user_name: "alice".to_string(),
        environment,
        ttl,
        public_key_path,
        output_cert_path: dir.path().join("id_rsa-cert.pub"),
    };
    Fixture { _dir: dir, request }
}

// ============================================================================
// Policy
// ============================================================================

#[tokio::test]
async fn test_ttl_over_ceiling_fails_before_any_network_call() {
    let config = Config::builtin();
    let fx = fixture(Environment::Integration, MAX_TTL + 1);
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.wrapped");
    let prompt = ScriptedPrompt::new(&[], true);

    let err = workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::PolicyViolation { .. }));
    assert_eq!(identity.network_calls(), 0, "no broker call before the policy check");
    assert_eq!(grants.call_count(), 0, "no grant call before the policy check");
}

#[tokio::test]
async fn test_ttl_at_ceiling_is_allowed() {
    let config = Config::builtin();
    let fx = fixture(Environment::Integration, MAX_TTL);
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.wrapped");
    let prompt = ScriptedPrompt::new(&[], true);

    let outcome = workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .expect("issuance at the ceiling should succeed");
    assert!(matches!(outcome, Outcome::Written { .. }));
}

// ============================================================================
// Automatic grant path (non-sensitive environments)
// ============================================================================

#[tokio::test]
async fn test_grant_token_flows_unchanged_into_unwrap() {
    let config = Config::builtin();
    let fx = fixture(Environment::Integration, 3600);
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.CMIPnk3wZS8kdWeKYBlYR5fM");
    let prompt = ScriptedPrompt::new(&[], true);

    workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .expect("issuance should succeed");

    assert_eq!(
        *grants.calls.lock().unwrap(),
        vec![("alice".to_string(), Environment::Integration, 3600)]
    );
    assert_eq!(
        *identity.unwrap_calls.lock().unwrap(),
        vec!["s.CMIPnk3wZS8kdWeKYBlYR5fM".to_string()]
    );
}

#[tokio::test]
async fn test_lambda_error_payload_is_fatal() {
    let config = Config::builtin();
    let fx = fixture(Environment::Development, 3600);
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::error("an error occurred");
    let prompt = ScriptedPrompt::new(&[], true);

    let err = workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .unwrap_err();

    assert!(format!("{}", err).contains("invalid response from lambda"));
    assert_eq!(identity.network_calls(), 0, "no login after a failed grant");
    assert!(!fx.request.output_cert_path.exists());
}

// ============================================================================
// Human-approved path (sensitive environments)
// ============================================================================

#[tokio::test]
async fn test_sensitive_environment_uses_paste_path_and_trims_token() {
    let config = Config::builtin();
    let fx = fixture(Environment::Production, 3600);
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.unused");
    let prompt = ScriptedPrompt::new(&[" 's.wrapped_token' "], true);

    workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .expect("issuance should succeed");

    assert_eq!(grants.call_count(), 0, "sensitive tiers never invoke the grant lambda");
    assert_eq!(
        *identity.unwrap_calls.lock().unwrap(),
        vec!["s.wrapped_token".to_string()]
    );

    let shown = prompt.shown_text();
    assert!(shown.contains("\"user_name\": \"alice\""));
    assert!(shown.contains("\"ttl\": 3600"));
    assert!(shown.contains("ssh-rsa AAA"), "approver sees the cleaned public key");
    assert!(shown.contains(&config.environment(Environment::Production).lambda_arn));
}

#[tokio::test]
async fn test_sensitive_path_fails_without_public_key() {
    let config = Config::builtin();
    let mut fx = fixture(Environment::Production, 3600);
    fx.request.public_key_path = PathBuf::from("/nonexistent/id_rsa.pub");
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.unused");
    let prompt = ScriptedPrompt::new(&["s.wrapped"], true);

    let err = workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::ReadPublicKey { .. }));
    assert_eq!(identity.network_calls(), 0);
}

// ============================================================================
// Unwrap and persistence
// ============================================================================

#[tokio::test]
async fn test_happy_path_writes_signed_key_verbatim() {
    let config = Config::builtin();
    let fx = fixture(Environment::Integration, 3600);
    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.wrapped_token");
    let prompt = ScriptedPrompt::new(&[], true);

    let outcome = workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .expect("issuance should succeed");

    assert_eq!(
        outcome,
        Outcome::Written {
            cert_path: fx.request.output_cert_path.clone()
        }
    );
    let written = std::fs::read(&fx.request.output_cert_path).expect("should read certificate");
    assert_eq!(written, b"signed_key", "certificate bytes are written verbatim");
}

#[tokio::test]
async fn test_decline_overwrite_leaves_existing_file_untouched() {
    let config = Config::builtin();
    let fx = fixture(Environment::Integration, 3600);
    std::fs::write(&fx.request.output_cert_path, "previous certificate")
        .expect("should write existing certificate");

    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.wrapped_token");
    let prompt = ScriptedPrompt::new(&[], false);

    let outcome = workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .expect("declining is not an error");

    assert_eq!(outcome, Outcome::Declined);
    let contents = std::fs::read(&fx.request.output_cert_path).expect("should read certificate");
    assert_eq!(contents, b"previous certificate");
}

#[tokio::test]
async fn test_accepted_overwrite_replaces_existing_file() {
    let config = Config::builtin();
    let fx = fixture(Environment::Integration, 3600);
    std::fs::write(&fx.request.output_cert_path, "previous certificate")
        .expect("should write existing certificate");

    let identity = FakeIdentityBroker::new("signed_key");
    let grants = FakeGrantBroker::token("s.wrapped_token");
    let prompt = ScriptedPrompt::new(&[], true);

    workflow::issue(&config, &fx.request, &identity, &grants, &prompt)
        .await
        .expect("issuance should succeed");

    let contents = std::fs::read(&fx.request.output_cert_path).expect("should read certificate");
    assert_eq!(contents, b"signed_key");
}
