// ABOUTME: The certificate issuance workflow: policy check, token acquisition,
// ABOUTME: login, unwrap, persist. Linear state machine with one branch.

use crate::broker::{GrantBroker, IdentityBroker, Prompt, WrappedToken};
use crate::config::{Config, Environment};
use crate::error::Result;
use crate::keys;
use std::path::PathBuf;
use tracing::{debug, info};

/// One request for a signed SSH certificate. Transient; a run produces at
/// most one wrapped token, consumed by exactly one unwrap call.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    /// AWS/LDAP user name of the requester.
    pub user_name: String,
    /// Target environment.
    pub environment: Environment,
    /// Requested certificate TTL in seconds.
    pub ttl: u64,
    /// Path to the requester's SSH public key.
    pub public_key_path: PathBuf,
    /// Path the signed certificate is written to.
    pub output_cert_path: PathBuf,
}

/// Terminal states of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Certificate written to the output path.
    Written { cert_path: PathBuf },
    /// The output file already existed and the requester declined to
    /// overwrite it. Not an error; nothing was modified.
    Declined,
}

/// Run the issuance workflow end to end.
///
/// 1. Policy check (TTL vs ceiling) — before any network activity.
/// 2. Token acquisition: sensitive environments get the human-approved
///    paste path, everything else invokes the grant Lambda under MFA.
/// 3. LDAP login against the identity broker.
/// 4. One-time unwrap of the signed certificate.
/// 5. Persist, with an overwrite confirmation if the file exists.
pub async fn issue<I, G, P>(
    config: &Config,
    request: &IssuanceRequest,
    identity: &I,
    grants: &G,
    prompt: &P,
) -> Result<Outcome>
where
    I: IdentityBroker + Sync,
    G: GrantBroker + Sync,
    P: Prompt + Sync,
{
    config.check_ttl(request.ttl)?;

    let wrapped = if request.environment.is_sensitive() {
        debug!(environment = %request.environment, "sensitive tier, using the human-approved path");
        let public_key = keys::read_public_key(&request.public_key_path)?;
        prompt.show(&approver_instructions(config, request, &public_key));
        let pasted =
            prompt.input("Enter the wrapped token you received back from the approver")?;
        WrappedToken::from_pasted(&pasted)
    } else {
        debug!(environment = %request.environment, "invoking the grant lambda under MFA");
        grants
            .invoke_grant(&request.user_name, request.environment, request.ttl)
            .await?
    };

    let password = prompt.password(&format!(
        "Ready to unwrap the signed certificate. LDAP password for '{}' in '{}'",
        request.user_name, request.environment
    ))?;
    let session = identity
        .login(request.environment, &request.user_name, &password)
        .await?;
    info!(user_name = %request.user_name, "logged in to the identity broker");

    let certificate = identity
        .unwrap_certificate(request.environment, &session, &wrapped)
        .await?;

    if request.output_cert_path.exists() {
        let overwrite = prompt.confirm(
            &format!(
                "'{}' already exists. Overwrite?",
                request.output_cert_path.display()
            ),
            true,
        )?;
        if !overwrite {
            info!("requester declined to overwrite the existing certificate");
            return Ok(Outcome::Declined);
        }
    }

    keys::write_certificate(&request.output_cert_path, certificate.as_bytes())?;
    info!(path = %request.output_cert_path.display(), "signed certificate written");

    Ok(Outcome::Written {
        cert_path: request.output_cert_path.clone(),
    })
}

/// Copyable instruction block for the human approver on the sensitive
/// path: the JSON payload to grant, and a ready-made CLI one-liner for
/// approvers with AWS access. Plain text; colouring is the caller's job.
pub fn approver_instructions(
    config: &Config,
    request: &IssuanceRequest,
    public_key: &str,
) -> String {
    let lambda_arn = &config.environment(request.environment).lambda_arn;
    format!(
        r#"Ask an authorised approver to grant you SSH access.
(The values below are a convenience; the approver may adjust them.)

Your public key on record should match:
  {public_key}

Send them this JSON payload:
{{
    "user_name": "{user_name}",
    "ttl": {ttl}
}}

Or, if they have the AWS CLI set up, this one-liner:
aws --profile=platform_owner lambda invoke --function-name {lambda_arn} --payload "{{\"user_name\": \"{user_name}\", \"ttl\": {ttl}}}" /tmp/grant_outfile && cat /tmp/grant_outfile
"#,
        public_key = public_key,
        user_name = request.user_name,
        ttl = request.ttl,
        lambda_arn = lambda_arn,
    )
}

/// The ssh invocation the requester can run once the certificate is
/// written, using the private key that matches their public key.
pub fn ssh_command(request: &IssuanceRequest) -> String {
    format!(
        "ssh -i {} -i {} \"${{REMOTE_HOST}}\"",
        request.output_cert_path.display(),
        keys::private_key_path(&request.public_key_path).display()
    )
}
