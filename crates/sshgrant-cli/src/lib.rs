// ABOUTME: Library side of the sshgrant binary: wiring and terminal output.
// ABOUTME: Builds the brokers, runs the workflow, prints the result.

use anyhow::{Context, Result};
use colored::Colorize;
use sshgrant_aws::GrantClient;
use sshgrant_core::config::Config;
use sshgrant_core::workflow::{self, IssuanceRequest, Outcome};
use sshgrant_vault::VaultClient;
use std::path::{Path, PathBuf};

pub mod prompt;

use prompt::TermPrompt;

/// Default public key location (~/.ssh/id_rsa.pub).
pub fn default_public_key_path() -> PathBuf {
    ssh_dir().join("id_rsa.pub")
}

/// Default certificate output location (~/.ssh/id_rsa-cert.pub).
pub fn default_cert_path() -> PathBuf {
    ssh_dir().join("id_rsa-cert.pub")
}

fn ssh_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".ssh")
}

/// Run one issuance request end to end and print the outcome.
pub async fn run(request: IssuanceRequest, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path).context("failed to load configuration")?;

    println!("{}", "Requesting a signed SSH certificate".bold());
    println!("  User:        {}", request.user_name);
    println!(
        "  Environment: {} ({})",
        request.environment,
        if request.environment.is_sensitive() {
            "requires a human approver"
        } else {
            "automatic grant under MFA"
        }
    );
    println!("  TTL:         {}s", request.ttl);
    println!();

    let term = TermPrompt::new();
    let vault = VaultClient::new(config.clone()).context("failed to build the vault client")?;
    let grants = GrantClient::new(config.clone(), term.clone());

    match workflow::issue(&config, &request, &vault, &grants, &term).await? {
        Outcome::Written { cert_path } => {
            println!();
            println!("{}", "Signed certificate written!".green().bold());
            println!("  Certificate: {}", cert_path.display());
            println!();
            println!("You are now authorised to log in with:");
            println!("  {}", workflow::ssh_command(&request).cyan());
        }
        Outcome::Declined => {
            println!(
                "{} Left '{}' untouched.",
                "!".yellow().bold(),
                request.output_cert_path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_live_under_dot_ssh() {
        assert!(default_public_key_path().ends_with(".ssh/id_rsa.pub"));
        assert!(default_cert_path().ends_with(".ssh/id_rsa-cert.pub"));
    }
}
