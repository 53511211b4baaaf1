// ABOUTME: Entry point for the sshgrant certificate request tool.
// ABOUTME: Parses flags, builds the issuance request, and hands off to the library.

use anyhow::Result;
use clap::Parser;
use sshgrant_core::config::{Environment, DEFAULT_TTL};
use sshgrant_core::workflow::IssuanceRequest;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sshgrant")]
#[command(about = "Request a Vault-signed SSH certificate for logging in to EC2")]
#[command(version)]
struct Cli {
    /// AWS/LDAP user name of the requester
    #[arg(long)]
    user_name: String,

    /// Target environment (integration, development, qa, staging,
    /// externaltest, production)
    #[arg(long)]
    environment: Environment,

    /// Path to the SSH public key to present to the approver
    #[arg(long, default_value_os_t = sshgrant_cli::default_public_key_path())]
    ssh_public_key: PathBuf,

    /// Path to write the signed certificate to
    #[arg(long, default_value_os_t = sshgrant_cli::default_cert_path())]
    output_ssh_cert: PathBuf,

    /// Requested certificate TTL in seconds (ceiling: 12 hours)
    #[arg(long, default_value_t = DEFAULT_TTL)]
    ttl: u64,

    /// Config override file (default: ~/.config/sshgrant/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    sshgrant_log::init();

    let cli = Cli::parse();
    let request = IssuanceRequest {
        user_name: cli.user_name,
        environment: cli.environment,
        ttl: cli.ttl,
        public_key_path: cli.ssh_public_key,
        output_cert_path: cli.output_ssh_cert,
    };

    sshgrant_cli::run(request, cli.config.as_deref()).await
}
