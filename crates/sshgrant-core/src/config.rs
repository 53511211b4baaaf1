// ABOUTME: Environment tags and injected configuration for the issuance workflow.
// ABOUTME: Built-in defaults keyed by environment, with an optional TOML override file.

use crate::error::{Result, WorkflowError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default certificate TTL in seconds (one hour).
pub const DEFAULT_TTL: u64 = 3600;

/// Hard ceiling on the requested TTL in seconds (twelve hours).
pub const MAX_TTL: u64 = 43200;

/// Deployment environments a certificate can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Integration,
    Development,
    Qa,
    Staging,
    Externaltest,
    Production,
}

impl Environment {
    /// All known environments, in promotion order.
    pub const ALL: [Environment; 6] = [
        Environment::Integration,
        Environment::Development,
        Environment::Qa,
        Environment::Staging,
        Environment::Externaltest,
        Environment::Production,
    ];

    /// Lowercase tag as used in CLI flags, config files, and Vault hostnames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Integration => "integration",
            Environment::Development => "development",
            Environment::Qa => "qa",
            Environment::Staging => "staging",
            Environment::Externaltest => "externaltest",
            Environment::Production => "production",
        }
    }

    /// Sensitive tiers carry live traffic and always require a human
    /// approver to mint the wrapped token; the automatic MFA grant path
    /// must never bypass that second person.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Environment::Production | Environment::Externaltest)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Environment::ALL
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown environment '{}' (expected one of: {})",
                    s,
                    Environment::ALL.map(|e| e.as_str()).join(", ")
                )
            })
    }
}

/// Per-environment endpoints and ARNs.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Twelve-digit account ID owning this environment.
    pub account_id: String,
    /// Base URL of the environment's Vault, e.g. `https://vault.tools.qa.example.com`.
    pub vault_addr: String,
    /// ARN of the grant Lambda that mints wrapped tokens.
    pub lambda_arn: String,
    /// ARN of the role assumed (under MFA) to invoke the grant Lambda.
    pub grant_role_arn: String,
}

/// Workflow configuration, injected into every component that needs it.
///
/// Replaces the module-level ARN/account tables of earlier revisions of
/// this tool: everything is constructed once, optionally patched from
/// `~/.config/sshgrant/config.toml`, validated, and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL used when the requester does not pass one explicitly.
    pub default_ttl: u64,
    /// Ceiling on the requested TTL; checked before any network call.
    pub max_ttl: u64,
    /// Duration in seconds of the MFA/assume-role sessions.
    pub session_duration: u64,
    /// AWS region hosting the grant Lambdas.
    pub region: String,
    /// Account holding the IAM users (and their MFA devices).
    pub users_account_id: String,
    environments: Environments,
}

#[derive(Debug, Clone)]
struct Environments {
    integration: EnvironmentConfig,
    development: EnvironmentConfig,
    qa: EnvironmentConfig,
    staging: EnvironmentConfig,
    externaltest: EnvironmentConfig,
    production: EnvironmentConfig,
}

/// Shape of the optional TOML override file. Every field is optional and
/// merges over the built-in defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigOverride {
    default_ttl: Option<u64>,
    max_ttl: Option<u64>,
    session_duration: Option<u64>,
    region: Option<String>,
    users_account_id: Option<String>,
    #[serde(default)]
    environments: BTreeMap<Environment, EnvironmentOverride>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvironmentOverride {
    account_id: Option<String>,
    vault_addr: Option<String>,
    lambda_arn: Option<String>,
    grant_role_arn: Option<String>,
}

const BUILTIN_ACCOUNT_IDS: [(Environment, &str); 6] = [
    (Environment::Integration, "150648916438"),
    (Environment::Development, "618259438944"),
    (Environment::Qa, "248771275994"),
    (Environment::Staging, "186795391298"),
    (Environment::Externaltest, "970278273631"),
    (Environment::Production, "490818658393"),
];

const BUILTIN_USERS_ACCOUNT_ID: &str = "638924580364";
const BUILTIN_REGION: &str = "eu-west-2";
const GRANT_FUNCTION_NAME: &str = "grant-ssh-access";
const GRANT_ROLE_NAME: &str = "RoleGrantSSHAccess";

impl Config {
    /// Built-in defaults. Endpoints are derived from the per-environment
    /// account table; deployments with different addresses patch them via
    /// the override file.
    pub fn builtin() -> Self {
        let entry = |env: Environment| {
            let account_id = BUILTIN_ACCOUNT_IDS
                .iter()
                .find(|(e, _)| *e == env)
                .map(|(_, id)| (*id).to_string())
                .unwrap_or_default();
            EnvironmentConfig {
                vault_addr: format!("https://vault.tools.{}.example.com", env),
                lambda_arn: format!(
                    "arn:aws:lambda:{}:{}:function:{}",
                    BUILTIN_REGION, account_id, GRANT_FUNCTION_NAME
                ),
                grant_role_arn: format!("arn:aws:iam::{}:role/{}", account_id, GRANT_ROLE_NAME),
                account_id,
            }
        };

        Config {
            default_ttl: DEFAULT_TTL,
            max_ttl: MAX_TTL,
            session_duration: DEFAULT_TTL,
            region: BUILTIN_REGION.to_string(),
            users_account_id: BUILTIN_USERS_ACCOUNT_ID.to_string(),
            environments: Environments {
                integration: entry(Environment::Integration),
                development: entry(Environment::Development),
                qa: entry(Environment::Qa),
                staging: entry(Environment::Staging),
                externaltest: entry(Environment::Externaltest),
                production: entry(Environment::Production),
            },
        }
    }

    /// Load configuration: built-in defaults, patched from the given file
    /// if passed, otherwise from the default location if one exists.
    ///
    /// An explicitly passed path must exist; a missing default file just
    /// means the defaults are used as-is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::builtin();

        let contents = match path {
            Some(p) => Some(std::fs::read_to_string(p).map_err(|e| {
                WorkflowError::Config(format!("failed to read {}: {}", p.display(), e))
            })?),
            None => match Self::default_path() {
                Some(p) if p.exists() => Some(std::fs::read_to_string(&p).map_err(|e| {
                    WorkflowError::Config(format!("failed to read {}: {}", p.display(), e))
                })?),
                _ => None,
            },
        };

        if let Some(contents) = contents {
            let overrides: ConfigOverride = toml::from_str(&contents)
                .map_err(|e| WorkflowError::Config(format!("failed to parse config: {}", e)))?;
            config.apply(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    /// Default override file location (~/.config/sshgrant/config.toml).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("sshgrant").join("config.toml"))
    }

    /// Endpoints and ARNs for one environment.
    pub fn environment(&self, env: Environment) -> &EnvironmentConfig {
        match env {
            Environment::Integration => &self.environments.integration,
            Environment::Development => &self.environments.development,
            Environment::Qa => &self.environments.qa,
            Environment::Staging => &self.environments.staging,
            Environment::Externaltest => &self.environments.externaltest,
            Environment::Production => &self.environments.production,
        }
    }

    /// Serial number of the requester's MFA device.
    pub fn mfa_serial(&self, user_name: &str) -> String {
        format!("arn:aws:iam::{}:mfa/{}", self.users_account_id, user_name)
    }

    /// Policy check: the requested TTL must not exceed the ceiling.
    /// Callers run this before any network activity.
    pub fn check_ttl(&self, requested: u64) -> Result<()> {
        if requested > self.max_ttl {
            return Err(WorkflowError::PolicyViolation {
                requested,
                max: self.max_ttl,
            });
        }
        Ok(())
    }

    fn environment_mut(&mut self, env: Environment) -> &mut EnvironmentConfig {
        match env {
            Environment::Integration => &mut self.environments.integration,
            Environment::Development => &mut self.environments.development,
            Environment::Qa => &mut self.environments.qa,
            Environment::Staging => &mut self.environments.staging,
            Environment::Externaltest => &mut self.environments.externaltest,
            Environment::Production => &mut self.environments.production,
        }
    }

    fn apply(&mut self, overrides: ConfigOverride) {
        if let Some(v) = overrides.default_ttl {
            self.default_ttl = v;
        }
        if let Some(v) = overrides.max_ttl {
            self.max_ttl = v;
        }
        if let Some(v) = overrides.session_duration {
            self.session_duration = v;
        }
        if let Some(v) = overrides.region {
            self.region = v;
        }
        if let Some(v) = overrides.users_account_id {
            self.users_account_id = v;
        }
        for (env, patch) in overrides.environments {
            let target = self.environment_mut(env);
            if let Some(v) = patch.account_id {
                target.account_id = v;
            }
            if let Some(v) = patch.vault_addr {
                target.vault_addr = v;
            }
            if let Some(v) = patch.lambda_arn {
                target.lambda_arn = v;
            }
            if let Some(v) = patch.grant_role_arn {
                target.grant_role_arn = v;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default_ttl == 0 {
            return Err(WorkflowError::Config("default_ttl must be non-zero".into()));
        }
        if self.default_ttl > self.max_ttl {
            return Err(WorkflowError::Config(format!(
                "default_ttl ({}) exceeds max_ttl ({})",
                self.default_ttl, self.max_ttl
            )));
        }
        if !is_account_id(&self.users_account_id) {
            return Err(WorkflowError::Config(format!(
                "users_account_id '{}' is not a 12-digit account ID",
                self.users_account_id
            )));
        }
        for env in Environment::ALL {
            let cfg = self.environment(env);
            if !is_account_id(&cfg.account_id) {
                return Err(WorkflowError::Config(format!(
                    "account_id '{}' for {} is not a 12-digit account ID",
                    cfg.account_id, env
                )));
            }
            if !cfg.vault_addr.starts_with("http://") && !cfg.vault_addr.starts_with("https://") {
                return Err(WorkflowError::Config(format!(
                    "vault_addr for {} must be an http(s) URL",
                    env
                )));
            }
            for arn in [&cfg.lambda_arn, &cfg.grant_role_arn] {
                if !arn.starts_with("arn:") {
                    return Err(WorkflowError::Config(format!(
                        "'{}' for {} is not an ARN",
                        arn, env
                    )));
                }
            }
        }
        Ok(())
    }
}

fn is_account_id(s: &str) -> bool {
    s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit())
}
