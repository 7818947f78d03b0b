//! Command-line front end.
//!
//! `withaws exec -- <command>` runs a command under the scope's environment;
//! `withaws env` prints the variables the scope would set.

use crate::backends::sts::StsExchange;
use crate::process::{self, exit_code};
use crate::{
    AwsConfig, CredentialScope, Environment, EnvironmentOverrides, ScopeOptions,
    SessionNamePolicy,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Parser)]
#[command(name = "withaws", version, about = "Run commands with scoped AWS settings and assumed-role credentials", long_about = None)]
pub struct Cli {
    #[arg(short = 'r', long, global = true, env = "WITHAWS_ROLE", help = "IAM role name to assume")]
    pub role: Option<String>,

    #[arg(
        long,
        global = true,
        env = "WITHAWS_ROLE_ACCOUNT",
        help = "Account owning the role (default: account of the current credentials)"
    )]
    pub role_account: Option<String>,

    #[arg(long, global = true, env = "WITHAWS_REGION", help = "AWS region")]
    pub region: Option<String>,

    #[arg(short = 'p', long, global = true, env = "WITHAWS_PROFILE", help = "AWS profile name")]
    pub profile: Option<String>,

    #[arg(
        short = 'c',
        long,
        global = true,
        help = "JSON file with role, roleAccount, region and profile; flags take precedence"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "SECONDS", help = "Give up on each STS call after this many seconds")]
    pub timeout: Option<u64>,

    #[arg(long, global = true, help = "Append a random suffix to the role session name")]
    pub unique_session_name: bool,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v debug, -vv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Run a command with the scoped environment")]
    Exec(ExecCommand),
    #[command(about = "Print the variables the scope sets")]
    Env(EnvCommand),
}

#[derive(Debug, Clone, Args)]
pub struct ExecCommand {
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct EnvCommand {
    #[arg(long, help = "Print JSON instead of shell export statements")]
    pub json: bool,
}

impl Cli {
    pub async fn execute(self) -> Result<ExitCode> {
        let config = self.aws_config().await?;
        config.validate()?;

        let scope = CredentialScope::new(StsExchange::new()).with_options(self.scope_options());
        let ambient = Environment::from_process();

        match self.command {
            Commands::Exec(cmd) => {
                let (program, args) = cmd
                    .command
                    .split_first()
                    .context("No command given")?;

                let status = scope
                    .run_scoped(&config, &ambient, |env| async move {
                        process::run_command(program, args, &env)
                            .await
                            .map_err(anyhow::Error::from)
                    })
                    .await?;

                info!("{} exited with {}", program, status);
                Ok(ExitCode::from(exit_code(status)))
            }
            Commands::Env(cmd) => {
                let overrides = scope.build_overrides(&config, &ambient).await?;
                let output = if cmd.json {
                    serde_json::to_string_pretty(&overrides)
                        .context("Failed to serialize variables")?
                } else {
                    render_exports(&overrides)
                };
                println!("{output}");
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    /// Settings from flags, with unset fields filled from `--config`.
    async fn aws_config(&self) -> Result<AwsConfig> {
        let mut flags = AwsConfig::new();
        if let Some(role) = &self.role {
            flags = flags.with_role(role);
        }
        if let Some(account) = &self.role_account {
            flags = flags.with_role_account(account);
        }
        if let Some(region) = &self.region {
            flags = flags.with_region(region);
        }
        if let Some(profile) = &self.profile {
            flags = flags.with_profile(profile);
        }

        match &self.config {
            Some(path) => Ok(flags.or(load_config_file(path).await?)),
            None => Ok(flags),
        }
    }

    fn scope_options(&self) -> ScopeOptions {
        let mut options = ScopeOptions::new();
        if let Some(secs) = self.timeout {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        if self.unique_session_name {
            options = options.with_session_names(SessionNamePolicy::Unique);
        }
        options
    }
}

async fn load_config_file(path: &Path) -> Result<AwsConfig> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

    AwsConfig::from_json(&contents)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
}

/// Renders overrides as `export KEY='value'` lines for `eval`.
fn render_exports(overrides: &EnvironmentOverrides) -> String {
    overrides
        .iter()
        .map(|(key, value)| format!("export {}={}", key, shell_quote(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_exec_with_flags() {
        let cli = Cli::try_parse_from([
            "withaws",
            "--role",
            "deploy",
            "--role-account",
            "123456789012",
            "--region",
            "eu-west-1",
            "exec",
            "--",
            "aws",
            "s3",
            "ls",
        ])
        .unwrap();

        assert_eq!(cli.role.as_deref(), Some("deploy"));
        assert_eq!(cli.role_account.as_deref(), Some("123456789012"));
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        match cli.command {
            Commands::Exec(cmd) => assert_eq!(cmd.command, vec!["aws", "s3", "ls"]),
            _ => panic!("Expected Exec command"),
        }
    }

    #[test]
    fn test_exec_passes_hyphen_args() {
        let cli = Cli::try_parse_from(["withaws", "exec", "terraform", "plan", "-out=plan"]).unwrap();
        match cli.command {
            Commands::Exec(cmd) => assert_eq!(cmd.command, vec!["terraform", "plan", "-out=plan"]),
            _ => panic!("Expected Exec command"),
        }
    }

    #[test]
    fn test_exec_requires_command() {
        assert!(Cli::try_parse_from(["withaws", "exec"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["withaws", "env", "--json", "--profile", "ci", "-vv"]).unwrap();
        assert_eq!(cli.profile.as_deref(), Some("ci"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Env(cmd) => assert!(cmd.json),
            _ => panic!("Expected Env command"),
        }
    }

    #[test]
    fn test_scope_options_from_flags() {
        let cli = Cli::try_parse_from([
            "withaws",
            "--timeout",
            "15",
            "--unique-session-name",
            "env",
        ])
        .unwrap();

        let options = cli.scope_options();
        assert_eq!(options.timeout, Some(Duration::from_secs(15)));
        assert_eq!(options.session_names, SessionNamePolicy::Unique);
    }

    #[tokio::test]
    async fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"role": "ops", "roleAccount": "123456789012", "region": "us-east-2"}}"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["withaws", "--region", "eu-west-1", "--config", path, "env"])
            .unwrap();

        let config = cli.aws_config().await.unwrap();
        assert_eq!(config.role(), Some("ops"));
        assert_eq!(config.role_account(), Some("123456789012"));
        assert_eq!(config.region(), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["withaws", "--config", "/nonexistent/withaws.json", "env"])
            .unwrap();

        let err = cli.aws_config().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }

    #[test]
    fn test_render_exports() {
        let mut overrides = EnvironmentOverrides::new();
        overrides.set("AWS_REGION", "eu-west-1");
        overrides.set("AWS_PROFILE", "it's");

        assert_eq!(
            render_exports(&overrides),
            "export AWS_PROFILE='it'\\''s'\nexport AWS_REGION='eu-west-1'"
        );
    }
}
