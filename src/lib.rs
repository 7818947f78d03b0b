//! withaws - run code under scoped AWS settings and assumed-role credentials.
//!
//! Given an optional role, role account, region and profile, withaws computes
//! the `AWS_*` variables a block of work should see, assuming the role through
//! STS when one is configured, and runs that block with them. The variables
//! exist only in the environment value handed to the block: the process
//! environment is never modified, so scopes nest and run concurrently without
//! interfering.
//!
//! # Features
//!
//! - **Scoped**: overrides live exactly as long as the nested operation
//! - **Nestable**: inner scopes layer onto the outer scope's environment
//! - **Fail fast**: credential errors abort before the nested operation starts
//! - **Pass-through**: the nested operation's own result is returned unchanged
//!
//! # Quick Start
//!
//! ```no_run
//! use withaws::AwsConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AwsConfig::new()
//!         .with_role("deploy")
//!         .with_role_account("123456789012")
//!         .with_region("eu-west-1");
//!
//!     let aws_vars = withaws::run_scoped(&config, |env| async move {
//!         // `env` carries AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY,
//!         // AWS_SESSION_TOKEN, AWS_REGION and AWS_DEFAULT_REGION.
//!         anyhow::Ok(env.iter().filter(|(k, _)| k.starts_with("AWS_")).count())
//!     })
//!     .await?;
//!
//!     println!("{} AWS variables in scope", aws_vars);
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Provides |
//! |---------|---------|----------|
//! | `aws` | yes | [`backends::sts::StsExchange`], [`run_scoped`], the `withaws` binary |
//! | `mock` | yes | [`backends::mock::MockExchange`] for tests |

pub mod backends;
#[cfg(feature = "aws")]
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod exchange;
pub mod process;
pub mod scope;
pub mod session;

pub use config::{AwsConfig, ScopeOptions};
pub use env::{Environment, EnvironmentOverrides};
pub use error::{AuthError, CommandError, ExchangeError, Result};
pub use exchange::{AssumedIdentity, CredentialExchange};
pub use scope::CredentialScope;
pub use session::SessionNamePolicy;

/// Runs `op` under `config` against AWS STS, using the current process
/// environment as the ambient environment.
///
/// See [`CredentialScope::run_scoped`] for the exact semantics.
#[cfg(feature = "aws")]
pub async fn run_scoped<F, Fut, T, E>(config: &AwsConfig, op: F) -> std::result::Result<T, E>
where
    F: FnOnce(Environment) -> Fut,
    Fut: std::future::Future<Output = std::result::Result<T, E>>,
    E: From<AuthError>,
{
    CredentialScope::new(backends::sts::StsExchange::new())
        .run_scoped(config, &Environment::from_process(), op)
        .await
}
