//! AWS STS credential exchange.
//!
//! This exchange talks to AWS Security Token Service using the official AWS
//! SDK. Unlike the SDK's default loader, it takes its settings from the
//! environment a scope hands it rather than from the process environment:
//!
//! - Region: `AWS_REGION`, then `AWS_DEFAULT_REGION`, then `us-east-1`
//! - Profile: `AWS_PROFILE`, then `AWS_DEFAULT_PROFILE`
//! - Credentials: `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
//!   `AWS_SESSION_TOKEN` when present, otherwise the SDK credential chain
//! - Endpoint: `AWS_ENDPOINT_URL_STS`, then `AWS_ENDPOINT_URL` (for LocalStack)
//!
//! # Example
//!
//! ```no_run
//! use withaws::backends::sts::StsExchange;
//! use withaws::{AuthError, AwsConfig, CredentialScope, Environment};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AuthError> {
//!     let scope = CredentialScope::new(StsExchange::new());
//!     let config = AwsConfig::new()
//!         .with_role("deploy")
//!         .with_role_account("123456789012");
//!
//!     let overrides = scope
//!         .build_overrides(&config, &Environment::from_process())
//!         .await?;
//!     println!("{} variables set", overrides.len());
//!     Ok(())
//! }
//! ```

mod exchange;

pub use exchange::StsExchange;
