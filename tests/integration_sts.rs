//! STS integration tests using LocalStack.
//!
//! These tests require LocalStack to be running on localhost:4566.
//!
//! Run with:
//!   docker run -d -p 4566:4566 localstack/localstack
//!   cargo test --test integration_sts --features aws -- --ignored
//!
//! Or run in CI where LocalStack is configured as a service.

#![cfg(feature = "aws")]

use withaws::backends::sts::StsExchange;
use withaws::{AuthError, AwsConfig, CredentialExchange, CredentialScope, Environment};

/// LocalStack's default account.
const LOCALSTACK_ACCOUNT: &str = "000000000000";

fn ambient() -> Environment {
    let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4566".to_string());

    Environment::new()
        .with_var("AWS_ACCESS_KEY_ID", "test")
        .with_var("AWS_SECRET_ACCESS_KEY", "test")
        .with_var("AWS_ENDPOINT_URL", endpoint)
}

#[tokio::test]
#[ignore] // Run only when LocalStack is available
async fn test_sts_caller_account() {
    let account = StsExchange::new()
        .caller_account(&ambient())
        .await
        .expect("Failed to look up caller identity");

    assert_eq!(account, LOCALSTACK_ACCOUNT);
}

#[tokio::test]
#[ignore]
async fn test_sts_scope_with_discovered_account() {
    let scope = CredentialScope::new(StsExchange::new());
    let config = AwsConfig::new().with_role("deploy").with_region("eu-west-1");

    let env = scope
        .run_scoped(&config, &ambient(), |env| async move { Ok::<_, AuthError>(env) })
        .await
        .expect("Failed to build scope");

    assert_eq!(env.get("AWS_REGION"), Some("eu-west-1"));
    assert_ne!(env.get("AWS_ACCESS_KEY_ID"), Some("test"));
    assert!(env.get("AWS_SESSION_TOKEN").is_some());
}

#[tokio::test]
#[ignore]
async fn test_sts_unreachable_endpoint() {
    let scope = CredentialScope::new(StsExchange::new().with_endpoint("http://127.0.0.1:9"));
    let config = AwsConfig::new().with_role("deploy");

    let result = scope.build_overrides(&config, &ambient()).await;

    assert!(matches!(result, Err(AuthError::IdentityLookupFailed { .. })));
}
