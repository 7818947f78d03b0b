//! Mock credential exchange for testing.
//!
//! This exchange answers from memory, records every call it receives
//! (including the environment it was handed), and supports error injection
//! for testing code that builds scopes.

use crate::{AssumedIdentity, CredentialExchange, Environment, ExchangeError};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A call received by [`MockExchange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCall {
    CallerIdentity {
        env: Environment,
    },
    AssumeRole {
        env: Environment,
        role_arn: String,
        session_name: String,
    },
}

impl ExchangeCall {
    /// The environment the call was made with.
    pub fn env(&self) -> &Environment {
        match self {
            Self::CallerIdentity { env } | Self::AssumeRole { env, .. } => env,
        }
    }
}

/// Mock credential exchange.
///
/// # Example
///
/// ```
/// use withaws::backends::mock::MockExchange;
/// use withaws::{AuthError, AwsConfig, CredentialScope, Environment, ExchangeError};
///
/// #[tokio::main]
/// async fn main() {
///     let mut exchange = MockExchange::new("123456789012");
///     exchange.assume_error = Some(ExchangeError::Service("AccessDenied".to_string()));
///
///     let scope = CredentialScope::new(exchange);
///     let result = scope
///         .build_overrides(&AwsConfig::new().with_role("deploy"), &Environment::new())
///         .await;
///
///     assert!(matches!(result, Err(AuthError::AssumeRoleFailed { .. })));
/// }
/// ```
pub struct MockExchange {
    account: String,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<ExchangeCall>>>,

    /// Error to return from `caller_account()`
    pub identity_error: Option<ExchangeError>,
    /// Error to return from `assume_role()`
    pub assume_error: Option<ExchangeError>,
}

impl MockExchange {
    /// Access key id of every identity handed out.
    pub const ACCESS_KEY_ID: &'static str = "ASIAMOCKACCESSKEY";
    /// Secret access key of every identity handed out.
    pub const SECRET_ACCESS_KEY: &'static str = "mock-secret-access-key";
    /// Session token of every identity handed out.
    pub const SESSION_TOKEN: &'static str = "mock-session-token";
    /// Role id prefix of every assumed-role id handed out.
    pub const ROLE_ID: &'static str = "AROAMOCKROLEID";

    /// Creates a mock whose caller identity belongs to `account`.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            delay: None,
            calls: Arc::new(RwLock::new(Vec::new())),
            identity_error: None,
            assume_error: None,
        }
    }

    /// Makes every call wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All calls received so far, oldest first.
    pub async fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.read().await.clone()
    }

    /// Number of caller-identity lookups received.
    pub async fn identity_calls(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| matches!(call, ExchangeCall::CallerIdentity { .. }))
            .count()
    }

    /// ARNs of every role assumption requested, in order.
    pub async fn assumed_roles(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                ExchangeCall::AssumeRole { role_arn, .. } => Some(role_arn.clone()),
                ExchangeCall::CallerIdentity { .. } => None,
            })
            .collect()
    }

    async fn record(&self, call: ExchangeCall) {
        self.calls.write().await.push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CredentialExchange for MockExchange {
    fn name(&self) -> &str {
        "mock"
    }

    async fn caller_account(&self, env: &Environment) -> Result<String, ExchangeError> {
        self.record(ExchangeCall::CallerIdentity { env: env.clone() })
            .await;

        if let Some(ref err) = self.identity_error {
            return Err(ExchangeError::Service(err.to_string()));
        }
        Ok(self.account.clone())
    }

    async fn assume_role(
        &self,
        env: &Environment,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedIdentity, ExchangeError> {
        self.record(ExchangeCall::AssumeRole {
            env: env.clone(),
            role_arn: role_arn.to_string(),
            session_name: session_name.to_string(),
        })
        .await;

        if let Some(ref err) = self.assume_error {
            return Err(ExchangeError::Service(err.to_string()));
        }
        Ok(AssumedIdentity {
            access_key_id: Self::ACCESS_KEY_ID.to_string(),
            secret_access_key: Self::SECRET_ACCESS_KEY.to_string(),
            session_token: Self::SESSION_TOKEN.to_string(),
            assumed_role_id: format!("{}:{}", Self::ROLE_ID, session_name),
            expiration: Some(Utc::now() + ChronoDuration::hours(1)),
        })
    }
}
