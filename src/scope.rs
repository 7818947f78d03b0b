//! Credential scopes.
//!
//! [`CredentialScope::build_overrides`] turns an [`AwsConfig`] into the
//! variables a nested block should see, assuming a role through the
//! configured [`CredentialExchange`] when asked to.
//! [`CredentialScope::run_scoped`] layers those variables on an ambient
//! [`Environment`] and runs exactly one nested operation with the result.

use crate::env::{
    AWS_ACCESS_KEY_ID, AWS_DEFAULT_PROFILE, AWS_DEFAULT_REGION, AWS_PROFILE, AWS_REGION,
    AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN,
};
use crate::{
    AuthError, AwsConfig, CredentialExchange, Environment, EnvironmentOverrides, ExchangeError,
    Result, ScopeOptions,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the ARN of `role` in `account`.
///
/// ```
/// assert_eq!(
///     withaws::scope::role_arn("123456789012", "deploy"),
///     "arn:aws:iam::123456789012:role/deploy"
/// );
/// ```
pub fn role_arn(account: &str, role: &str) -> String {
    format!("arn:aws:iam::{}:role/{}", account, role)
}

/// Runs nested operations under AWS settings.
///
/// A scope holds no per-invocation state, so one instance can serve any
/// number of sequential, nested or concurrent invocations.
///
/// # Example
///
/// ```
/// use withaws::backends::mock::MockExchange;
/// use withaws::{AuthError, AwsConfig, CredentialScope, Environment};
///
/// #[tokio::main]
/// async fn main() -> Result<(), AuthError> {
///     let scope = CredentialScope::new(MockExchange::new("123456789012"));
///     let config = AwsConfig::new().with_role("deploy").with_region("eu-west-1");
///
///     let region = scope
///         .run_scoped(&config, &Environment::new(), |env| async move {
///             Ok::<_, AuthError>(env.get("AWS_REGION").map(str::to_string))
///         })
///         .await?;
///
///     assert_eq!(region.as_deref(), Some("eu-west-1"));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct CredentialScope {
    exchange: Arc<dyn CredentialExchange>,
    options: ScopeOptions,
}

impl CredentialScope {
    /// Creates a scope with default options.
    pub fn new(exchange: impl CredentialExchange + 'static) -> Self {
        Self::from_arc(Arc::new(exchange))
    }

    /// Creates a scope sharing an existing exchange.
    pub fn from_arc(exchange: Arc<dyn CredentialExchange>) -> Self {
        Self {
            exchange,
            options: ScopeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScopeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// Computes the variables to set for `config`.
    ///
    /// Profile and region are applied first so that the identity lookup and
    /// role assumption run against them. No exchange call is made unless a
    /// role is configured, and the caller-identity lookup is skipped when the
    /// role account is given.
    ///
    /// # Errors
    ///
    /// - [`AuthError::IdentityLookupFailed`]: the account could not be discovered
    /// - [`AuthError::AssumeRoleFailed`]: the role could not be assumed
    pub async fn build_overrides(
        &self,
        config: &AwsConfig,
        ambient: &Environment,
    ) -> Result<EnvironmentOverrides> {
        let mut overrides = EnvironmentOverrides::new();

        if let Some(profile) = config.profile() {
            info!("Setting AWS profile {}", profile);
            overrides.set(AWS_DEFAULT_PROFILE, profile);
            overrides.set(AWS_PROFILE, profile);
        }

        if let Some(region) = config.region() {
            info!("Setting AWS region {}", region);
            overrides.set(AWS_DEFAULT_REGION, region);
            overrides.set(AWS_REGION, region);
        }

        if let Some(role) = config.role() {
            let env = ambient.overlay(&overrides);

            let account = match config.role_account() {
                Some(account) => account.to_string(),
                None => {
                    debug!(exchange = self.exchange.name(), "Looking up caller account");
                    self.bounded(self.exchange.caller_account(&env))
                        .await
                        .map_err(AuthError::identity_lookup)?
                }
            };

            let arn = role_arn(&account, role);
            let session_name = self.options.session_names.session_name();
            debug!(
                exchange = self.exchange.name(),
                session_name = %session_name,
                "Assuming role {}",
                arn
            );

            let identity = self
                .bounded(self.exchange.assume_role(&env, &arn, &session_name))
                .await
                .map_err(|e| AuthError::assume_role(&arn, e))?;

            info!("Assumed role {} with id {}", arn, identity.assumed_role_id);
            if let Some(expiration) = identity.expiration {
                debug!("Credentials for {} expire at {}", arn, expiration);
            }

            overrides.set(AWS_ACCESS_KEY_ID, identity.access_key_id);
            overrides.set(AWS_SECRET_ACCESS_KEY, identity.secret_access_key);
            overrides.set(AWS_SESSION_TOKEN, identity.session_token);
            overrides.set_expiration(identity.expiration);
        }

        Ok(overrides)
    }

    /// Runs `op` with `ambient` plus the overrides computed for `config`.
    ///
    /// `op` is called exactly once, and only if the overrides could be
    /// built. Its output is returned unchanged; a failure to build the
    /// overrides is converted into `E`. Nothing outside the returned value
    /// is modified, so there is nothing to restore when `op` finishes.
    ///
    /// To nest scopes, call `run_scoped` again from inside `op`, passing the
    /// environment `op` received as the new ambient.
    pub async fn run_scoped<F, Fut, T, E>(
        &self,
        config: &AwsConfig,
        ambient: &Environment,
        op: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(Environment) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<AuthError>,
    {
        let overrides = self.build_overrides(config, ambient).await?;
        let effective = ambient.overlay(&overrides);
        debug!(
            overridden = ?overrides.keys().collect::<Vec<_>>(),
            "Running nested operation"
        );
        op(effective).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, ExchangeError>>,
    ) -> std::result::Result<T, ExchangeError> {
        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ExchangeError::TimedOut(limit))?,
            None => call.await,
        }
    }
}
