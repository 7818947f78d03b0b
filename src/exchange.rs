//! Credential exchange trait.
//!
//! A [`CredentialExchange`] is the only part of a scope that talks to the
//! network. Both calls receive the environment the scope has computed so far,
//! so an implementation can pick up the region and profile set by the
//! enclosing configuration instead of reading the process environment.

use crate::{Environment, ExchangeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Temporary credentials returned by a role assumption.
///
/// Only lives long enough to be copied into a scope's overrides.
#[derive(Clone, PartialEq, Eq)]
pub struct AssumedIdentity {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// Role id and session name, e.g. `AROA3XFRBF535PLBIFPI4:Jenkins-1700000000123`
    pub assumed_role_id: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl fmt::Debug for AssumedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssumedIdentity")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("assumed_role_id", &self.assumed_role_id)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Identity and role-assumption service used to build scopes.
///
/// All implementations must be `Send + Sync` so one exchange can serve
/// concurrent scopes on separate tasks.
///
/// # Implementations
///
/// - [`StsExchange`](crate::backends::sts::StsExchange): AWS STS via the SDK
/// - [`MockExchange`](crate::backends::mock::MockExchange): in-memory, with
///   error injection and call recording
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Returns the exchange name (e.g., "sts", "mock").
    fn name(&self) -> &str;

    /// Returns the account id of the credentials active in `env`.
    async fn caller_account(&self, env: &Environment) -> Result<String, ExchangeError>;

    /// Exchanges the credentials active in `env` for temporary credentials
    /// of `role_arn`.
    async fn assume_role(
        &self,
        env: &Environment,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedIdentity, ExchangeError>;
}
