//! Error types for credential scoping.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`AuthError`].
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors raised while building a credential scope.
///
/// None of these is ever raised after the nested operation has started:
/// a scope either fails before running its operation, or reports the
/// operation's own outcome unchanged.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The scope configuration is malformed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The caller-identity query used to discover the target account failed.
    #[error("caller identity lookup failed: {source}")]
    IdentityLookupFailed {
        /// Underlying exchange error
        #[source]
        source: ExchangeError,
    },

    /// The role-assumption exchange failed.
    #[error("failed to assume role {role_arn}: {source}")]
    AssumeRoleFailed {
        /// ARN of the role that was requested
        role_arn: String,
        /// Underlying exchange error
        #[source]
        source: ExchangeError,
    },
}

impl AuthError {
    /// Wraps an exchange error as a failed caller-identity lookup.
    pub fn identity_lookup(source: ExchangeError) -> Self {
        Self::IdentityLookupFailed { source }
    }

    /// Wraps an exchange error as a failed role assumption.
    ///
    /// # Example
    ///
    /// ```
    /// use withaws::{AuthError, ExchangeError};
    ///
    /// let err = AuthError::assume_role(
    ///     "arn:aws:iam::123456789012:role/deploy",
    ///     ExchangeError::Service("AccessDenied".to_string()),
    /// );
    ///
    /// assert_eq!(
    ///     err.to_string(),
    ///     "failed to assume role arn:aws:iam::123456789012:role/deploy: AccessDenied"
    /// );
    /// ```
    pub fn assume_role(role_arn: impl Into<String>, source: ExchangeError) -> Self {
        Self::AssumeRoleFailed {
            role_arn: role_arn.into(),
            source,
        }
    }
}

/// Errors reported by a [`CredentialExchange`](crate::CredentialExchange).
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The service rejected the request or could not be reached.
    #[error("{0}")]
    Service(String),

    /// The service answered without a required field.
    #[error("response is missing {0}")]
    MissingField(&'static str),

    /// The exchange did not complete within the scope's timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while running a child process under a scope.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be found.
    #[error("command not found: {0}")]
    NotFound(String),

    /// The program could not be started or waited on.
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
