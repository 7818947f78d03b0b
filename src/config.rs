//! Scope configuration.

use crate::session::SessionNamePolicy;
use crate::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Account ids are always twelve decimal digits.
const ACCOUNT_ID_LENGTH: usize = 12;

/// AWS settings applied to a nested block.
///
/// Every field is optional; unset and empty are treated the same. Use the
/// builder methods or deserialize from JSON:
///
/// ```
/// use withaws::AwsConfig;
///
/// let config = AwsConfig::new()
///     .with_role("deploy")
///     .with_role_account("123456789012")
///     .with_region("eu-west-1");
///
/// let parsed = AwsConfig::from_json(
///     r#"{"role": "deploy", "roleAccount": "123456789012", "region": "eu-west-1"}"#,
/// ).unwrap();
///
/// assert_eq!(config, parsed);
/// assert_eq!(config.profile(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl AwsConfig {
    /// Creates a configuration with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object with the keys `role`, `roleAccount`, `region`
    /// and `profile`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::Configuration(format!("malformed configuration: {}", e)))
    }

    /// Sets the IAM role name to assume.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the account owning the role.
    ///
    /// When unset, the account of the ambient credentials is used.
    pub fn with_role_account(mut self, account: impl Into<String>) -> Self {
        self.role_account = Some(account.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Fills every unset field of `self` from `fallback`.
    pub fn or(self, fallback: AwsConfig) -> Self {
        let pick = |a: Option<String>, b: Option<String>| {
            if non_empty(&a).is_some() {
                a
            } else {
                b
            }
        };
        Self {
            role: pick(self.role, fallback.role),
            role_account: pick(self.role_account, fallback.role_account),
            region: pick(self.region, fallback.region),
            profile: pick(self.profile, fallback.profile),
        }
    }

    pub fn role(&self) -> Option<&str> {
        non_empty(&self.role)
    }

    pub fn role_account(&self) -> Option<&str> {
        non_empty(&self.role_account)
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    pub fn profile(&self) -> Option<&str> {
        non_empty(&self.profile)
    }

    /// Applies the stricter checks that scope building itself skips.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if a set field is only whitespace
    /// or the role account is not a twelve-digit account id.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("role", self.role()),
            ("roleAccount", self.role_account()),
            ("region", self.region()),
            ("profile", self.profile()),
        ];
        for (name, value) in fields {
            if value.is_some_and(|v| v.trim().is_empty()) {
                return Err(AuthError::Configuration(format!("{} is blank", name)));
            }
        }

        if let Some(account) = self.role_account() {
            if account.len() != ACCOUNT_ID_LENGTH || !account.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AuthError::Configuration(format!(
                    "roleAccount must be a {}-digit account id, got '{}'",
                    ACCOUNT_ID_LENGTH, account
                )));
            }
        }

        Ok(())
    }
}

/// Options controlling how a scope talks to the credential exchange.
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    /// Upper bound on each exchange call (default: none).
    pub timeout: Option<Duration>,

    /// Session name generation (default: timestamp).
    pub session_names: SessionNamePolicy,
}

impl ScopeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_session_names(mut self, policy: SessionNamePolicy) -> Self {
        self.session_names = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AwsConfig::new()
            .with_role("deploy")
            .with_role_account("123456789012")
            .with_region("eu-west-1")
            .with_profile("ci");

        assert_eq!(config.role(), Some("deploy"));
        assert_eq!(config.role_account(), Some("123456789012"));
        assert_eq!(config.region(), Some("eu-west-1"));
        assert_eq!(config.profile(), Some("ci"));
    }

    #[test]
    fn test_empty_is_unset() {
        let config = AwsConfig::new().with_role("").with_region("");
        assert_eq!(config.role(), None);
        assert_eq!(config.region(), None);
    }

    #[test]
    fn test_from_json_camel_case() {
        let config = AwsConfig::from_json(r#"{"roleAccount": "210987654321"}"#).unwrap();
        assert_eq!(config.role_account(), Some("210987654321"));
        assert_eq!(config.role(), None);
    }

    #[test]
    fn test_from_json_malformed() {
        let err = AwsConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_or_prefers_set_fields() {
        let flags = AwsConfig::new().with_region("eu-west-1").with_profile("");
        let file = AwsConfig::new()
            .with_region("us-east-2")
            .with_profile("shared")
            .with_role("ops");

        let merged = flags.or(file);
        assert_eq!(merged.region(), Some("eu-west-1"));
        assert_eq!(merged.profile(), Some("shared"));
        assert_eq!(merged.role(), Some("ops"));
    }

    #[test]
    fn test_validate() {
        assert!(AwsConfig::new().validate().is_ok());
        assert!(AwsConfig::new()
            .with_role("deploy")
            .with_role_account("123456789012")
            .validate()
            .is_ok());

        assert!(AwsConfig::new().with_role_account("1234").validate().is_err());
        assert!(AwsConfig::new()
            .with_role_account("12345678901x")
            .validate()
            .is_err());
        assert!(AwsConfig::new().with_region("   ").validate().is_err());
    }

    #[test]
    fn test_scope_options_builder() {
        let options = ScopeOptions::new()
            .with_timeout(Duration::from_secs(10))
            .with_session_names(SessionNamePolicy::Unique);

        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.session_names, SessionNamePolicy::Unique);
        assert_eq!(ScopeOptions::default().timeout, None);
    }
}
