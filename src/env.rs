//! Immutable environment values and the overrides layered onto them.
//!
//! A scope never writes to the process environment. It reads an ambient
//! [`Environment`] once, computes [`EnvironmentOverrides`], and hands the
//! merged result to the nested operation by value. Nesting is just another
//! overlay on top of the outer scope's effective environment.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Access key id of the active credentials.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// Secret access key of the active credentials.
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Session token of temporary credentials.
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
/// Region read by older SDKs and the AWS CLI.
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
/// Region read by current SDKs.
pub const AWS_REGION: &str = "AWS_REGION";
/// Profile read by older SDKs.
pub const AWS_DEFAULT_PROFILE: &str = "AWS_DEFAULT_PROFILE";
/// Profile read by current SDKs and the AWS CLI.
pub const AWS_PROFILE: &str = "AWS_PROFILE";
/// Endpoint override for STS only.
pub const AWS_ENDPOINT_URL_STS: &str = "AWS_ENDPOINT_URL_STS";
/// Endpoint override for every service.
pub const AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";

const REDACTED: &str = "<redacted>";

fn is_secret(key: &str) -> bool {
    key == AWS_SECRET_ACCESS_KEY || key == AWS_SESSION_TOKEN
}

/// An immutable, key-ordered set of environment variables.
///
/// # Example
///
/// ```
/// use withaws::{Environment, EnvironmentOverrides};
///
/// let ambient = Environment::new()
///     .with_var("HOME", "/home/ci")
///     .with_var("AWS_REGION", "us-east-1");
///
/// let mut overrides = EnvironmentOverrides::new();
/// overrides.set("AWS_REGION", "eu-west-1");
///
/// let effective = ambient.overlay(&overrides);
/// assert_eq!(effective.get("AWS_REGION"), Some("eu-west-1"));
/// assert_eq!(effective.get("HOME"), Some("/home/ci"));
/// assert_eq!(ambient.get("AWS_REGION"), Some("us-east-1"));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Returns a copy of this environment with one variable set.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Gets a variable's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Gets the first of `keys` that is set to a non-empty value.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates over variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a new environment with `overrides` applied on top of this one.
    ///
    /// Keys present in `overrides` replace the current value; every other key
    /// keeps its current value. `self` is left untouched.
    pub fn overlay(&self, overrides: &EnvironmentOverrides) -> Environment {
        let mut vars = self.vars.clone();
        for (key, value) in overrides.iter() {
            vars.insert(key.to_string(), value.to_string());
        }
        Environment { vars }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(k, v)| (k, if is_secret(k) { REDACTED } else { v })),
            )
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Variables a scope sets on top of its ambient environment.
///
/// Setting the same key twice keeps the later value.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentOverrides {
    #[serde(rename = "variables")]
    vars: BTreeMap<String, String>,

    /// When the assumed-role credentials stop being valid, if a role was assumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<DateTime<Utc>>,
}

impl EnvironmentOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates over overrides in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variable names, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    pub(crate) fn set_expiration(&mut self, expiration: Option<DateTime<Utc>>) {
        self.expiration = expiration;
    }
}

impl fmt::Debug for EnvironmentOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&k, &if is_secret(k) { REDACTED } else { v });
        }
        map.finish()
    }
}
