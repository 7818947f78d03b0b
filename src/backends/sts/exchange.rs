//! STS exchange implementation.

use crate::env::{
    AWS_ACCESS_KEY_ID, AWS_DEFAULT_PROFILE, AWS_DEFAULT_REGION, AWS_ENDPOINT_URL,
    AWS_ENDPOINT_URL_STS, AWS_PROFILE, AWS_REGION, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN,
};
use crate::{AssumedIdentity, CredentialExchange, Environment, ExchangeError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::config::Credentials as StaticCredentials;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;
use tracing::debug;

/// Region STS is called in when the environment names none.
const DEFAULT_STS_REGION: &str = "us-east-1";

/// Provider name reported for credentials taken from a scope's environment.
const PROVIDER_NAME: &str = "withaws-environment";

/// AWS STS exchange.
///
/// A new SDK client is built for every call, from the environment the call
/// receives, so that profile and region overrides of the enclosing scope
/// apply.
#[derive(Debug, Clone, Default)]
pub struct StsExchange {
    endpoint: Option<String>,
}

impl StsExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends every request to `endpoint` regardless of the environment.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    async fn sdk_config(&self, env: &Environment) -> SdkConfig {
        let region = region_for(env);
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));

        if let Some(profile) = env.first_of(&[AWS_PROFILE, AWS_DEFAULT_PROFILE]) {
            loader = loader.profile_name(profile);
        }

        if let (Some(key), Some(secret)) = (
            env.first_of(&[AWS_ACCESS_KEY_ID]),
            env.first_of(&[AWS_SECRET_ACCESS_KEY]),
        ) {
            debug!("Using static credentials from scope environment");
            loader = loader.credentials_provider(StaticCredentials::new(
                key,
                secret,
                env.first_of(&[AWS_SESSION_TOKEN]).map(str::to_string),
                None,
                PROVIDER_NAME,
            ));
        }

        if let Some(endpoint) = self.endpoint.as_deref().or_else(|| endpoint_for(env)) {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }

    async fn client(&self, env: &Environment) -> Client {
        Client::new(&self.sdk_config(env).await)
    }
}

fn region_for(env: &Environment) -> &str {
    env.first_of(&[AWS_REGION, AWS_DEFAULT_REGION])
        .unwrap_or(DEFAULT_STS_REGION)
}

fn endpoint_for(env: &Environment) -> Option<&str> {
    env.first_of(&[AWS_ENDPOINT_URL_STS, AWS_ENDPOINT_URL])
}

#[async_trait]
impl CredentialExchange for StsExchange {
    fn name(&self) -> &str {
        "sts"
    }

    async fn caller_account(&self, env: &Environment) -> Result<String, ExchangeError> {
        let client = self.client(env).await;

        let output = client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| ExchangeError::Service(DisplayErrorContext(&e).to_string()))?;

        output
            .account()
            .map(str::to_string)
            .ok_or(ExchangeError::MissingField("Account"))
    }

    async fn assume_role(
        &self,
        env: &Environment,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedIdentity, ExchangeError> {
        let client = self.client(env).await;

        let output = client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|e| ExchangeError::Service(DisplayErrorContext(&e).to_string()))?;

        let credentials = output
            .credentials()
            .ok_or(ExchangeError::MissingField("Credentials"))?;
        let user = output
            .assumed_role_user()
            .ok_or(ExchangeError::MissingField("AssumedRoleUser"))?;

        let expiration = credentials.expiration();
        Ok(AssumedIdentity {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            assumed_role_id: user.assumed_role_id().to_string(),
            expiration: chrono::DateTime::from_timestamp(
                expiration.secs(),
                expiration.subsec_nanos(),
            ),
        })
    }
}
