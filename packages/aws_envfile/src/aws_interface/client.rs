//! AWS client setup and configuration
//!
//! Contains AWS client initialization, credential handling, and region configuration.
//! Nothing here talks to the network; credentials are resolved lazily by the SDK.

use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use log::debug;

use super::parameters::AwsParameterStore;
use super::secrets::AwsSecretsManagerStore;

/// Authenticated handles to both stores, built from one shared SDK configuration
#[derive(Debug, Clone)]
pub struct AwsClients {
    config: SdkConfig,
}

impl AwsClients {
    /// Load the SDK configuration
    ///
    /// An explicit `region` wins over the environment. With a `profile`, credentials
    /// come from that shared-config profile; without one, from the default chain.
    pub async fn connect(region: Option<String>, profile: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = region {
            debug!("Using AWS region {region}");
            loader = loader.region(Region::new(region));
        }

        if let Some(profile) = profile {
            debug!("Using AWS profile {profile}");
            let credentials_provider = ProfileFileCredentialsProvider::builder()
                .profile_name(&profile)
                .build();
            loader = loader
                .profile_name(&profile)
                .credentials_provider(credentials_provider);
        }

        AwsClients {
            config: loader.load().await,
        }
    }

    /// Secrets Manager backed secret store
    pub fn secrets_manager(&self) -> AwsSecretsManagerStore {
        AwsSecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(&self.config))
    }

    /// Systems Manager Parameter Store backed parameter store
    pub fn parameter_store(&self) -> AwsParameterStore {
        AwsParameterStore::new(aws_sdk_ssm::Client::new(&self.config))
    }
}
