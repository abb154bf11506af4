//! AWS Secrets Manager operations

use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata};
use zeroize::Zeroizing;

use crate::store::{SecretStore, StoreError};

/// [`SecretStore`] over AWS Secrets Manager
#[derive(Debug, Clone)]
pub struct AwsSecretsManagerStore {
    client: Client,
}

impl AwsSecretsManagerStore {
    /// Wrap an SDK client built from [`super::AwsClients`]
    pub fn new(client: Client) -> Self {
        AwsSecretsManagerStore { client }
    }
}

impl SecretStore for AwsSecretsManagerStore {
    async fn get_secret_string(&self, secret_id: &str) -> Result<Zeroizing<String>, StoreError> {
        let result = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                let error = aws_sdk_secretsmanager::Error::from(e);
                let message = error
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(&error).to_string());
                let code = error.code().map(str::to_string);
                StoreError::service(code.as_deref(), message, Some(Box::new(error)))
            })?;

        let secret_string = result
            .secret_string()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::SecretNotFound(secret_id.to_string()))?
            .to_string();

        Ok(Zeroizing::new(secret_string))
    }
}
