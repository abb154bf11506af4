//! AWS Systems Manager Parameter Store operations

use aws_sdk_ssm::Client;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};

use crate::store::{Parameter, ParameterPage, ParameterStore, StoreError};

/// [`ParameterStore`] over AWS Systems Manager
#[derive(Debug, Clone)]
pub struct AwsParameterStore {
    client: Client,
}

impl AwsParameterStore {
    /// Wrap an SDK client built from [`super::AwsClients`]
    pub fn new(client: Client) -> Self {
        AwsParameterStore { client }
    }
}

impl ParameterStore for AwsParameterStore {
    async fn get_parameters_page(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, StoreError> {
        let result = self
            .client
            .get_parameters_by_path()
            .path(path)
            .with_decryption(true)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                let error = aws_sdk_ssm::Error::from(e);
                let message = error
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(&error).to_string());
                let code = error.code().map(str::to_string);
                StoreError::service(code.as_deref(), message, Some(Box::new(error)))
            })?;

        let parameters = result
            .parameters()
            .iter()
            .map(|p| match (p.name(), p.value()) {
                (Some(name), Some(value)) => Ok(Parameter::new(name, value)),
                (name, _) => Err(StoreError::MalformedResponse(format!(
                    "parameter {} has no name or value",
                    name.unwrap_or("<unnamed>")
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParameterPage {
            parameters,
            next_token: result.next_token().map(str::to_string),
        })
    }
}
