//! Aggregate AWS Secrets Manager secrets and Parameter Store parameters into
//! `.env`, `.envrc` or `terraform.tfvars` files.
//!
//! ```no_run
//! use aws_envfile::{AwsClients, EnvFileConfig, create_env_file};
//!
//! # async fn example() -> aws_envfile::EnvFileResult<()> {
//! let mut config = EnvFileConfig::new("dotenv", "./");
//! config.secret_ids = Some(vec!["dev/app".to_string()]);
//!
//! let clients = AwsClients::connect(Some("ap-northeast-1".to_string()), None).await;
//! create_env_file(&config, &clients.secrets_manager(), &clients.parameter_store()).await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod aws_interface;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod source;
pub mod store;

pub use aws_interface::AwsClients;
pub use config::EnvFileConfig;
pub use error::{EnvFileError, EnvFileResult, ErrorKind};
pub use format::{EnvFileType, KeyMapping};
pub use logging::LoggingTransformer;
pub use pipeline::create_env_file;
pub use record::{Record, RecordSet, Value};
pub use sink::WriteMode;
pub use store::{
    InMemoryParameterStore, InMemorySecretStore, Parameter, ParameterPage, ParameterStore,
    SecretStore, StoreError,
};
