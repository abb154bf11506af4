//! AWS interface module
//!
//! Contains AWS client setup and the Secrets Manager and Systems Manager Parameter
//! Store implementations of the store traits.

pub mod client;
pub mod parameters;
pub mod secrets;

pub use client::AwsClients;
pub use parameters::AwsParameterStore;
pub use secrets::AwsSecretsManagerStore;
