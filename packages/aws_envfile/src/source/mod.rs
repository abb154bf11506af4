//! Fetching records from the two stores

pub mod parameters;
pub mod secrets;

pub use parameters::fetch_parameters;
pub use secrets::{DEFAULT_MAX_CONCURRENT_FETCHES, fetch_secrets};
