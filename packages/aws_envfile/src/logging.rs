//! Structured logging infrastructure
//!
//! `env_logger` behind the `log` facade. Secret identifiers and keys are only ever
//! logged as a short SHA-256 digest; values are never logged.

use std::path::Path;
use std::sync::Once;

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::error::EnvFileError;

static INIT_LOGGER: Once = Once::new();

/// Logging setup and the pipeline's log events
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels come from `RUST_LOG`, e.g. `RUST_LOG=aws_envfile=debug`. When
    /// `RUST_LOG` is unset, `default_level` applies.
    pub fn init(default_level: log::LevelFilter) {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::new()
                .filter_level(default_level)
                .parse_default_env()
                .format_timestamp_micros()
                .init();
        });
    }

    /// Initialize logging for test environments
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log the start of a run
    pub fn log_pipeline_start(file_type: &str, destination: &Path) {
        info!("Creating {file_type} file at {}", destination.display());
    }

    /// Log removal of the previous output file
    pub fn log_existing_file_removed(destination: &Path) {
        info!("Removed existing file {}", destination.display());
    }

    /// Log a completed secret fetch without exposing the identifier
    pub fn log_secret_fetched(secret_id: &str, key_count: usize) {
        debug!(
            "Fetched secret (id_hash: {}, keys: {key_count})",
            Self::secure_hash_key(secret_id)
        );
    }

    /// Log one fetched parameter page
    pub fn log_parameter_page(path: &str, page: usize, item_count: usize, has_more: bool) {
        debug!(
            "Fetched parameter page {page} under {path} (items: {item_count}, more: {has_more})"
        );
    }

    /// Log a key dropped by the allow-list
    pub fn log_key_filtered(key: &str) {
        debug!("Key not in whitelist (key_hash: {})", Self::secure_hash_key(key));
    }

    /// Log a successful run
    pub fn log_pipeline_complete(destination: &Path, lines: usize) {
        info!("Wrote {lines} lines to {}", destination.display());
    }

    /// Log a failed run with its stable error name
    pub fn log_pipeline_failure(error: &EnvFileError) {
        warn!("Env file generation failed: {}: {error}", error.name());
    }

    /// Short SHA-256 digest of a sensitive identifier, `#` plus 12 hex chars
    pub fn secure_hash_key(key: &str) -> String {
        let hash = Sha256::digest(key.as_bytes());
        let hex_hash = format!("{hash:x}");
        format!("#{}", &hex_hash[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_key_hashing() {
        LoggingTransformer::init_test();

        let hash1 = LoggingTransformer::secure_hash_key("dev/app");
        let hash2 = LoggingTransformer::secure_hash_key("dev/db");

        assert_ne!(hash1, hash2);
        assert_eq!(hash1, LoggingTransformer::secure_hash_key("dev/app"));
        assert!(hash1.starts_with('#'));
        assert_eq!(hash1.len(), 13);
    }

    #[test]
    fn test_logging_operations() {
        LoggingTransformer::init_test();

        LoggingTransformer::log_pipeline_start("dotenv", Path::new("./.env"));
        LoggingTransformer::log_secret_fetched("dev/app", 3);
        LoggingTransformer::log_parameter_page("/dev/app", 1, 10, true);
        LoggingTransformer::log_pipeline_failure(&EnvFileError::MissingSource);
    }
}
