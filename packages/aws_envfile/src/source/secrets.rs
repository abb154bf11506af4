//! Secret fetching
//!
//! Each identifier is fetched independently with bounded fan-out. Results come back
//! in identifier order whatever the completion order, and the first failure fails
//! the whole fetch; requests still in flight are dropped.

use futures::{StreamExt, TryStreamExt, stream};

use crate::error::{EnvFileError, EnvFileResult};
use crate::logging::LoggingTransformer;
use crate::record::{Record, RecordSet, parse_secret_record};
use crate::store::SecretStore;

/// Fetches issued at once when the caller does not say otherwise
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Fetch every secret in `secret_ids`, one record per identifier
pub async fn fetch_secrets<S: SecretStore>(
    store: &S,
    secret_ids: &[String],
    max_concurrent: usize,
) -> EnvFileResult<RecordSet> {
    stream::iter(secret_ids)
        .map(|secret_id| fetch_secret_record(store, secret_id))
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await
}

async fn fetch_secret_record<S: SecretStore>(
    store: &S,
    secret_id: &str,
) -> EnvFileResult<Record> {
    let payload = store
        .get_secret_string(secret_id)
        .await
        .map_err(EnvFileError::remote_store)?;
    let record = parse_secret_record(secret_id, &payload)?;

    LoggingTransformer::log_secret_fetched(secret_id, record.len());
    Ok(record)
}
