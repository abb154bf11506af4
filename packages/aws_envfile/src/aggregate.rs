//! Merging records from both stores into the output sequence
//!
//! Order of the output: secret records in identifier order, then parameter records
//! in page order, then the literal record. Within a record, key order is kept.
//! Duplicate keys across records are all kept.

use std::collections::HashSet;

use futures::future;

use crate::error::{EnvFileError, EnvFileResult};
use crate::logging::LoggingTransformer;
use crate::record::{Record, RecordSet, Value};
use crate::source::{fetch_parameters, fetch_secrets};
use crate::store::{ParameterStore, SecretStore};

/// What to fetch and how to shape it
#[derive(Debug, Clone, Default)]
pub struct AggregateRequest<'a> {
    /// Secret identifiers, in output order
    pub secret_ids: Option<&'a [String]>,
    /// Parameter Store path prefix
    pub parameter_path: Option<&'a str>,
    /// Keys allowed through from the stores
    pub whitelist: Option<&'a HashSet<String>>,
    /// Literal record appended last, never filtered
    pub add_params: Option<&'a Record>,
    /// Upper bound on concurrent secret fetches
    pub max_concurrent_fetches: usize,
}

impl AggregateRequest<'_> {
    /// Fail unless at least one source is named
    pub fn validate(&self) -> EnvFileResult<()> {
        if self.secret_ids.is_none() && self.parameter_path.is_none() {
            return Err(EnvFileError::MissingSource);
        }
        Ok(())
    }
}

/// Fetch both sources and produce the flattened `(key, value)` sequence
pub async fn aggregate<S, P>(
    secrets: &S,
    parameters: &P,
    request: &AggregateRequest<'_>,
) -> EnvFileResult<Vec<(String, Value)>>
where
    S: SecretStore,
    P: ParameterStore,
{
    request.validate()?;

    let secret_records = async {
        match request.secret_ids {
            Some(ids) => fetch_secrets(secrets, ids, request.max_concurrent_fetches).await,
            None => Ok(RecordSet::new()),
        }
    };
    let parameter_records = async {
        match request.parameter_path {
            Some(path) => fetch_parameters(parameters, path).await,
            None => Ok(RecordSet::new()),
        }
    };

    let (mut records, parameter_records) =
        future::try_join(secret_records, parameter_records).await?;
    records.extend(parameter_records);

    let mut records = filter_whitelisted(records, request.whitelist);
    if let Some(add_params) = request.add_params {
        records.push(add_params.clone());
    }

    Ok(flatten(records))
}

/// Keep only whitelisted keys, record by record
///
/// Every record contributes its own surviving keys; records left empty simply
/// contribute nothing.
pub fn filter_whitelisted(records: RecordSet, whitelist: Option<&HashSet<String>>) -> RecordSet {
    let Some(whitelist) = whitelist else {
        return records;
    };

    records
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .filter(|(key, _)| {
                    let keep = whitelist.contains(key);
                    if !keep {
                        LoggingTransformer::log_key_filtered(key);
                    }
                    keep
                })
                .collect()
        })
        .collect()
}

/// Records in order, keys in each record's order
pub fn flatten(records: RecordSet) -> Vec<(String, Value)> {
    records.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::single_entry;
    use crate::store::{InMemoryParameterStore, InMemorySecretStore, Parameter};

    fn keys(pairs: &[(String, Value)]) -> Vec<&str> {
        pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    fn whitelist(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_requires_a_source_before_any_call() {
        let secrets = InMemorySecretStore::new();
        let parameters = InMemoryParameterStore::default();

        let err = aggregate(&secrets, &parameters, &AggregateRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EnvFileError::MissingSource));
        assert_eq!(secrets.calls(), 0);
        assert_eq!(parameters.calls(), 0);
    }

    #[tokio::test]
    async fn test_secrets_then_parameters_then_literals() {
        let secrets =
            InMemorySecretStore::new().with_secret("dev/app", r#"{"S1":"a","S2":"b"}"#);
        let parameters = InMemoryParameterStore::new(
            vec![Parameter::new("/dev/app/P1", "c"), Parameter::new("/dev/app/P2", "d")],
            1,
        );
        let ids = vec!["dev/app".to_string()];
        let add_params = single_entry("APP_URL", "http://localhost/3000");

        let pairs = aggregate(
            &secrets,
            &parameters,
            &AggregateRequest {
                secret_ids: Some(&ids),
                parameter_path: Some("/dev/app"),
                add_params: Some(&add_params),
                max_concurrent_fetches: 4,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(keys(&pairs), vec!["S1", "S2", "P1", "P2", "APP_URL"]);
    }

    #[tokio::test]
    async fn test_whitelist_never_filters_literals() {
        let secrets = InMemorySecretStore::new()
            .with_secret("dev/app", r#"{"KEEP":"1","DROP":"2"}"#)
            .with_secret("dev/db", r#"{"DROP_TOO":"3","KEEP":"4"}"#);
        let parameters = InMemoryParameterStore::default();
        let ids = vec!["dev/app".to_string(), "dev/db".to_string()];
        let allowed = whitelist(&["KEEP"]);
        let add_params = single_entry("EXTRA", "5");

        let pairs = aggregate(
            &secrets,
            &parameters,
            &AggregateRequest {
                secret_ids: Some(&ids),
                whitelist: Some(&allowed),
                add_params: Some(&add_params),
                max_concurrent_fetches: 4,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(keys(&pairs), vec!["KEEP", "KEEP", "EXTRA"]);
        assert_eq!(pairs[0].1.to_string(), "1");
        assert_eq!(pairs[1].1.to_string(), "4");
        assert_eq!(parameters.calls(), 0);
    }

    #[test]
    fn test_filter_keeps_relative_order() {
        let mut record = Record::new();
        for key in ["C", "A", "B", "D"] {
            record.insert(key.to_string(), Value::from(key));
        }

        let filtered = filter_whitelisted(vec![record], Some(&whitelist(&["B", "C", "D"])));

        let kept: Vec<&str> = filtered[0].keys().map(String::as_str).collect();
        assert_eq!(kept, vec!["C", "B", "D"]);
    }

    #[test]
    fn test_no_whitelist_passes_through() {
        let records = vec![single_entry("A", "1"), single_entry("B", "2")];
        assert_eq!(filter_whitelisted(records.clone(), None), records);
    }

    #[tokio::test]
    async fn test_parameter_failure_fails_aggregate() {
        let secrets = InMemorySecretStore::new().with_secret("dev/app", r#"{"A":"1"}"#);
        let parameters = InMemoryParameterStore::default();
        let ids = vec!["dev/app".to_string()];

        let err = aggregate(
            &secrets,
            &parameters,
            &AggregateRequest {
                secret_ids: Some(&ids),
                parameter_path: Some("/dev/empty"),
                max_concurrent_fetches: 4,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.name(), "RemoteEmptyError");
    }
}
