//! Remote store interfaces
//!
//! The pipeline only talks to the two stores through [`SecretStore`] and
//! [`ParameterStore`]. AWS-backed implementations live in
//! [`crate::aws_interface`]; the in-memory ones below back the tests and dry runs.
//! Methods return `impl Future + Send` directly, no `async_trait`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use zeroize::Zeroizing;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a remote store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Error returned by the service, with its native code when it has one
    #[error("{}", code.as_deref().unwrap_or(message))]
    Service {
        /// Store-native error code
        code: Option<String>,
        /// Human-readable message
        message: String,
        /// SDK error, when there is one
        #[source]
        source: Option<BoxError>,
    },

    /// The secret exists but carries no string payload
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// The store answered with something unusable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl StoreError {
    /// Build a service error from a code/message pair and the original cause
    pub fn service(
        code: Option<&str>,
        message: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        StoreError::Service {
            code: code.map(str::to_string),
            message: message.into(),
            source,
        }
    }

    /// Store-native error code, or the message when the store gave no code
    pub fn code(&self) -> &str {
        match self {
            StoreError::Service { code, message, .. } => code.as_deref().unwrap_or(message),
            StoreError::SecretNotFound(_) => "SecretNotFound",
            StoreError::MalformedResponse(_) => "MalformedResponse",
        }
    }
}

/// Flat key/value secret store
pub trait SecretStore: Send + Sync {
    /// Fetch the raw payload of one secret
    fn get_secret_string(
        &self,
        secret_id: &str,
    ) -> impl Future<Output = Result<Zeroizing<String>, StoreError>> + Send;
}

/// One parameter as returned by the Parameter Store, full name included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Full hierarchical name, e.g. `/dev/app/API_TOKEN`
    pub name: String,
    /// Decrypted value
    pub value: String,
}

impl Parameter {
    /// Build a parameter from its name and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One page of a path listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    /// Parameters on this page
    pub parameters: Vec<Parameter>,
    /// Present while more pages exist
    pub next_token: Option<String>,
}

/// Hierarchical, paginated parameter store
pub trait ParameterStore: Send + Sync {
    /// Fetch one page of decrypted parameters under `path`
    fn get_parameters_page(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> impl Future<Output = Result<ParameterPage, StoreError>> + Send;
}

/// Secret store held in memory
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: HashMap<String, String>,
    failures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl InMemorySecretStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret payload (normally a JSON object)
    pub fn with_secret(
        mut self,
        secret_id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        self.secrets.insert(secret_id.into(), payload.into());
        self
    }

    /// Make fetches of `secret_id` fail with the given service error code
    pub fn with_failure(mut self, secret_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.failures.insert(secret_id.into(), code.into());
        self
    }

    /// Number of fetches issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SecretStore for InMemorySecretStore {
    async fn get_secret_string(&self, secret_id: &str) -> Result<Zeroizing<String>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(code) = self.failures.get(secret_id) {
            return Err(StoreError::service(
                Some(code),
                format!("{code} for {secret_id}"),
                None,
            ));
        }

        self.secrets
            .get(secret_id)
            .map(|payload| Zeroizing::new(payload.clone()))
            .ok_or_else(|| StoreError::SecretNotFound(secret_id.to_string()))
    }
}

/// Parameter store held in memory
///
/// Either pages a flat list of parameters by path prefix, or replays a fixed
/// list of pages where the token `"n"` selects page `n`.
#[derive(Debug)]
pub struct InMemoryParameterStore {
    parameters: Vec<Parameter>,
    page_size: usize,
    scripted: Option<Vec<ParameterPage>>,
    calls: AtomicUsize,
}

impl InMemoryParameterStore {
    /// Page `parameters` in name order, `page_size` per page
    pub fn new(parameters: Vec<Parameter>, page_size: usize) -> Self {
        InMemoryParameterStore {
            parameters,
            page_size: page_size.max(1),
            scripted: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replay the given pages regardless of the requested path
    pub fn scripted(pages: Vec<ParameterPage>) -> Self {
        InMemoryParameterStore {
            parameters: Vec::new(),
            page_size: 1,
            scripted: Some(pages),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of page requests issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn page_index(next_token: Option<&str>) -> Result<usize, StoreError> {
        match next_token {
            None => Ok(0),
            Some(token) => token
                .parse()
                .map_err(|_| StoreError::MalformedResponse(format!("unknown token {token}"))),
        }
    }
}

impl Default for InMemoryParameterStore {
    fn default() -> Self {
        Self::new(Vec::new(), 10)
    }
}

impl ParameterStore for InMemoryParameterStore {
    async fn get_parameters_page(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = Self::page_index(next_token)?;

        if let Some(pages) = &self.scripted {
            return pages
                .get(start)
                .cloned()
                .ok_or_else(|| StoreError::MalformedResponse(format!("no page {start}")));
        }

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let matching: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|p| p.name.starts_with(&prefix))
            .collect();

        let start = start.min(matching.len());
        let end = (start + self.page_size).min(matching.len());
        Ok(ParameterPage {
            parameters: matching[start..end].iter().map(|p| (*p).clone()).collect(),
            next_token: (end < matching.len()).then(|| end.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_secret_store() {
        let store = InMemorySecretStore::new()
            .with_secret("dev/app", r#"{"A":"1"}"#)
            .with_failure("dev/locked", "AccessDeniedException");

        assert_eq!(
            store.get_secret_string("dev/app").await.unwrap().as_str(),
            r#"{"A":"1"}"#
        );
        assert_eq!(
            store.get_secret_string("dev/locked").await.unwrap_err().code(),
            "AccessDeniedException"
        );
        assert!(matches!(
            store.get_secret_string("dev/missing").await.unwrap_err(),
            StoreError::SecretNotFound(_)
        ));
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn test_in_memory_parameter_store_pages_by_prefix() {
        let store = InMemoryParameterStore::new(
            vec![
                Parameter::new("/dev/app/A", "1"),
                Parameter::new("/dev/other/B", "2"),
                Parameter::new("/dev/app/C", "3"),
                Parameter::new("/dev/app/D", "4"),
            ],
            2,
        );

        let first = store.get_parameters_page("/dev/app", None).await.unwrap();
        assert_eq!(first.parameters.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = store
            .get_parameters_page("/dev/app", first.next_token.as_deref())
            .await
            .unwrap();
        assert_eq!(second.parameters, vec![Parameter::new("/dev/app/D", "4")]);
        assert!(second.next_token.is_none());
    }
}
