//! Error types for env file generation

use std::path::PathBuf;

use crate::store::StoreError;

/// Broad category of an [`EnvFileError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad invocation parameters, raised before any store call
    Validation,
    /// A parameter path produced no parameters
    RemoteEmpty,
    /// Any failure surfaced by one of the stores
    RemoteStore,
    /// Output file could not be removed or written
    Io,
    /// Configuration file could not be loaded
    Configuration,
}

impl ErrorKind {
    /// Stable name exposed to callers
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::RemoteEmpty => "RemoteEmptyError",
            ErrorKind::RemoteStore => "RemoteStoreError",
            ErrorKind::Io => "IoError",
            ErrorKind::Configuration => "ConfigurationError",
        }
    }
}

/// Error type for env file generation
#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    /// The requested file kind is not one of the supported ones
    #[error("It's a file type that is not allowed: {0}")]
    InvalidFileType(String),

    /// Neither secret ids nor a parameter path was given
    #[error("secretIds or parameterPath is required")]
    MissingSource,

    /// A parameter path returned an empty page
    #[error("Parameter is not registered in ParameterStore: {path} (page {page})")]
    ParameterNotFound {
        /// Requested path
        path: String,
        /// One-based number of the empty page
        page: usize,
    },

    /// A store call failed; displays as the store's error code
    #[error("{code}")]
    RemoteStore {
        /// Store-native error code, or its message when it had none
        code: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// A secret payload was not a flat JSON object of strings and numbers
    #[error("Secret {secret_id} is not a flat JSON object of strings and numbers: {source}")]
    InvalidSecretPayload {
        /// Identifier of the offending secret
        secret_id: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Removing or writing the output file failed
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// File the operation was on
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or resolved
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EnvFileError {
    /// Wrap a store failure, keeping the store's own error code as the message
    pub fn remote_store(source: StoreError) -> Self {
        EnvFileError::RemoteStore {
            code: source.code().to_string(),
            source,
        }
    }

    /// Attach the offending path to an I/O failure
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnvFileError::Io {
            path: path.into(),
            source,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvFileError::InvalidFileType(_) | EnvFileError::MissingSource => ErrorKind::Validation,
            EnvFileError::ParameterNotFound { .. } => ErrorKind::RemoteEmpty,
            EnvFileError::RemoteStore { .. } | EnvFileError::InvalidSecretPayload { .. } => {
                ErrorKind::RemoteStore
            }
            EnvFileError::Io { .. } => ErrorKind::Io,
            EnvFileError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Stable error name, e.g. `ValidationError`
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Result type for env file operations
pub type EnvFileResult<T> = Result<T, EnvFileError>;
