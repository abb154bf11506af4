//! Run configuration and the JSON file it can be loaded from

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EnvFileError, EnvFileResult};
use crate::format::{EnvFileType, KeyMapping};
use crate::record::Record;
use crate::sink::WriteMode;
use crate::source::DEFAULT_MAX_CONCURRENT_FETCHES;

/// Parameters of one env file generation run
///
/// Field names follow the camelCase JSON accepted by `--config`:
///
/// ```json
/// {
///   "type": "dotenv",
///   "outputDir": "./",
///   "secretIds": ["dev/app"],
///   "keyMapping": { "SECRET_ID": "SECRET_CODE" },
///   "addParams": { "APP_URL": "http://localhost/3000" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvFileConfig {
    /// File kind; validated when the pipeline starts
    #[serde(rename = "type", default)]
    pub file_type: String,
    /// Prefix of the destination path, joined by plain concatenation
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Filename overriding the kind's default
    #[serde(default)]
    pub output_filename: Option<String>,
    /// Secret Store identifiers, fetched and written in this order
    #[serde(default)]
    pub secret_ids: Option<Vec<String>>,
    /// Parameter Store path prefix
    #[serde(default)]
    pub parameter_path: Option<String>,
    /// Keys allowed through from the stores; literals are never filtered
    #[serde(default)]
    pub output_whitelist: Option<Vec<String>>,
    /// Output key renames
    #[serde(default)]
    pub key_mapping: Option<KeyMapping>,
    /// Literal entries appended after the fetched ones
    #[serde(default)]
    pub add_params: Option<Record>,
    /// AWS region, used only to build the clients
    #[serde(default)]
    pub region: Option<String>,
    /// AWS shared config profile
    #[serde(default)]
    pub profile: Option<String>,
    /// Upper bound on concurrent secret fetches
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Replace the destination via temp file and rename instead of delete-then-append
    #[serde(default)]
    pub atomic_write: bool,
}

fn default_output_dir() -> String {
    "./".to_string()
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

impl EnvFileConfig {
    /// Configuration with every optional field unset
    pub fn new(file_type: impl Into<String>, output_dir: impl Into<String>) -> Self {
        EnvFileConfig {
            file_type: file_type.into(),
            output_dir: output_dir.into(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            ..Default::default()
        }
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> EnvFileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EnvFileError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
            .map_err(|e| EnvFileError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Parse configuration JSON
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Destination: `{outputDir}{outputFilename or the kind's default filename}`
    ///
    /// `outputDir` is expanded for `~` and environment variables first; an undefined
    /// variable is a configuration error.
    pub fn output_path(&self, file_type: EnvFileType) -> EnvFileResult<PathBuf> {
        let output_dir = shellexpand::full(&self.output_dir).map_err(|e| {
            EnvFileError::Configuration(format!("cannot expand outputDir {}: {e}", self.output_dir))
        })?;
        let filename = self
            .output_filename
            .as_deref()
            .unwrap_or(file_type.default_filename());

        Ok(PathBuf::from(format!("{output_dir}{filename}")))
    }

    /// Allow-list as a set, if one is configured
    pub fn whitelist(&self) -> Option<HashSet<String>> {
        self.output_whitelist
            .as_ref()
            .map(|keys| keys.iter().cloned().collect())
    }

    /// How the destination is replaced
    pub fn write_mode(&self) -> WriteMode {
        if self.atomic_write {
            WriteMode::Atomic
        } else {
            WriteMode::DeleteThenAppend
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_camel_case_parameter_object() {
        let config = EnvFileConfig::from_json(
            r#"{
                "type": ".env",
                "outputDir": "./out/",
                "secretIds": ["dev/app", "dev/db"],
                "parameterPath": "/dev/app",
                "region": "ap-northeast-1",
                "profile": "dev",
                "outputWhitelist": ["API_KEY"],
                "keyMapping": {"API_KEY": "APP_API_KEY"},
                "addParams": {"APP_URL": "http://localhost/3000", "PORT": 3000}
            }"#,
        )
        .unwrap();

        assert_eq!(config.file_type, ".env");
        assert_eq!(config.secret_ids.as_deref().unwrap().len(), 2);
        assert_eq!(config.parameter_path.as_deref(), Some("/dev/app"));
        assert_eq!(config.max_concurrent_fetches, DEFAULT_MAX_CONCURRENT_FETCHES);
        assert!(!config.atomic_write);

        let add_params = config.add_params.as_ref().unwrap();
        assert_eq!(add_params["PORT"].to_string(), "3000");
        assert!(config.whitelist().unwrap().contains("API_KEY"));
    }

    #[test]
    fn test_output_path_uses_default_filename() {
        let config = EnvFileConfig::new("dotenv", "/tmp/project/");

        assert_eq!(
            config.output_path(EnvFileType::Terraform).unwrap(),
            PathBuf::from("/tmp/project/terraform.tfvars")
        );
    }

    #[test]
    fn test_output_path_is_plain_concatenation() {
        let mut config = EnvFileConfig::new("dotenv", "/tmp/project/app-");
        config.output_filename = Some("local.env".to_string());

        assert_eq!(
            config.output_path(EnvFileType::Dotenv).unwrap(),
            PathBuf::from("/tmp/project/app-local.env")
        );
    }

    #[test]
    fn test_default_output_dir() {
        let config = EnvFileConfig::from_json(r#"{"type": "direnv"}"#).unwrap();

        assert_eq!(config.output_dir, "./");
        assert_eq!(
            config.output_path(EnvFileType::Direnv).unwrap(),
            PathBuf::from("./.envrc")
        );
    }

    #[test]
    fn test_undefined_variable_in_output_dir_is_configuration_error() {
        let config = EnvFileConfig::new("dotenv", "$AWS_ENVFILE_TEST_UNSET_DIR/out/");

        let err = config.output_path(EnvFileType::Dotenv).unwrap_err();

        assert_eq!(err.name(), "ConfigurationError");
        assert!(err.to_string().contains("AWS_ENVFILE_TEST_UNSET_DIR"));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = EnvFileConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.name(), "ConfigurationError");
    }
}
