//! Output formats and key mapping
//!
//! | Kind        | Default filename   | Line                |
//! |-------------|--------------------|---------------------|
//! | `dotenv`    | `.env`             | `KEY=VALUE`         |
//! | `direnv`    | `.envrc`           | `export KEY=VALUE`  |
//! | `terraform` | `terraform.tfvars` | `KEY = "VALUE"`     |
//!
//! Values are written as-is, without escaping, so downstream tools see exactly
//! what the store holds.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::EnvFileError;
use crate::record::Value;

/// Key rename table, original key to output key
pub type KeyMapping = IndexMap<String, String>;

/// Supported env file kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileType {
    /// `.env`
    Dotenv,
    /// `.envrc`
    Direnv,
    /// `terraform.tfvars`
    Terraform,
}

impl EnvFileType {
    /// Every supported kind
    pub const ALL: [EnvFileType; 3] = [
        EnvFileType::Dotenv,
        EnvFileType::Direnv,
        EnvFileType::Terraform,
    ];

    /// Name accepted as `type`
    pub fn name(self) -> &'static str {
        match self {
            EnvFileType::Dotenv => "dotenv",
            EnvFileType::Direnv => "direnv",
            EnvFileType::Terraform => "terraform",
        }
    }

    /// Filename used when the caller does not give one
    pub fn default_filename(self) -> &'static str {
        match self {
            EnvFileType::Dotenv => ".env",
            EnvFileType::Direnv => ".envrc",
            EnvFileType::Terraform => "terraform.tfvars",
        }
    }

    /// Render one line, newline included
    pub fn render_line(self, key: &str, value: &Value) -> String {
        match self {
            EnvFileType::Dotenv => format!("{key}={value}\n"),
            EnvFileType::Direnv => format!("export {key}={value}\n"),
            EnvFileType::Terraform => format!("{key} = \"{value}\"\n"),
        }
    }
}

impl fmt::Display for EnvFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the kind name or its default filename (`.env`, `.envrc`, `terraform.tfvars`)
impl FromStr for EnvFileType {
    type Err = EnvFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvFileType::ALL
            .into_iter()
            .find(|kind| s == kind.name() || s == kind.default_filename())
            .ok_or_else(|| EnvFileError::InvalidFileType(s.to_string()))
    }
}

/// Output key for `key`: the mapped name when one is set and non-empty, else `key`
pub fn map_key<'a>(key: &'a str, mapping: Option<&'a KeyMapping>) -> &'a str {
    mapping
        .and_then(|m| m.get(key))
        .map(String::as_str)
        .filter(|mapped| !mapped.is_empty())
        .unwrap_or(key)
}

/// Render every pair in order, applying the key mapping
pub fn render_lines(
    file_type: EnvFileType,
    pairs: &[(String, Value)],
    mapping: Option<&KeyMapping>,
) -> Vec<String> {
    pairs
        .iter()
        .map(|(key, value)| file_type.render_line(map_key(key, mapping), value))
        .collect()
}
