//! CLI command definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use indexmap::IndexMap;

use crate::aws_interface::AwsClients;
use crate::config::EnvFileConfig;
use crate::error::EnvFileResult;
use crate::pipeline::create_env_file;
use crate::record::{Record, Value};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "aws-envfile")]
#[command(about = "Write AWS Secrets Manager and Parameter Store values into an env file")]
pub struct Cli {
    /// Output kind: dotenv, direnv or terraform (or .env, .envrc, terraform.tfvars)
    #[arg(long = "type", short = 't')]
    pub file_type: Option<String>,

    /// Directory prefix of the output file, concatenated as-is (default: ./)
    #[arg(long, short = 'o')]
    pub output_dir: Option<String>,

    /// Output filename instead of the kind's default
    #[arg(long)]
    pub output_filename: Option<String>,

    /// Secrets Manager secret id, repeatable; secrets are written in this order
    #[arg(long = "secret-id", short = 's')]
    pub secret_ids: Vec<String>,

    /// Parameter Store path prefix, e.g. /dev/my-app
    #[arg(long, short = 'p')]
    pub parameter_path: Option<String>,

    /// Only write these keys, repeatable
    #[arg(long = "whitelist", short = 'w')]
    pub whitelist: Vec<String>,

    /// Rename a key on output, FROM=TO, repeatable
    #[arg(long = "key-mapping", short = 'm', value_parser = parse_key_value)]
    pub key_mapping: Vec<(String, String)>,

    /// Extra KEY=VALUE line appended after the fetched values, repeatable
    #[arg(long = "add-param", short = 'a', value_parser = parse_key_value)]
    pub add_params: Vec<(String, String)>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long)]
    pub profile: Option<String>,

    /// JSON file with the same options; flags given here take precedence
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Maximum secrets fetched at once
    #[arg(long)]
    pub max_concurrent_fetches: Option<usize>,

    /// Write to a temp file and rename it over the destination
    #[arg(long)]
    pub atomic: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level selected by `-v`
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    /// Merge the optional config file with the flags
    pub fn into_config(self) -> EnvFileResult<EnvFileConfig> {
        let mut config = match &self.config {
            Some(path) => EnvFileConfig::from_file(path)?,
            None => EnvFileConfig::new("", "./"),
        };

        if let Some(file_type) = self.file_type {
            config.file_type = file_type;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if self.output_filename.is_some() {
            config.output_filename = self.output_filename;
        }
        if !self.secret_ids.is_empty() {
            config.secret_ids = Some(self.secret_ids);
        }
        if self.parameter_path.is_some() {
            config.parameter_path = self.parameter_path;
        }
        if !self.whitelist.is_empty() {
            config.output_whitelist = Some(self.whitelist);
        }
        if !self.key_mapping.is_empty() {
            config.key_mapping = Some(self.key_mapping.into_iter().collect::<IndexMap<_, _>>());
        }
        if !self.add_params.is_empty() {
            config.add_params = Some(
                self.add_params
                    .into_iter()
                    .map(|(key, value)| (key, Value::from_literal(&value)))
                    .collect::<Record>(),
            );
        }
        if self.region.is_some() {
            config.region = self.region;
        }
        if self.profile.is_some() {
            config.profile = self.profile;
        }
        if let Some(max) = self.max_concurrent_fetches {
            config.max_concurrent_fetches = max;
        }
        if self.atomic {
            config.atomic_write = true;
        }

        Ok(config)
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Build the AWS clients and run the pipeline
pub async fn run(cli: Cli) -> EnvFileResult<PathBuf> {
    let config = cli.into_config()?;
    let clients = AwsClients::connect(config.region.clone(), config.profile.clone()).await;

    create_env_file(&config, &clients.secrets_manager(), &clients.parameter_store()).await
}
