//! End-to-end env file generation

use std::path::PathBuf;

use crate::aggregate::{AggregateRequest, aggregate};
use crate::config::EnvFileConfig;
use crate::error::EnvFileResult;
use crate::format::{EnvFileType, render_lines};
use crate::logging::LoggingTransformer;
use crate::sink::OutputSink;
use crate::store::{ParameterStore, SecretStore};

/// Fetch, merge, and write the env file described by `config`
///
/// The file type and the presence of a source are checked before any store call or
/// file change. After that the destination is cleared (unless writing atomically),
/// every source is fetched in full, and only then are lines written. A fetch
/// failure therefore leaves no file behind in the default mode.
///
/// Returns the path written.
pub async fn create_env_file<S, P>(
    config: &EnvFileConfig,
    secrets: &S,
    parameters: &P,
) -> EnvFileResult<PathBuf>
where
    S: SecretStore,
    P: ParameterStore,
{
    let result = run(config, secrets, parameters).await;
    if let Err(error) = &result {
        LoggingTransformer::log_pipeline_failure(error);
    }
    result
}

async fn run<S, P>(config: &EnvFileConfig, secrets: &S, parameters: &P) -> EnvFileResult<PathBuf>
where
    S: SecretStore,
    P: ParameterStore,
{
    let file_type: EnvFileType = config.file_type.parse()?;

    let whitelist = config.whitelist();
    let request = AggregateRequest {
        secret_ids: config.secret_ids.as_deref(),
        parameter_path: config.parameter_path.as_deref(),
        whitelist: whitelist.as_ref(),
        add_params: config.add_params.as_ref(),
        max_concurrent_fetches: config.max_concurrent_fetches,
    };
    request.validate()?;

    let sink = OutputSink::new(config.output_path(file_type)?, config.write_mode());
    LoggingTransformer::log_pipeline_start(file_type.name(), sink.path());
    sink.remove_existing().await?;

    let pairs = aggregate(secrets, parameters, &request).await?;
    let lines = render_lines(file_type, &pairs, config.key_mapping.as_ref());
    sink.write_lines(&lines).await?;

    LoggingTransformer::log_pipeline_complete(sink.path(), lines.len());
    Ok(sink.path().to_path_buf())
}
