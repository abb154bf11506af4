//! Parameter Store pagination
//!
//! Pages are requested strictly one after another, each with the previous page's
//! continuation token, until a page comes back without one. Every page must carry
//! at least one parameter, and a continuation token is never handed out twice.

use std::collections::HashSet;

use crate::error::{EnvFileError, EnvFileResult};
use crate::logging::LoggingTransformer;
use crate::record::{RecordSet, single_entry};
use crate::store::{ParameterStore, StoreError};

/// Drain every page under `path` into one record per parameter
///
/// The record key is the parameter name with the first `{path}/` removed.
pub async fn fetch_parameters<P: ParameterStore>(
    store: &P,
    path: &str,
) -> EnvFileResult<RecordSet> {
    let prefix = format!("{}/", path.trim_end_matches('/'));
    let mut records = RecordSet::new();
    let mut next_token: Option<String> = None;
    let mut seen_tokens = HashSet::new();
    let mut page_number = 0;

    loop {
        let page = store
            .get_parameters_page(path, next_token.as_deref())
            .await
            .map_err(EnvFileError::remote_store)?;
        page_number += 1;

        LoggingTransformer::log_parameter_page(
            path,
            page_number,
            page.parameters.len(),
            page.next_token.is_some(),
        );

        if page.parameters.is_empty() {
            return Err(EnvFileError::ParameterNotFound {
                path: path.to_string(),
                page: page_number,
            });
        }

        records.extend(
            page.parameters
                .into_iter()
                .map(|p| single_entry(p.name.replacen(&prefix, "", 1), p.value)),
        );

        match page.next_token {
            Some(token) => {
                if !seen_tokens.insert(token.clone()) {
                    return Err(EnvFileError::remote_store(StoreError::MalformedResponse(
                        format!("continuation token repeated on page {page_number} under {path}"),
                    )));
                }
                next_token = Some(token);
            }
            None => break,
        }
    }

    Ok(records)
}
