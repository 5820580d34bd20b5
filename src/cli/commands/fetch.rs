use crate::cli::args::DispatchArgs;
use crate::core::DispatchSummary;
use crate::services::{fetch_status_tasks, http_client};
use anyhow::Result;
use std::time::Duration;

use super::run_and_print;

/// URL 列を並列に GET し、届いた順にステータス行を出力する
pub async fn execute_fetch(
    urls: &[String],
    request_timeout: Duration,
    args: &DispatchArgs,
) -> Result<DispatchSummary> {
    let client = http_client(Some(request_timeout))?;
    run_and_print(fetch_status_tasks(&client, urls.iter().cloned()), args).await
}
