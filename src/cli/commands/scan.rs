use crate::cli::args::DispatchArgs;
use crate::core::DispatchSummary;
use crate::services::{discover_files, probe_file_task, FileProbe};
use anyhow::Result;
use std::path::Path;

use super::run_and_print;

/// ディレクトリ以下のファイルのメタデータを並列に読む
pub async fn execute_scan(
    target_directory: &Path,
    extensions: &[String],
    args: &DispatchArgs,
) -> Result<DispatchSummary> {
    if !target_directory.exists() {
        anyhow::bail!(
            "Target directory does not exist: {}",
            target_directory.display()
        );
    }

    if !target_directory.is_dir() {
        anyhow::bail!(
            "Target path is not a directory: {}",
            target_directory.display()
        );
    }

    let files = discover_files(target_directory, extensions)?;
    tracing::info!(count = files.len(), directory = %target_directory.display(), "files discovered");

    let tasks = files.into_iter().map(probe_file_task).collect();
    run_and_print(tasks, args).await
}
