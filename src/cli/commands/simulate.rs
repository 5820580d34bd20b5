use crate::cli::args::DispatchArgs;
use crate::core::DispatchSummary;
use crate::services::{sleep_tasks, SimulatedSpec};
use anyhow::Result;

use super::run_and_print;

/// 擬似タスクを実行する
pub async fn execute_simulate(durations: &[String], args: &DispatchArgs) -> Result<DispatchSummary> {
    let specs = durations
        .iter()
        .map(|d| d.parse::<SimulatedSpec>())
        .collect::<Result<Vec<_>>>()?;

    run_and_print(sleep_tasks(&specs), args).await
}
