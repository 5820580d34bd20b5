// Collector - 結果の受信ループと進捗報告

use super::deadline::{DeadlineGuard, Next};
use crate::core::{DispatchSummary, ProgressReporter, TaskResult};
use std::time::Instant;

/// 受信した結果とサマリー
#[derive(Debug)]
pub struct CollectedResults<T> {
    pub results: Vec<TaskResult<T>>,
    pub summary: DispatchSummary,
}

/// Deadline Guard を最後まで回し、届いた結果を1件ずつ `on_result` に渡す
///
/// シンクが閉じるか締め切りに達した時点で終了する。
pub async fn drain_results<T, R, F>(
    mut guard: DeadlineGuard<T>,
    total_tasks: usize,
    reporter: &R,
    mut on_result: F,
) -> DispatchSummary
where
    R: ProgressReporter + ?Sized,
    F: FnMut(TaskResult<T>),
{
    let start_time = Instant::now();
    reporter.report_started(total_tasks).await;

    let mut delivered = 0;
    let mut succeeded = 0;
    let mut failed = 0;

    let timed_out = loop {
        match guard.next().await {
            Next::Item(result) => {
                delivered += 1;
                match result.error() {
                    Some(error) => {
                        reporter.report_error(&result.source, error).await;
                        failed += 1;
                    }
                    None => succeeded += 1,
                }
                on_result(result);
                reporter.report_progress(delivered, total_tasks).await;
            }
            Next::Closed => break false,
            Next::Expired => {
                reporter.report_timeout(delivered, total_tasks).await;
                break true;
            }
        }
    };

    reporter.report_completed(succeeded, failed).await;

    DispatchSummary {
        total_tasks,
        delivered,
        succeeded,
        failed,
        timed_out,
        elapsed: start_time.elapsed(),
    }
}

/// 届いた結果を全て集める
pub async fn collect_results<T, R>(
    guard: DeadlineGuard<T>,
    total_tasks: usize,
    reporter: &R,
) -> CollectedResults<T>
where
    R: ProgressReporter + ?Sized,
{
    let mut results = Vec::with_capacity(total_tasks);
    let summary = drain_results(guard, total_tasks, reporter, |result| results.push(result)).await;
    CollectedResults { results, summary }
}
