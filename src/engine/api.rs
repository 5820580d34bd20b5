// 高レベル公開API
// Dispatcher と Collector を簡単に使用できるようにするための便利な関数

use super::collector::{collect_results, CollectedResults};
use super::dispatcher::{Dispatch, Dispatcher};
use crate::core::{DispatchConfig, FanoutResult, ProgressReporter, Task, TaskResult};
use crate::services::NoOpProgressReporter;
use std::time::Duration;

/// タスク列を同時実行数 `limit` で投入する
///
/// `limit` が0ならワーカーを1つも起動せずに `InvalidConfiguration` を返す。
pub fn dispatch<T, I>(tasks: I, limit: usize) -> FanoutResult<Dispatch<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Task<T>>,
{
    Ok(Dispatcher::new(limit)?.run(tasks))
}

/// 全タスクの完了を待ち、結果を完了順で返す
pub async fn run_to_completion<T, I>(tasks: I, limit: usize) -> FanoutResult<Vec<TaskResult<T>>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Task<T>>,
{
    let (mut results, handle) = dispatch(tasks, limit)?.into_parts();
    let mut collected = Vec::new();
    while let Some(result) = results.recv().await {
        collected.push(result);
    }
    handle.join().await?;
    Ok(collected)
}

/// 締め切り付きで結果を集める（静音版）
///
/// 締め切りに達したタスクの結果は捨てられ、ワーカーは裏で最後まで走る。
pub async fn run_with_timeout<T, I>(
    tasks: I,
    limit: usize,
    timeout: Duration,
) -> FanoutResult<CollectedResults<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Task<T>>,
{
    let dispatcher = Dispatcher::new(limit)?.with_timeout(Some(timeout));
    let dispatch = dispatcher.run(tasks);
    let total_tasks = dispatch.total_tasks();
    let (guard, _handle) = dispatch.into_guard();
    Ok(collect_results(guard, total_tasks, &NoOpProgressReporter::new()).await)
}

/// 設定と進捗報告を注入して結果を集める
pub async fn run_with_config<T, I, C, R>(
    tasks: I,
    config: &C,
    reporter: &R,
) -> FanoutResult<CollectedResults<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Task<T>>,
    C: DispatchConfig + ?Sized,
    R: ProgressReporter + ?Sized,
{
    let dispatch = Dispatcher::run_with_config(tasks, config)?;
    let total_tasks = dispatch.total_tasks();
    let (guard, _handle) = dispatch.into_guard();
    Ok(collect_results(guard, total_tasks, reporter).await)
}
