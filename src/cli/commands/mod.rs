pub mod fetch;
pub mod scan;
pub mod simulate;

pub use fetch::*;
pub use scan::*;
pub use simulate::*;

use crate::cli::args::DispatchArgs;
use crate::core::{DispatchConfig, DispatchSummary, ProgressReporter, SinkCapacity, Task, TaskResult};
use crate::engine::{drain_results, Dispatcher};
use crate::services::{ConsoleProgressReporter, DefaultDispatchConfig, NoOpProgressReporter};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Display;
use std::time::Duration;

/// コマンドライン引数からディスパッチ設定を組み立てる
pub fn build_config(args: &DispatchArgs) -> DefaultDispatchConfig {
    let mut config = DefaultDispatchConfig::default()
        .with_timeout(Some(Duration::from_millis(args.timeout_ms)))
        .with_progress_reporting(!args.quiet);

    if let Some(limit) = args.limit {
        config = config.with_max_concurrent(limit);
    }
    if let Some(capacity) = args.capacity {
        config = config.with_sink_capacity(SinkCapacity::Fixed(capacity));
    }
    config
}

fn build_reporter(config: &DefaultDispatchConfig) -> Box<dyn ProgressReporter> {
    if config.enable_progress_reporting() {
        Box::new(ConsoleProgressReporter::new())
    } else {
        Box::new(NoOpProgressReporter::new())
    }
}

/// タスク列を実行し、届いた順に1行ずつ結果を出力する
pub(crate) async fn run_and_print<T>(tasks: Vec<Task<T>>, args: &DispatchArgs) -> Result<DispatchSummary>
where
    T: Serialize + Display + Send + 'static,
{
    let config = build_config(args);
    config.validate()?;
    let reporter = build_reporter(&config);

    let dispatch = Dispatcher::run_with_config(tasks, &config)?;
    let total_tasks = dispatch.total_tasks();
    let (guard, handle) = dispatch.into_guard();

    let json = args.json;
    let mut write_error = None;
    let summary = drain_results(guard, total_tasks, &reporter, |result| {
        if write_error.is_none() {
            if let Err(error) = print_result(&result, json) {
                write_error = Some(error);
            }
        }
    })
    .await;

    if let Some(error) = write_error {
        return Err(error);
    }

    if summary.timed_out {
        // 残りのワーカーは送信に失敗して自然に終わる。待たずに返る
        handle.cancel();
    } else {
        let report = handle.join().await?;
        tracing::debug!(submitted = report.submitted, skipped = report.skipped, "dispatch joined");
    }

    if !json {
        print_summary(&summary);
    }
    Ok(summary)
}

/// プロセスの終了コード
///
/// タイムアウトは正常な終了経路なので0。失敗したタスクがあるときだけ1。
pub fn exit_code(summary: &DispatchSummary) -> i32 {
    if summary.failed > 0 {
        1
    } else {
        0
    }
}

fn print_result<T: Serialize + Display>(result: &TaskResult<T>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&result.to_record())?);
        return Ok(());
    }

    let elapsed_ms = result.elapsed.as_millis();
    match &result.outcome {
        Ok(value) => println!("✅ {} ({elapsed_ms}ms): {value}", result.source),
        Err(error) => println!("❌ {} ({elapsed_ms}ms): {error}", result.source),
    }
    Ok(())
}

fn print_summary(summary: &DispatchSummary) {
    println!("\n📊 結果:");
    println!("   - タスク数: {}", summary.total_tasks);
    println!("   - 受信数: {}", summary.delivered);
    println!("   - 成功: {}", summary.succeeded);
    println!("   - 失敗: {}", summary.failed);
    if summary.timed_out {
        println!("   - ⏰ タイムアウトで未受信: {}", summary.missing());
    }
    println!("   - 経過時間: {:.3}秒", summary.elapsed.as_secs_f64());
}
