// ディスパッチャのトレイト定義
// 設定と進捗報告の抽象化インターフェース

use super::error::{FanoutError, FanoutResult, TaskError};
use super::types::{SinkCapacity, TaskId, MAX_LIMIT};
use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;

/// ディスパッチの設定を抽象化するトレイト
#[automock]
pub trait DispatchConfig: Send + Sync {
    /// 最大同時実行タスク数（AdmissionToken の総数）
    fn max_concurrent_tasks(&self) -> usize;

    /// シンクの容量
    fn sink_capacity(&self) -> SinkCapacity;

    /// 結果待ちのタイムアウト（None なら全件待つ）
    fn timeout(&self) -> Option<Duration>;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

impl DispatchConfig for Box<dyn DispatchConfig> {
    fn max_concurrent_tasks(&self) -> usize {
        self.as_ref().max_concurrent_tasks()
    }

    fn sink_capacity(&self) -> SinkCapacity {
        self.as_ref().sink_capacity()
    }

    fn timeout(&self) -> Option<Duration> {
        self.as_ref().timeout()
    }

    fn enable_progress_reporting(&self) -> bool {
        self.as_ref().enable_progress_reporting()
    }
}

/// 設定値を検証する（ワーカー起動前に同期的に失敗させるため）
pub fn validate_config<C: DispatchConfig + ?Sized>(config: &C) -> FanoutResult<()> {
    if config.max_concurrent_tasks() == 0 {
        return Err(FanoutError::invalid_configuration(
            "max_concurrent_tasks",
            "同時実行数は1以上である必要があります",
        ));
    }
    if config.sink_capacity() == SinkCapacity::Fixed(0) {
        return Err(FanoutError::invalid_configuration(
            "sink_capacity",
            "シンク容量は1以上である必要があります",
        ));
    }
    check_upper_bound("max_concurrent_tasks", config.max_concurrent_tasks())?;
    if let SinkCapacity::Fixed(n) = config.sink_capacity() {
        check_upper_bound("sink_capacity", n)?;
    }
    Ok(())
}

/// Semaphore や mpsc チャンネルに渡す前に上限を確認する
pub(crate) fn check_upper_bound(field: &str, value: usize) -> FanoutResult<()> {
    if value > MAX_LIMIT {
        return Err(FanoutError::invalid_configuration(
            field,
            format!("{MAX_LIMIT} 以下である必要があります（指定値: {value}）"),
        ));
    }
    Ok(())
}

/// 進捗報告の抽象化トレイト
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 受信開始時の報告
    async fn report_started(&self, total_tasks: usize);

    /// 結果を1件受け取るたびの報告
    async fn report_progress(&self, completed: usize, total: usize);

    /// タスクが失敗した時の報告
    async fn report_error(&self, task: &TaskId, error: &TaskError);

    /// 締め切りで受信を打ち切った時の報告
    async fn report_timeout(&self, delivered: usize, total: usize);

    /// 受信完了時の報告
    async fn report_completed(&self, succeeded: usize, failed: usize);
}

#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_started(&self, total_tasks: usize) {
        self.as_ref().report_started(total_tasks).await
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        self.as_ref().report_progress(completed, total).await
    }

    async fn report_error(&self, task: &TaskId, error: &TaskError) {
        self.as_ref().report_error(task, error).await
    }

    async fn report_timeout(&self, delivered: usize, total: usize) {
        self.as_ref().report_timeout(delivered, total).await
    }

    async fn report_completed(&self, succeeded: usize, failed: usize) {
        self.as_ref().report_completed(succeeded, failed).await
    }
}
