// 進捗監視の具象実装

use crate::core::{ProgressReporter, TaskError, TaskId};
use async_trait::async_trait;
use tracing::{info, warn};

/// tracing 経由でコンソールへ進捗を出力する実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, total_tasks: usize) {
        if !self.quiet {
            info!(total_tasks, "dispatching tasks");
        }
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        if !self.quiet && (completed % 10 == 0 || completed == total) {
            let percentage = if total > 0 {
                (completed as f64 / total as f64) * 100.0
            } else {
                100.0
            };
            info!(completed, total, "progress {percentage:.1}%");
        }
    }

    async fn report_error(&self, task: &TaskId, error: &TaskError) {
        if !self.quiet {
            warn!(task = %task, %error, "task failed");
        }
    }

    async fn report_timeout(&self, delivered: usize, total: usize) {
        if !self.quiet {
            warn!(delivered, total, "deadline reached before all results arrived");
        }
    }

    async fn report_completed(&self, succeeded: usize, failed: usize) {
        if !self.quiet {
            info!(succeeded, failed, "completed");
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _total_tasks: usize) {}

    async fn report_progress(&self, _completed: usize, _total: usize) {}

    async fn report_error(&self, _task: &TaskId, _error: &TaskError) {}

    async fn report_timeout(&self, _delivered: usize, _total: usize) {}

    async fn report_completed(&self, _succeeded: usize, _failed: usize) {}
}
