// タスク・結果・サマリーのデータ型定義

use super::error::TaskError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// タスク関数が返すフューチャー
pub type TaskFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'static>>;

/// 一度だけ呼び出されるタスク関数
pub(crate) type TaskFn<T> = Box<dyn FnOnce() -> TaskFuture<T> + Send + 'static>;

/// 独立した作業単位
///
/// キー（URLやファイルパスなど）と、一度だけ実行される非同期関数の組。
/// 投入後は変更できず、ワーカーがちょうど一度だけ消費する。
pub struct Task<T> {
    key: String,
    work: TaskFn<T>,
}

impl<T: Send + 'static> Task<T> {
    pub fn new<F, Fut>(key: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            key: key.into(),
            work: Box::new(move || Box::pin(work()) as TaskFuture<T>),
        }
    }
}

impl<T> Task<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn into_parts(self) -> (String, TaskFn<T>) {
        (self.key, self.work)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("key", &self.key).finish_non_exhaustive()
    }
}

/// 結果の出所を示すタスク識別子
///
/// `index` は投入順の位置。キーが重複しても結果とタスクを一対一に対応付けられる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskId {
    pub index: usize,
    pub key: String,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.key)
    }
}

/// 個別タスクの結果
#[derive(Debug)]
pub struct TaskResult<T> {
    pub source: TaskId,
    pub outcome: Result<T, TaskError>,
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

impl<T> TaskResult<T> {
    pub fn new(source: TaskId, outcome: Result<T, TaskError>, elapsed: Duration) -> Self {
        Self {
            source,
            outcome,
            elapsed,
            completed_at: Utc::now(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&TaskError> {
        self.outcome.as_ref().err()
    }
}

impl<T: Serialize> TaskResult<T> {
    /// JSON出力用のレコードに変換
    pub fn to_record(&self) -> TaskRecord {
        let (value, error) = match &self.outcome {
            Ok(value) => (serde_json::to_value(value).ok(), None),
            Err(error) => (None, Some(error.to_string())),
        };
        TaskRecord {
            index: self.source.index,
            key: self.source.key.clone(),
            ok: self.outcome.is_ok(),
            value,
            error,
            elapsed_ms: self.elapsed.as_millis() as u64,
            completed_at: self.completed_at,
        }
    }
}

/// 結果のシリアライズ用ビュー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub index: usize,
    pub key: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// 同時実行数・シンク容量として受け付ける上限（tokio の Semaphore が扱える最大許可数）
pub const MAX_LIMIT: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// シンクの容量
///
/// 生産者が消費者を待たずに先行できる量を決めるだけで、順序や配送の完全性には影響しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkCapacity {
    /// 同時実行数と同じ
    #[default]
    MatchLimit,
    /// タスク総数と同じ（送信が決してブロックしない）
    MatchTaskCount,
    Fixed(usize),
}

impl SinkCapacity {
    /// 実際のバッファサイズを決定（チャンネルは容量0を許さないため最低1）
    pub fn resolve(&self, limit: usize, task_count: usize) -> usize {
        let capacity = match self {
            Self::MatchLimit => limit,
            Self::MatchTaskCount => task_count,
            Self::Fixed(n) => *n,
        };
        capacity.clamp(1, MAX_LIMIT)
    }
}

/// ディスパッチ全体のサマリー
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSummary {
    pub total_tasks: usize,
    pub delivered: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl DispatchSummary {
    /// 結果を受け取れなかったタスク数
    pub fn missing(&self) -> usize {
        self.total_tasks.saturating_sub(self.delivered)
    }
}
