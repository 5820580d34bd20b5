// Dispatcher - 同時実行数を制限した fan-out と、ワーカーのライフサイクル管理

use super::admission::{AdmissionPool, AdmissionToken};
use super::deadline::DeadlineGuard;
use super::sink::{result_channel, ResultReceiver, ResultSender};
use crate::core::traits::{check_upper_bound, validate_config};
use crate::core::types::TaskFn;
use crate::core::{
    DispatchConfig, FanoutError, FanoutResult, SinkCapacity, Task, TaskError, TaskId, TaskResult,
};
use futures_util::FutureExt;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, trace, warn};

/// 同時実行数 K の制限付きディスパッチャ
///
/// タスクごとに AdmissionToken を取得してからワーカーを起動し、すぐ次のタスクの投入に移る。
/// 投入側が待つのはトークンの取得だけで、タスクの結果を待つことはない。
#[derive(Debug, Clone)]
pub struct Dispatcher {
    limit: NonZeroUsize,
    sink_capacity: SinkCapacity,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// `limit` が0、または `MAX_LIMIT` を超えるなら `InvalidConfiguration`
    pub fn new(limit: usize) -> FanoutResult<Self> {
        let limit = NonZeroUsize::new(limit).ok_or_else(|| {
            FanoutError::invalid_configuration("limit", "同時実行数は1以上である必要があります")
        })?;
        check_upper_bound("limit", limit.get())?;
        Ok(Self {
            limit,
            sink_capacity: SinkCapacity::MatchLimit,
            timeout: None,
        })
    }

    pub fn from_config<C: DispatchConfig + ?Sized>(config: &C) -> FanoutResult<Self> {
        validate_config(config)?;
        Self::new(config.max_concurrent_tasks())?
            .with_sink_capacity(config.sink_capacity())
            .map(|dispatcher| dispatcher.with_timeout(config.timeout()))
    }

    pub fn with_sink_capacity(mut self, capacity: SinkCapacity) -> FanoutResult<Self> {
        if capacity == SinkCapacity::Fixed(0) {
            return Err(FanoutError::invalid_configuration(
                "sink_capacity",
                "シンク容量は1以上である必要があります",
            ));
        }
        if let SinkCapacity::Fixed(n) = capacity {
            check_upper_bound("sink_capacity", n)?;
        }
        self.sink_capacity = capacity;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn sink_capacity(&self) -> SinkCapacity {
        self.sink_capacity
    }

    /// タスク列の投入を開始する
    ///
    /// tokio ランタイム内から呼ぶこと。結果は返り値の `Dispatch` から完了順に読み出す。
    pub fn run<T, I>(&self, tasks: I) -> Dispatch<T>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Task<T>>,
    {
        let tasks: Vec<Task<T>> = tasks.into_iter().collect();
        let total_tasks = tasks.len();
        let capacity = self.sink_capacity.resolve(self.limit.get(), total_tasks);

        let pool = AdmissionPool::checked(self.limit);
        let (sender, results) = result_channel(capacity);

        debug!(total_tasks, limit = self.limit.get(), capacity, "dispatch started");
        let producer = tokio::spawn(submit_all(tasks, pool.clone(), sender));

        Dispatch {
            results,
            handle: DispatchHandle { pool, producer },
            total_tasks,
            timeout: self.timeout,
        }
    }

    /// 設定オブジェクトから同時実行数・シンク容量・タイムアウトを取ってタスク列を投入する
    pub fn run_with_config<T, I, C>(tasks: I, config: &C) -> FanoutResult<Dispatch<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Task<T>>,
        C: DispatchConfig + ?Sized,
    {
        Ok(Self::from_config(config)?.run(tasks))
    }
}

/// 実行中のディスパッチ
///
/// シンクの受信側と、投入・ワーカーを管理するハンドルを持つ。
pub struct Dispatch<T> {
    results: ResultReceiver<T>,
    handle: DispatchHandle,
    total_tasks: usize,
    timeout: Option<Duration>,
}

impl<T> Dispatch<T> {
    pub fn total_tasks(&self) -> usize {
        self.total_tasks
    }

    pub fn handle(&self) -> &DispatchHandle {
        &self.handle
    }

    pub fn results(&mut self) -> &mut ResultReceiver<T> {
        &mut self.results
    }

    pub fn into_parts(self) -> (ResultReceiver<T>, DispatchHandle) {
        (self.results, self.handle)
    }

    /// ディスパッチャに設定されたタイムアウトで Deadline Guard を作る
    pub fn into_guard(self) -> (DeadlineGuard<T>, DispatchHandle) {
        let timeout = self.timeout;
        self.with_timeout(timeout)
    }

    pub fn with_timeout(self, timeout: Option<Duration>) -> (DeadlineGuard<T>, DispatchHandle) {
        (DeadlineGuard::new(self.results, timeout), self.handle)
    }
}

/// 投入ループとワーカーのハンドル
#[derive(Debug)]
pub struct DispatchHandle {
    pool: AdmissionPool,
    producer: JoinHandle<DispatchReport>,
}

/// 投入ループの終了報告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// ワーカーを起動したタスク数
    pub submitted: usize,
    /// キャンセルやシンクの閉鎖で一度も開始されなかったタスク数
    pub skipped: usize,
}

impl DispatchHandle {
    /// 以降のタスク投入を止める
    ///
    /// まだトークンを得ていないタスクは開始されない。実行中のワーカーは最後まで走る。
    pub fn cancel(&self) {
        debug!("dispatch cancellation requested");
        self.pool.close();
    }

    /// 現在トークンを保持しているワーカー数
    pub fn in_flight(&self) -> usize {
        self.pool.in_use()
    }

    pub fn limit(&self) -> usize {
        self.pool.capacity()
    }

    pub fn is_finished(&self) -> bool {
        self.producer.is_finished()
    }

    /// 投入ループと全ワーカーの終了を待つ
    pub async fn join(self) -> FanoutResult<DispatchReport> {
        self.producer.await.map_err(FanoutError::join)
    }
}

async fn submit_all<T: Send + 'static>(
    tasks: Vec<Task<T>>,
    pool: AdmissionPool,
    sender: ResultSender<T>,
) -> DispatchReport {
    let total = tasks.len();
    let mut workers = JoinSet::new();
    let mut submitted = 0;

    for (index, task) in tasks.into_iter().enumerate() {
        if sender.is_closed() {
            debug!(index, "sink closed by consumer; stop submitting");
            break;
        }

        let token = match pool.acquire().await {
            Ok(token) => token,
            Err(_) => {
                debug!(index, "dispatch cancelled before admission");
                break;
            }
        };

        // トークン待ちの間に消費者が去っていれば開始しない
        if sender.is_closed() {
            debug!(index, "sink closed while waiting for admission");
            break;
        }

        let (key, work) = task.into_parts();
        let id = TaskId { index, key };
        workers.spawn(run_worker(id, work, token, sender.clone()));
        submitted += 1;
    }

    // 投入側の送信ハンドルを手放す。最後のワーカーが終わるとシンクが閉じる
    drop(sender);

    while let Some(joined) = workers.join_next().await {
        if let Err(error) = joined {
            warn!(%error, "worker terminated abnormally");
        }
    }

    debug!(submitted, skipped = total - submitted, "dispatch finished");
    DispatchReport {
        submitted,
        skipped: total - submitted,
    }
}

/// 1タスクを実行して結果を送る
///
/// トークンはこの関数のスコープで保持し、どの経路で抜けても drop で一度だけ返却される。
async fn run_worker<T: Send + 'static>(
    id: TaskId,
    work: TaskFn<T>,
    token: AdmissionToken,
    sink: ResultSender<T>,
) {
    let started = Instant::now();
    trace!(task = %id, "worker started");

    // タスク関数のパニックはワーカー境界で捕まえて失敗結果に変える
    let outcome = match AssertUnwindSafe(async move { work().await })
        .catch_unwind()
        .await
    {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            debug!(task = %id, error = %format!("{error:#}"), "task failed");
            Err(TaskError::failed(&error))
        }
        Err(payload) => {
            let error = TaskError::from_panic(payload.as_ref());
            warn!(task = %id, panic = error.message(), "task panicked");
            Err(error)
        }
    };

    let elapsed = started.elapsed();
    let key = id.key.clone();
    if sink.send(TaskResult::new(id, outcome, elapsed)).await.is_err() {
        debug!(task = %key, "consumer stopped reading; result discarded");
    }

    drop(token);
    trace!(task = %key, elapsed_ms = elapsed.as_millis() as u64, "worker finished");
}
